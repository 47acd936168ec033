//! Postgres processed-event ledger.
//!
//! Backs handler idempotency: the bus delivers at-least-once, and this
//! table records which (event, handler) pairs already completed so a
//! redelivery is skipped instead of re-run.

use async_trait::async_trait;
use sqlx::PgPool;

use crate::domain::foundation::{DomainError, ErrorCode, EventId, Timestamp};
use crate::ports::ProcessedEventStore;

/// Postgres-backed processed-event store.
///
/// The unique index on (event_id, handler_name) makes `mark_processed`
/// idempotent: a second insert lands on ON CONFLICT DO NOTHING.
#[derive(Clone)]
pub struct PostgresProcessedEventStore {
    pool: PgPool,
}

impl PostgresProcessedEventStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProcessedEventStore for PostgresProcessedEventStore {
    async fn contains(&self, event_id: &EventId, handler_name: &str) -> Result<bool, DomainError> {
        let row: (bool,) = sqlx::query_as(
            "SELECT EXISTS(SELECT 1 FROM processed_events WHERE event_id = $1 AND handler_name = $2)",
        )
        .bind(event_id.as_str())
        .bind(handler_name)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to check processed event: {}", e),
            )
        })?;

        Ok(row.0)
    }

    async fn mark_processed(
        &self,
        event_id: &EventId,
        handler_name: &str,
    ) -> Result<(), DomainError> {
        let now = Timestamp::now();

        sqlx::query(
            r#"
            INSERT INTO processed_events (event_id, handler_name, processed_at)
            VALUES ($1, $2, $3)
            ON CONFLICT (event_id, handler_name) DO NOTHING
            "#,
        )
        .bind(event_id.as_str())
        .bind(handler_name)
        .bind(now.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to mark event processed: {}", e),
            )
        })?;

        Ok(())
    }

    async fn delete_before(&self, timestamp: Timestamp) -> Result<u64, DomainError> {
        let result = sqlx::query("DELETE FROM processed_events WHERE processed_at < $1")
            .bind(timestamp.as_datetime())
            .execute(&self.pool)
            .await
            .map_err(|e| {
                DomainError::new(
                    ErrorCode::DatabaseError,
                    format!("Failed to prune processed events: {}", e),
                )
            })?;

        Ok(result.rows_affected())
    }
}
