//! PostgreSQL implementation of SessionReader.
//!
//! Read-side statistics over the sessions table. Both queries run off
//! the `(status, ended_at)` index, not a denormalized view; at current
//! volumes the table itself is fine.

use async_trait::async_trait;
use sqlx::PgPool;

use crate::domain::foundation::{DomainError, ErrorCode, Timestamp, UserId};
use crate::ports::SessionReader;

/// PostgreSQL implementation of the SessionReader port.
#[derive(Clone)]
pub struct PostgresSessionReader {
    pool: PgPool,
}

impl PostgresSessionReader {
    /// Creates a new PostgresSessionReader.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SessionReader for PostgresSessionReader {
    async fn count_completed(&self, user_id: &UserId) -> Result<u32, DomainError> {
        let result: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM sessions WHERE user_id = $1 AND status = 'completed'",
        )
        .bind(user_id.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to count completed sessions: {}", e),
            )
        })?;

        Ok(result.0 as u32)
    }

    async fn users_completed_since(
        &self,
        since: Timestamp,
    ) -> Result<Vec<UserId>, DomainError> {
        let rows: Vec<(String,)> = sqlx::query_as(
            r#"
            SELECT DISTINCT user_id FROM sessions
            WHERE status = 'completed' AND ended_at >= $1
            ORDER BY user_id
            "#,
        )
        .bind(since.as_datetime())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to list completion candidates: {}", e),
            )
        })?;

        rows.into_iter()
            .map(|(id,)| {
                UserId::new(id).map_err(|e| {
                    DomainError::new(ErrorCode::DatabaseError, format!("Invalid user_id: {}", e))
                })
            })
            .collect()
    }
}
