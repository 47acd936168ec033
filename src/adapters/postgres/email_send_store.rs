//! PostgreSQL implementation of EmailSendStore.
//!
//! The unique index on (user_id, kind, iso_year, iso_week) is the
//! idempotency guarantee; `ON CONFLICT DO NOTHING` turns a concurrent
//! duplicate into `AlreadySent` instead of an error.

use async_trait::async_trait;
use sqlx::PgPool;

use crate::domain::foundation::{DomainError, ErrorCode, UserId};
use crate::domain::notification::{EmailKind, EmailSendRecord};
use crate::ports::{EmailSendStore, SendOutcome};

/// PostgreSQL implementation of the EmailSendStore port.
#[derive(Clone)]
pub struct PostgresEmailSendStore {
    pool: PgPool,
}

impl PostgresEmailSendStore {
    /// Creates a new PostgresEmailSendStore.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EmailSendStore for PostgresEmailSendStore {
    async fn record(&self, record: &EmailSendRecord) -> Result<SendOutcome, DomainError> {
        let snapshot = serde_json::to_value(record.snapshot()).map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to serialize snapshot: {}", e),
            )
        })?;

        let result = sqlx::query(
            r#"
            INSERT INTO email_sends (
                id, user_id, kind, iso_year, iso_week, subject, snapshot, sent_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (user_id, kind, iso_year, iso_week) DO NOTHING
            "#,
        )
        .bind(record.id().as_uuid())
        .bind(record.user_id().as_str())
        .bind(record.kind().as_str())
        .bind(record.iso_year())
        .bind(record.iso_week() as i32)
        .bind(record.subject())
        .bind(snapshot)
        .bind(record.sent_at().as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to record email send: {}", e),
            )
        })?;

        if result.rows_affected() == 0 {
            Ok(SendOutcome::AlreadySent)
        } else {
            Ok(SendOutcome::Recorded)
        }
    }

    async fn was_sent(
        &self,
        user_id: &UserId,
        kind: EmailKind,
        iso_year: i32,
        iso_week: u32,
    ) -> Result<bool, DomainError> {
        let result: (bool,) = sqlx::query_as(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM email_sends
                WHERE user_id = $1 AND kind = $2 AND iso_year = $3 AND iso_week = $4
            )
            "#,
        )
        .bind(user_id.as_str())
        .bind(kind.as_str())
        .bind(iso_year)
        .bind(iso_week as i32)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to check send ledger: {}", e),
            )
        })?;

        Ok(result.0)
    }
}
