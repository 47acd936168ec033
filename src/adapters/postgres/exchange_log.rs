//! PostgreSQL implementation of ExchangeLog.
//!
//! One row per log entry, payload stored as jsonb. The budget count and
//! the insight-seen check query across sessions, which is why `user_id`
//! is a column and not a join.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::catalog::DrillPhase;
use crate::domain::foundation::{DomainError, ErrorCode, ExchangeId, SessionId, Timestamp, UserId};
use crate::domain::session::{ExchangePayload, ExchangeRecord, Role};
use crate::ports::ExchangeLog;

/// PostgreSQL implementation of the ExchangeLog port.
#[derive(Clone)]
pub struct PostgresExchangeLog {
    pool: PgPool,
}

impl PostgresExchangeLog {
    /// Creates a new PostgresExchangeLog.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ExchangeRow {
    id: Uuid,
    session_id: Uuid,
    user_id: String,
    sequence: i32,
    role: String,
    payload: serde_json::Value,
    drill_phase: Option<String>,
    created_at: DateTime<Utc>,
}

fn parse_role(s: &str) -> Result<Role, DomainError> {
    match s {
        "system" => Ok(Role::System),
        "user" => Ok(Role::User),
        _ => Err(DomainError::new(
            ErrorCode::DatabaseError,
            format!("Invalid exchange role: {}", s),
        )),
    }
}

impl TryFrom<ExchangeRow> for ExchangeRecord {
    type Error = DomainError;

    fn try_from(row: ExchangeRow) -> Result<Self, Self::Error> {
        let payload: ExchangePayload = serde_json::from_value(row.payload).map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Invalid exchange payload: {}", e),
            )
        })?;

        Ok(ExchangeRecord::reconstitute(
            ExchangeId::from_uuid(row.id),
            SessionId::from_uuid(row.session_id),
            UserId::new(row.user_id).map_err(|e| {
                DomainError::new(ErrorCode::DatabaseError, format!("Invalid user_id: {}", e))
            })?,
            row.sequence as u32,
            parse_role(&row.role)?,
            payload,
            row.drill_phase.map(|p| DrillPhase::from(p.as_str())),
            Timestamp::from_datetime(row.created_at),
        ))
    }
}

async fn insert_record<'e, E>(executor: E, record: &ExchangeRecord) -> Result<(), DomainError>
where
    E: sqlx::PgExecutor<'e>,
{
    let payload = serde_json::to_value(record.payload()).map_err(|e| {
        DomainError::new(
            ErrorCode::DatabaseError,
            format!("Failed to serialize exchange payload: {}", e),
        )
    })?;

    sqlx::query(
        r#"
        INSERT INTO exchanges (
            id, session_id, user_id, sequence, role, payload, drill_phase, created_at
        ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        "#,
    )
    .bind(record.id().as_uuid())
    .bind(record.session_id().as_uuid())
    .bind(record.user_id().as_str())
    .bind(record.sequence() as i32)
    .bind(record.role().as_str())
    .bind(payload)
    .bind(record.drill_phase().map(|p| p.as_str()))
    .bind(record.created_at().as_datetime())
    .execute(executor)
    .await
    .map_err(|e| {
        DomainError::new(
            ErrorCode::DatabaseError,
            format!("Failed to insert exchange: {}", e),
        )
    })?;

    Ok(())
}

#[async_trait]
impl ExchangeLog for PostgresExchangeLog {
    async fn append(&self, record: &ExchangeRecord) -> Result<(), DomainError> {
        insert_record(&self.pool, record).await
    }

    async fn append_all(&self, records: &[ExchangeRecord]) -> Result<(), DomainError> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to begin transaction: {}", e),
            )
        })?;

        for record in records {
            insert_record(&mut *tx, record).await?;
        }

        tx.commit().await.map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to commit exchanges: {}", e),
            )
        })?;

        Ok(())
    }

    async fn list_for_session(
        &self,
        session_id: &SessionId,
    ) -> Result<Vec<ExchangeRecord>, DomainError> {
        let rows: Vec<ExchangeRow> = sqlx::query_as(
            r#"
            SELECT id, session_id, user_id, sequence, role, payload, drill_phase, created_at
            FROM exchanges
            WHERE session_id = $1
            ORDER BY sequence ASC
            "#,
        )
        .bind(session_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to list exchanges: {}", e),
            )
        })?;

        rows.into_iter().map(ExchangeRecord::try_from).collect()
    }

    async fn count_user_entries_since(
        &self,
        user_id: &UserId,
        since: Timestamp,
    ) -> Result<u32, DomainError> {
        let result: (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*) FROM exchanges
            WHERE user_id = $1 AND role = 'user' AND created_at >= $2
            "#,
        )
        .bind(user_id.as_str())
        .bind(since.as_datetime())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to count exchanges: {}", e),
            )
        })?;

        Ok(result.0 as u32)
    }

    async fn has_seen_insight(
        &self,
        user_id: &UserId,
        drill_key: &str,
    ) -> Result<bool, DomainError> {
        let result: (bool,) = sqlx::query_as(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM exchanges
                WHERE user_id = $1
                  AND payload->>'type' = 'insight'
                  AND payload->>'drill_key' = $2
            )
            "#,
        )
        .bind(user_id.as_str())
        .bind(drill_key)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to check insight history: {}", e),
            )
        })?;

        Ok(result.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::session::Card;

    #[test]
    fn role_strings_round_trip() {
        for role in [Role::System, Role::User] {
            assert_eq!(parse_role(role.as_str()).unwrap(), role);
        }
        assert!(parse_role("assistant").is_err());
    }

    #[test]
    fn row_conversion_rebuilds_a_card_entry() {
        let card = Card::Insight {
            drill_key: "ask_bigger".to_string(),
            text: "Name the thing and stop.".to_string(),
        };
        let row = ExchangeRow {
            id: Uuid::new_v4(),
            session_id: Uuid::new_v4(),
            user_id: "user-1".to_string(),
            sequence: 0,
            role: "system".to_string(),
            payload: serde_json::to_value(ExchangePayload::Card(card.clone())).unwrap(),
            drill_phase: Some("Opening Ask".to_string()),
            created_at: Utc::now(),
        };

        let record = ExchangeRecord::try_from(row).unwrap();
        assert_eq!(record.role(), Role::System);
        assert_eq!(record.as_card(), Some(&card));
        assert_eq!(record.drill_phase(), Some(&DrillPhase::from("Opening Ask")));
    }

    #[test]
    fn malformed_payload_is_rejected() {
        let row = ExchangeRow {
            id: Uuid::new_v4(),
            session_id: Uuid::new_v4(),
            user_id: "user-1".to_string(),
            sequence: 0,
            role: "system".to_string(),
            payload: serde_json::json!({"type": "unheard_of"}),
            drill_phase: None,
            created_at: Utc::now(),
        };

        assert!(ExchangeRecord::try_from(row).is_err());
    }
}
