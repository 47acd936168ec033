//! PostgreSQL implementation of SessionRepository.
//!
//! Persists the Session aggregate. `update` is conditional on the
//! exchange count the aggregate was loaded with, which is what turns a
//! racing double-submit into an error instead of a double-counted
//! answer.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::catalog::ModeKey;
use crate::domain::foundation::{DomainError, ErrorCode, SessionId, Timestamp, UserId};
use crate::domain::session::{Awaiting, ContinueAction, Session, SessionStatus};
use crate::ports::SessionRepository;

/// PostgreSQL implementation of the SessionRepository port.
#[derive(Clone)]
pub struct PostgresSessionRepository {
    pool: PgPool,
}

impl PostgresSessionRepository {
    /// Creates a new PostgresSessionRepository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn exists(&self, id: &SessionId) -> Result<bool, DomainError> {
        let result: (bool,) =
            sqlx::query_as("SELECT EXISTS (SELECT 1 FROM sessions WHERE id = $1)")
                .bind(id.as_uuid())
                .fetch_one(&self.pool)
                .await
                .map_err(|e| {
                    DomainError::new(
                        ErrorCode::DatabaseError,
                        format!("Failed to check session existence: {}", e),
                    )
                })?;

        Ok(result.0)
    }
}

#[derive(Debug, sqlx::FromRow)]
struct SessionRow {
    id: Uuid,
    user_id: String,
    mode: String,
    level_at_start: i32,
    exchange_count: i32,
    drill_index: i32,
    status: String,
    awaiting: String,
    started_at: DateTime<Utc>,
    ended_at: Option<DateTime<Utc>>,
}

fn parse_status(s: &str) -> Result<SessionStatus, DomainError> {
    match s {
        "active" => Ok(SessionStatus::Active),
        "completed" => Ok(SessionStatus::Completed),
        _ => Err(DomainError::new(
            ErrorCode::DatabaseError,
            format!("Invalid session status: {}", s),
        )),
    }
}

fn parse_awaiting(s: &str) -> Result<Awaiting, DomainError> {
    match s {
        "response" => Ok(Awaiting::Response),
        "continue_reveal_scenario" => Ok(Awaiting::Continue(ContinueAction::RevealScenario)),
        "continue_advance_drill" => Ok(Awaiting::Continue(ContinueAction::AdvanceDrill)),
        _ => Err(DomainError::new(
            ErrorCode::DatabaseError,
            format!("Invalid awaiting value: {}", s),
        )),
    }
}

impl TryFrom<SessionRow> for Session {
    type Error = DomainError;

    fn try_from(row: SessionRow) -> Result<Self, Self::Error> {
        Ok(Session::reconstitute(
            SessionId::from_uuid(row.id),
            UserId::new(row.user_id).map_err(|e| {
                DomainError::new(ErrorCode::DatabaseError, format!("Invalid user_id: {}", e))
            })?,
            ModeKey::from(row.mode.as_str()),
            row.level_at_start as u32,
            row.exchange_count as u32,
            row.drill_index as u32,
            parse_status(&row.status)?,
            parse_awaiting(&row.awaiting)?,
            Timestamp::from_datetime(row.started_at),
            row.ended_at.map(Timestamp::from_datetime),
        ))
    }
}

#[async_trait]
impl SessionRepository for PostgresSessionRepository {
    async fn save(&self, session: &Session) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO sessions (
                id, user_id, mode, level_at_start, exchange_count,
                drill_index, status, awaiting, started_at, ended_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(session.id().as_uuid())
        .bind(session.user_id().as_str())
        .bind(session.mode().as_str())
        .bind(session.level_at_start() as i32)
        .bind(session.exchange_count() as i32)
        .bind(session.drill_index() as i32)
        .bind(session.status().as_str())
        .bind(session.awaiting().as_str())
        .bind(session.started_at().as_datetime())
        .bind(session.ended_at().map(|t| *t.as_datetime()))
        .execute(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to insert session: {}", e),
            )
        })?;

        Ok(())
    }

    async fn update(
        &self,
        session: &Session,
        loaded_exchange_count: u32,
    ) -> Result<(), DomainError> {
        // The WHERE clause carries the count the aggregate was loaded
        // with; if another writer committed first, zero rows match.
        let result = sqlx::query(
            r#"
            UPDATE sessions SET
                exchange_count = $2,
                drill_index = $3,
                status = $4,
                awaiting = $5,
                ended_at = $6
            WHERE id = $1 AND exchange_count = $7
            "#,
        )
        .bind(session.id().as_uuid())
        .bind(session.exchange_count() as i32)
        .bind(session.drill_index() as i32)
        .bind(session.status().as_str())
        .bind(session.awaiting().as_str())
        .bind(session.ended_at().map(|t| *t.as_datetime()))
        .bind(loaded_exchange_count as i32)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to update session: {}", e),
            )
        })?;

        if result.rows_affected() == 0 {
            if !self.exists(session.id()).await? {
                return Err(DomainError::new(
                    ErrorCode::SessionNotFound,
                    format!("Session not found: {}", session.id()),
                ));
            }
            return Err(DomainError::new(
                ErrorCode::InvalidStateTransition,
                "Session was modified by another request",
            ));
        }

        Ok(())
    }

    async fn find_by_id(&self, id: &SessionId) -> Result<Option<Session>, DomainError> {
        let row: Option<SessionRow> = sqlx::query_as(
            r#"
            SELECT id, user_id, mode, level_at_start, exchange_count,
                   drill_index, status, awaiting, started_at, ended_at
            FROM sessions
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to fetch session: {}", e),
            )
        })?;

        row.map(Session::try_from).transpose()
    }

    async fn find_active_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Option<Session>, DomainError> {
        let row: Option<SessionRow> = sqlx::query_as(
            r#"
            SELECT id, user_id, mode, level_at_start, exchange_count,
                   drill_index, status, awaiting, started_at, ended_at
            FROM sessions
            WHERE user_id = $1 AND status = 'active'
            ORDER BY started_at DESC
            LIMIT 1
            "#,
        )
        .bind(user_id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to fetch active session: {}", e),
            )
        })?;

        row.map(Session::try_from).transpose()
    }
}
