//! PostgreSQL implementation of ProgressRepository.
//!
//! One row per (user, mode), written with an upsert so the first
//! exchange in a new mode and every later counter bump share one code
//! path.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::domain::catalog::ModeKey;
use crate::domain::foundation::{DomainError, ErrorCode, Timestamp, UserId};
use crate::domain::session::Progress;
use crate::ports::ProgressRepository;

/// PostgreSQL implementation of the ProgressRepository port.
#[derive(Clone)]
pub struct PostgresProgressRepository {
    pool: PgPool,
}

impl PostgresProgressRepository {
    /// Creates a new PostgresProgressRepository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ProgressRow {
    user_id: String,
    mode: String,
    level: i32,
    exchanges_at_level: i32,
    sessions_completed: i32,
    drills_completed: i32,
    exchanges_recorded: i32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ProgressRow> for Progress {
    type Error = DomainError;

    fn try_from(row: ProgressRow) -> Result<Self, Self::Error> {
        Ok(Progress::reconstitute(
            UserId::new(row.user_id).map_err(|e| {
                DomainError::new(ErrorCode::DatabaseError, format!("Invalid user_id: {}", e))
            })?,
            ModeKey::from(row.mode.as_str()),
            row.level as u32,
            row.exchanges_at_level as u32,
            row.sessions_completed as u32,
            row.drills_completed as u32,
            row.exchanges_recorded as u32,
            Timestamp::from_datetime(row.created_at),
            Timestamp::from_datetime(row.updated_at),
        ))
    }
}

#[async_trait]
impl ProgressRepository for PostgresProgressRepository {
    async fn find(
        &self,
        user_id: &UserId,
        mode: &ModeKey,
    ) -> Result<Option<Progress>, DomainError> {
        let row: Option<ProgressRow> = sqlx::query_as(
            r#"
            SELECT user_id, mode, level, exchanges_at_level, sessions_completed,
                   drills_completed, exchanges_recorded, created_at, updated_at
            FROM progress
            WHERE user_id = $1 AND mode = $2
            "#,
        )
        .bind(user_id.as_str())
        .bind(mode.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to fetch progress: {}", e),
            )
        })?;

        row.map(Progress::try_from).transpose()
    }

    async fn upsert(&self, progress: &Progress) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO progress (
                user_id, mode, level, exchanges_at_level, sessions_completed,
                drills_completed, exchanges_recorded, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ON CONFLICT (user_id, mode) DO UPDATE SET
                level = EXCLUDED.level,
                exchanges_at_level = EXCLUDED.exchanges_at_level,
                sessions_completed = EXCLUDED.sessions_completed,
                drills_completed = EXCLUDED.drills_completed,
                exchanges_recorded = EXCLUDED.exchanges_recorded,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(progress.user_id().as_str())
        .bind(progress.mode().as_str())
        .bind(progress.level() as i32)
        .bind(progress.exchanges_at_level() as i32)
        .bind(progress.sessions_completed() as i32)
        .bind(progress.drills_completed() as i32)
        .bind(progress.exchanges_recorded() as i32)
        .bind(progress.created_at().as_datetime())
        .bind(progress.updated_at().as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to upsert progress: {}", e),
            )
        })?;

        Ok(())
    }
}
