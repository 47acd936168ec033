//! PostgreSQL implementation of ScoreStore.
//!
//! The record and its dimension scores land in one transaction; a
//! record with half its scores missing would skew every window the
//! classifier computes over it.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::catalog::{DimensionKey, DrillType};
use crate::domain::foundation::{
    DimensionScoreId, DomainError, ErrorCode, ScoreRecordId, Timestamp, UserId,
};
use crate::domain::scoring::{DimensionScore, ScoreRecord, ScoreValue};
use crate::ports::ScoreStore;

/// PostgreSQL implementation of the ScoreStore port.
#[derive(Clone)]
pub struct PostgresScoreStore {
    pool: PgPool,
}

impl PostgresScoreStore {
    /// Creates a new PostgresScoreStore.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct DimensionScoreRow {
    id: Uuid,
    user_id: String,
    score_record_id: Uuid,
    drill_type: Option<String>,
    dimension: String,
    score: f64,
    created_at: DateTime<Utc>,
}

impl TryFrom<DimensionScoreRow> for DimensionScore {
    type Error = DomainError;

    fn try_from(row: DimensionScoreRow) -> Result<Self, Self::Error> {
        Ok(DimensionScore::reconstitute(
            DimensionScoreId::from_uuid(row.id),
            UserId::new(row.user_id).map_err(|e| {
                DomainError::new(ErrorCode::DatabaseError, format!("Invalid user_id: {}", e))
            })?,
            ScoreRecordId::from_uuid(row.score_record_id),
            row.drill_type.map(|t| DrillType::from(t.as_str())),
            DimensionKey::from(row.dimension.as_str()),
            ScoreValue::new(row.score),
            Timestamp::from_datetime(row.created_at),
        ))
    }
}

#[async_trait]
impl ScoreStore for PostgresScoreStore {
    async fn insert_scored(
        &self,
        record: &ScoreRecord,
        scores: &[DimensionScore],
    ) -> Result<(), DomainError> {
        let outcomes = serde_json::to_value(record.outcomes()).map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to serialize outcomes: {}", e),
            )
        })?;

        let mut tx = self.pool.begin().await.map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to begin transaction: {}", e),
            )
        })?;

        sqlx::query(
            r#"
            INSERT INTO score_records (
                id, user_id, session_id, mode, drill_type, drill_phase,
                is_iteration, outcomes, response_text, word_count, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(record.id().as_uuid())
        .bind(record.user_id().as_str())
        .bind(record.session_id().as_uuid())
        .bind(record.mode().as_str())
        .bind(record.drill_type().as_str())
        .bind(record.drill_phase().as_str())
        .bind(record.is_iteration())
        .bind(outcomes)
        .bind(record.response_text())
        .bind(record.word_count() as i32)
        .bind(record.created_at().as_datetime())
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to insert score record: {}", e),
            )
        })?;

        for score in scores {
            sqlx::query(
                r#"
                INSERT INTO dimension_scores (
                    id, user_id, score_record_id, drill_type, dimension, score, created_at
                ) VALUES ($1, $2, $3, $4, $5, $6, $7)
                "#,
            )
            .bind(score.id().as_uuid())
            .bind(score.user_id().as_str())
            .bind(score.score_record_id().as_uuid())
            .bind(score.drill_type().map(|t| t.as_str()))
            .bind(score.dimension().as_str())
            .bind(score.score().value())
            .bind(score.created_at().as_datetime())
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                DomainError::new(
                    ErrorCode::DatabaseError,
                    format!("Failed to insert dimension score: {}", e),
                )
            })?;
        }

        tx.commit().await.map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to commit scores: {}", e),
            )
        })?;

        Ok(())
    }

    async fn samples_for_user_since(
        &self,
        user_id: &UserId,
        since: Timestamp,
    ) -> Result<Vec<DimensionScore>, DomainError> {
        let rows: Vec<DimensionScoreRow> = sqlx::query_as(
            r#"
            SELECT id, user_id, score_record_id, drill_type, dimension, score, created_at
            FROM dimension_scores
            WHERE user_id = $1 AND created_at >= $2
            ORDER BY created_at ASC
            "#,
        )
        .bind(user_id.as_str())
        .bind(since.as_datetime())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to fetch dimension scores: {}", e),
            )
        })?;

        rows.into_iter().map(DimensionScore::try_from).collect()
    }
}
