//! Normalized per-dimension score (0-10 scale) and its persisted form.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::catalog::{DimensionKey, DrillType};
use crate::domain::foundation::{
    DimensionScoreId, ScoreRecordId, Timestamp, UserId, ValidationError,
};

/// A normalized skill score between 0 and 10 inclusive.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScoreValue(f64);

impl ScoreValue {
    /// Lowest possible score.
    pub const MIN: Self = Self(0.0);

    /// Highest possible score.
    pub const MAX: Self = Self(10.0);

    /// Creates a new ScoreValue, clamping to the valid range.
    pub fn new(value: f64) -> Self {
        if value.is_nan() {
            return Self::MIN;
        }
        Self(value.clamp(0.0, 10.0))
    }

    /// Creates a ScoreValue, returning error if out of range.
    pub fn try_new(value: f64) -> Result<Self, ValidationError> {
        if value.is_nan() || !(0.0..=10.0).contains(&value) {
            return Err(ValidationError::out_of_range("score", 0, 10, value as i32));
        }
        Ok(Self(value))
    }

    /// Returns the value as f64.
    pub fn value(&self) -> f64 {
        self.0
    }

    /// Returns true if this score counts as a failure at the given cutoff.
    ///
    /// A score exactly at the cutoff passes.
    pub fn is_failure_at(&self, pass_cutoff: f64) -> bool {
        self.0 < pass_cutoff
    }
}

impl Default for ScoreValue {
    fn default() -> Self {
        Self::MIN
    }
}

impl fmt::Display for ScoreValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}/10", self.0)
    }
}

/// One normalized dimension score derived from a scored response.
///
/// This is the unit the pattern analysis consumes. Append-only, never
/// updated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimensionScore {
    /// Unique identifier for this score.
    id: DimensionScoreId,

    /// User the score belongs to.
    user_id: UserId,

    /// Score record this was derived from.
    score_record_id: ScoreRecordId,

    /// Drill type that produced the sample, when known.
    drill_type: Option<DrillType>,

    /// Skill dimension being scored.
    dimension: DimensionKey,

    /// Normalized score on the 0-10 scale.
    score: ScoreValue,

    /// When the score was derived.
    created_at: Timestamp,
}

impl DimensionScore {
    /// Creates a new dimension score.
    pub fn new(
        user_id: UserId,
        score_record_id: ScoreRecordId,
        drill_type: Option<DrillType>,
        dimension: DimensionKey,
        score: ScoreValue,
    ) -> Self {
        Self {
            id: DimensionScoreId::new(),
            user_id,
            score_record_id,
            drill_type,
            dimension,
            score,
            created_at: Timestamp::now(),
        }
    }

    /// Reconstitute a score from persistence.
    pub fn reconstitute(
        id: DimensionScoreId,
        user_id: UserId,
        score_record_id: ScoreRecordId,
        drill_type: Option<DrillType>,
        dimension: DimensionKey,
        score: ScoreValue,
        created_at: Timestamp,
    ) -> Self {
        Self {
            id,
            user_id,
            score_record_id,
            drill_type,
            dimension,
            score,
            created_at,
        }
    }

    pub fn id(&self) -> &DimensionScoreId {
        &self.id
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    pub fn score_record_id(&self) -> &ScoreRecordId {
        &self.score_record_id
    }

    pub fn drill_type(&self) -> Option<&DrillType> {
        self.drill_type.as_ref()
    }

    pub fn dimension(&self) -> &DimensionKey {
        &self.dimension
    }

    pub fn score(&self) -> ScoreValue {
        self.score
    }

    pub fn created_at(&self) -> &Timestamp {
        &self.created_at
    }
}
