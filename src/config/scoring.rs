//! Scoring configuration

use serde::Deserialize;

use crate::domain::scoring::Grader;

use super::error::ValidationError;

/// Grading configuration
///
/// Tunes how oracle verdicts turn into scores. The dimension averages
/// and severity weighting stay fixed in the domain.
#[derive(Debug, Clone, Deserialize)]
pub struct ScoringConfig {
    /// Points deducted per violated criterion
    #[serde(default = "default_penalty_per_violation")]
    pub penalty_per_violation: f64,

    /// Whether follow-up attempts on the same card count toward progress
    #[serde(default)]
    pub count_iterations: bool,
}

impl ScoringConfig {
    /// Validate scoring configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.penalty_per_violation <= 0.0 || self.penalty_per_violation > 10.0 {
            return Err(ValidationError::InvalidPenalty);
        }
        Ok(())
    }
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            penalty_per_violation: default_penalty_per_violation(),
            count_iterations: false,
        }
    }
}

fn default_penalty_per_violation() -> f64 {
    Grader::DEFAULT_PENALTY
}
