//! Score store port.
//!
//! Score records and their derived dimension scores are append-only.
//! The insert is transactional across both tables: a record with half
//! its dimension scores missing would silently skew the analysis.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, Timestamp, UserId};
use crate::domain::scoring::{DimensionScore, ScoreRecord};

/// Port for persisting and reading scoring output.
#[async_trait]
pub trait ScoreStore: Send + Sync {
    /// Insert a score record together with its derived dimension scores.
    ///
    /// All rows commit or none do.
    ///
    /// # Errors
    ///
    /// - `DatabaseError` on persistence failure; the caller must treat
    ///   this as fatal for the scoring attempt
    async fn insert_scored(
        &self,
        record: &ScoreRecord,
        scores: &[DimensionScore],
    ) -> Result<(), DomainError>;

    /// All dimension scores for a user created at or after `since`,
    /// ordered by creation time ascending.
    ///
    /// One query backs both classification windows; callers re-filter
    /// in memory for the recent window.
    async fn samples_for_user_since(
        &self,
        user_id: &UserId,
        since: Timestamp,
    ) -> Result<Vec<DimensionScore>, DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    // Trait object safety test
    #[test]
    fn score_store_is_object_safe() {
        fn _accepts_dyn(_store: &dyn ScoreStore) {}
    }
}
