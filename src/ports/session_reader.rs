//! Session reader port (read side / CQRS queries).
//!
//! Cross-mode queries the analysis gate and the report scheduler need.
//! Kept separate from the write repository so the read side can hit
//! denormalized views.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, Timestamp, UserId};

/// Reader port for session statistics.
#[async_trait]
pub trait SessionReader: Send + Sync {
    /// Completed-session count for a user, across all modes.
    ///
    /// This is the number the access gate compares against the minimum
    /// session threshold.
    async fn count_completed(&self, user_id: &UserId) -> Result<u32, DomainError>;

    /// Users with at least one completed session since the given
    /// instant. Drives the weekly report scheduler's candidate set.
    async fn users_completed_since(&self, since: Timestamp)
        -> Result<Vec<UserId>, DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    // Trait object safety test
    #[test]
    fn session_reader_is_object_safe() {
        fn _accepts_dyn(_reader: &dyn SessionReader) {}
    }
}
