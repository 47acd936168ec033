//! Session repository port (write side).
//!
//! # Design
//!
//! - **Write-focused**: persists the Session aggregate
//! - **Serialized updates**: concurrent writes to one session must not
//!   double-count an answer or double-advance the drill index

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, SessionId, UserId};
use crate::domain::session::Session;

/// Repository port for Session aggregate persistence.
///
/// `update` is conditional on the stored `exchange_count` matching the
/// count the aggregate was loaded with, so a racing double-submit fails
/// instead of double-counting. Implementations return
/// `InvalidStateTransition` when the condition misses.
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Save a new session.
    ///
    /// # Errors
    ///
    /// - `DatabaseError` on persistence failure
    async fn save(&self, session: &Session) -> Result<(), DomainError>;

    /// Update an existing session, conditional on the exchange count it
    /// was loaded with.
    ///
    /// # Errors
    ///
    /// - `SessionNotFound` if the session doesn't exist
    /// - `InvalidStateTransition` if another writer got there first
    /// - `DatabaseError` on persistence failure
    async fn update(
        &self,
        session: &Session,
        loaded_exchange_count: u32,
    ) -> Result<(), DomainError>;

    /// Find a session by its ID.
    ///
    /// Returns `None` if not found.
    async fn find_by_id(&self, id: &SessionId) -> Result<Option<Session>, DomainError>;

    /// Find the user's most recently started active session, if any.
    async fn find_active_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Option<Session>, DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    // Trait object safety test
    #[test]
    fn session_repository_is_object_safe() {
        fn _accepts_dyn(_repo: &dyn SessionRepository) {}
    }
}
