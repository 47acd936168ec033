//! Exchange log port (append-only message log).
//!
//! The log is the source of truth for what the user has seen and said.
//! Two cross-session queries hang off it: the daily exchange budget
//! (count of user entries since local midnight) and the one-time
//! insight-card check.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, SessionId, Timestamp, UserId};
use crate::domain::session::ExchangeRecord;

/// Port for the append-only exchange log.
#[async_trait]
pub trait ExchangeLog: Send + Sync {
    /// Append one entry.
    ///
    /// # Errors
    ///
    /// - `DatabaseError` on persistence failure
    async fn append(&self, record: &ExchangeRecord) -> Result<(), DomainError>;

    /// Append several entries in order, atomically where the adapter
    /// supports it.
    async fn append_all(&self, records: &[ExchangeRecord]) -> Result<(), DomainError>;

    /// All entries for a session, ordered by sequence.
    async fn list_for_session(
        &self,
        session_id: &SessionId,
    ) -> Result<Vec<ExchangeRecord>, DomainError>;

    /// Count of user-role entries for this user since the given instant.
    ///
    /// Backs the daily exchange budget; system entries never count
    /// against the budget.
    async fn count_user_entries_since(
        &self,
        user_id: &UserId,
        since: Timestamp,
    ) -> Result<u32, DomainError>;

    /// Whether the user has ever been shown the insight card for the
    /// given drill, in any session.
    async fn has_seen_insight(
        &self,
        user_id: &UserId,
        drill_key: &str,
    ) -> Result<bool, DomainError>;
}
