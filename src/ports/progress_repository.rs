//! Progress repository port.
//!
//! One row per (user, mode), upserted. Progress rows are written on
//! response submission, scoring completion, and session completion.

use async_trait::async_trait;

use crate::domain::catalog::ModeKey;
use crate::domain::foundation::{DomainError, UserId};
use crate::domain::session::Progress;

/// Repository port for per-mode progress counters.
#[async_trait]
pub trait ProgressRepository: Send + Sync {
    /// Find the user's progress row for a mode.
    ///
    /// Returns `None` for a mode the user has never practiced.
    async fn find(&self, user_id: &UserId, mode: &ModeKey)
        -> Result<Option<Progress>, DomainError>;

    /// Insert or replace the progress row for (user, mode).
    ///
    /// # Errors
    ///
    /// - `DatabaseError` on persistence failure
    async fn upsert(&self, progress: &Progress) -> Result<(), DomainError>;
}
