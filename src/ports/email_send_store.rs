//! Email send store port - the notification idempotency guard.
//!
//! At most one send record may exist per (user, kind, iso_year,
//! iso_week). Implementations enforce this with a unique constraint and
//! `ON CONFLICT DO NOTHING` semantics so concurrent duplicate jobs
//! race safely: exactly one writer inserts, the rest observe
//! `AlreadySent` and skip the dispatch.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, UserId};
use crate::domain::notification::{EmailKind, EmailSendRecord};

/// Result of attempting to record a send.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    /// Record was inserted; this caller owns the send.
    Recorded,
    /// A record for this (user, kind, week) already exists.
    AlreadySent,
}

/// Port for the email send ledger.
#[async_trait]
pub trait EmailSendStore: Send + Sync {
    /// Attempt to record a send.
    ///
    /// Returns `Recorded` when this call inserted the row, `AlreadySent`
    /// when the identity already existed. Never errors on a duplicate.
    async fn record(&self, record: &EmailSendRecord) -> Result<SendOutcome, DomainError>;

    /// Whether a send is already recorded for this identity.
    async fn was_sent(
        &self,
        user_id: &UserId,
        kind: EmailKind,
        iso_year: i32,
        iso_week: u32,
    ) -> Result<bool, DomainError>;
}
