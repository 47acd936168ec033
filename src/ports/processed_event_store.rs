//! Processed event store port - idempotency ledger for event handlers.
//!
//! Events are delivered at-least-once: the bus may redeliver after a
//! worker restart or a handler crash before acknowledgment. This store
//! records which (event, handler) pairs have completed so a redelivery
//! becomes a no-op instead of a second teaser email or a double-counted
//! drill completion.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, EventId, Timestamp};

/// Port for tracking which events have been processed by which handlers.
///
/// Each handler has its own record per event, so the teaser mailer and
/// the progress tracker can process the same `session.completed.v1`
/// independently.
///
/// # Example
///
/// ```ignore
/// if store.contains(&event_id, handler.name()).await? {
///     return Ok(()); // redelivery, skip
/// }
/// handler.handle(event).await?;
/// store.mark_processed(&event_id, handler.name()).await?;
/// ```
#[async_trait]
pub trait ProcessedEventStore: Send + Sync {
    /// Whether this handler has already processed this event.
    async fn contains(
        &self,
        event_id: &EventId,
        handler_name: &str,
    ) -> Result<bool, DomainError>;

    /// Record that this handler finished processing this event.
    ///
    /// Called after successful handling; marking twice must not error.
    async fn mark_processed(
        &self,
        event_id: &EventId,
        handler_name: &str,
    ) -> Result<(), DomainError>;

    /// Delete entries older than the given timestamp.
    ///
    /// Retention cleanup. Returns the number of entries removed.
    async fn delete_before(&self, timestamp: Timestamp) -> Result<u64, DomainError>;
}
