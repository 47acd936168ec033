//! Event publisher port - how the domain announces what happened.
//!
//! Handlers downstream (scoring enqueue, teaser mailer, progress
//! projections) react to these events without the publisher knowing
//! who is listening.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, EventEnvelope};

/// Port for publishing domain events.
///
/// Implementations must ensure:
/// - Events are delivered at-least-once (handlers may receive duplicates)
/// - `publish_all` preserves the order events were passed in
/// - Transport errors are propagated to the caller; what a bus does
///   with a failing subscriber is the bus's policy, not the publisher's
///
/// # Example
///
/// ```ignore
/// let envelope = event.to_envelope()?;
/// publisher.publish(envelope).await?;
/// ```
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Publish a single event.
    ///
    /// The envelope carries the event id for deduplication, the event
    /// type for routing, and aggregate context for correlation.
    async fn publish(&self, event: EventEnvelope) -> Result<(), DomainError>;

    /// Publish multiple events in order.
    ///
    /// A session completion emits `session.completed.v1` followed by
    /// progress events; handlers rely on that ordering. Adapters that
    /// cannot deliver atomically publish sequentially with best effort.
    async fn publish_all(&self, events: Vec<EventEnvelope>) -> Result<(), DomainError>;
}
