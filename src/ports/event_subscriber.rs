//! Event subscriber port - how handlers register interest in events.

use async_trait::async_trait;
use std::sync::Arc;

use crate::domain::foundation::{DomainError, EventEnvelope};

/// Handler for processing domain events.
///
/// Implementations should be:
/// - **Idempotent** - safe to call multiple times with the same event
/// - **Quick** - long work (oracle calls, email dispatch) belongs on a
///   queue, not in the handler
/// - **Isolated** - one handler's error must not affect the others
///
/// # Example
///
/// ```ignore
/// struct TeaserMailer { /* ... */ }
///
/// #[async_trait]
/// impl EventHandler for TeaserMailer {
///     async fn handle(&self, event: EventEnvelope) -> Result<(), DomainError> {
///         let payload: SessionCompleted = event.payload_as()?;
///         // Decide whether this completion crossed the teaser threshold...
///         Ok(())
///     }
///
///     fn name(&self) -> &'static str {
///         "TeaserMailer"
///     }
/// }
/// ```
#[async_trait]
pub trait EventHandler: Send + Sync {
    /// Process an event.
    ///
    /// Called at-least-once per published event; duplicates must be
    /// harmless.
    async fn handle(&self, event: EventEnvelope) -> Result<(), DomainError>;

    /// Handler name for logging and idempotency tracking.
    ///
    /// The processed-event store keys on (event id, handler name), so
    /// the name must be stable across deploys.
    fn name(&self) -> &'static str;
}

/// Port for subscribing to domain events.
///
/// # Example
///
/// ```ignore
/// subscriber.subscribe("session.completed.v1", teaser_mailer);
/// subscriber.subscribe_all(&["drill.scored.v1", "session.completed.v1"], progress_tracker);
/// ```
pub trait EventSubscriber: Send + Sync {
    /// Subscribe a handler to a specific event type.
    fn subscribe(&self, event_type: &str, handler: Arc<dyn EventHandler>);

    /// Subscribe the same handler instance to several event types.
    fn subscribe_all(&self, event_types: &[&str], handler: Arc<dyn EventHandler>);
}

/// Combined trait for event bus implementations.
pub trait EventBus: super::EventPublisher + EventSubscriber {}

// Blanket implementation - publishing plus subscribing makes a bus
impl<T: super::EventPublisher + EventSubscriber> EventBus for T {}
