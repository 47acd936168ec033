//! Idempotency wrapper for event handlers.
//!
//! The bus delivers at-least-once; this wrapper narrows that to
//! at-most-once per handler by consulting the processed-event ledger
//! before delegating.
//!
//! ## Usage
//!
//! ```ignore
//! let mailer = IdempotentHandler::new(teaser_mailer, processed_events.clone());
//! event_bus.subscribe("session.completed.v1", Arc::new(mailer));
//! ```

use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

use crate::domain::foundation::{DomainError, EventEnvelope};
use crate::ports::{EventHandler, ProcessedEventStore};

/// Decorates an `EventHandler` with duplicate suppression.
///
/// The ledger keys on (event id, handler name), so several wrapped
/// handlers can share one store and keep separate histories. A failed
/// inner run leaves no ledger entry and stays retryable.
///
/// Check and mark are not atomic: two deliveries racing through the
/// gap can both reach the inner handler. Handlers carry their own
/// last line of defense (claim-then-send, ON CONFLICT writes); this
/// wrapper removes the common duplicate, not the race.
pub struct IdempotentHandler<H: EventHandler> {
    inner: H,
    processed_events: Arc<dyn ProcessedEventStore>,
}

impl<H: EventHandler> IdempotentHandler<H> {
    pub fn new(inner: H, processed_events: Arc<dyn ProcessedEventStore>) -> Self {
        Self {
            inner,
            processed_events,
        }
    }
}

#[async_trait]
impl<H: EventHandler + 'static> EventHandler for IdempotentHandler<H> {
    async fn handle(&self, envelope: EventEnvelope) -> Result<(), DomainError> {
        let handler_name = self.inner.name();

        if self
            .processed_events
            .contains(&envelope.event_id, handler_name)
            .await?
        {
            debug!(
                event_id = %envelope.event_id,
                handler = handler_name,
                "Skipping already processed event"
            );
            return Ok(());
        }

        self.inner.handle(envelope.clone()).await?;

        // Marked only after success so a failed delivery retries.
        self.processed_events
            .mark_processed(&envelope.event_id, handler_name)
            .await?;

        Ok(())
    }

    fn name(&self) -> &'static str {
        self.inner.name()
    }
}
