//! In-process event bus.
//!
//! Dispatch runs synchronously on the publisher's task, which keeps
//! delivery deterministic for tests and keeps the single-binary
//! deployment free of external brokers. Published envelopes are
//! captured so tests can assert on them.
//!
//! # Panics
//!
//! Methods panic if an internal lock is poisoned. A poisoned lock means
//! a handler panicked mid-dispatch and the process state is already
//! suspect, so the panic is allowed to surface.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tracing::warn;

use crate::domain::foundation::{DomainError, EventEnvelope};
use crate::ports::{EventHandler, EventPublisher, EventSubscriber};

/// Synchronous in-process bus behind the publish and subscribe ports.
///
/// A subscriber's failure is logged and swallowed: by the time an event
/// is published the originating state change is already committed, and
/// a downstream reaction must not undo the caller's success. Handlers
/// that need retries sit behind their own idempotency (the processed
/// event ledger, claim-then-send email records).
pub struct InMemoryEventBus {
    handlers: RwLock<HashMap<String, Vec<Arc<dyn EventHandler>>>>,
    published: RwLock<Vec<EventEnvelope>>,
}

impl InMemoryEventBus {
    pub fn new() -> Self {
        Self {
            handlers: RwLock::new(HashMap::new()),
            published: RwLock::new(Vec::new()),
        }
    }

    // === Test helpers ===

    /// All envelopes published so far, in publish order.
    pub fn published_events(&self) -> Vec<EventEnvelope> {
        self.published
            .read()
            .expect("event bus: published lock poisoned")
            .clone()
    }

    /// Envelopes of one event type, in publish order.
    pub fn events_of_type(&self, event_type: &str) -> Vec<EventEnvelope> {
        self.published_events()
            .into_iter()
            .filter(|e| e.event_type == event_type)
            .collect()
    }

    /// Envelopes emitted by one aggregate, in publish order.
    pub fn events_for_aggregate(&self, aggregate_id: &str) -> Vec<EventEnvelope> {
        self.published_events()
            .into_iter()
            .filter(|e| e.aggregate_id == aggregate_id)
            .collect()
    }

    /// Drops captured envelopes. Subscriptions stay registered.
    pub fn clear(&self) {
        self.published
            .write()
            .expect("event bus: published lock poisoned")
            .clear();
    }

    pub fn event_count(&self) -> usize {
        self.published
            .read()
            .expect("event bus: published lock poisoned")
            .len()
    }

    pub fn has_event(&self, event_type: &str) -> bool {
        self.published
            .read()
            .expect("event bus: published lock poisoned")
            .iter()
            .any(|e| e.event_type == event_type)
    }
}

impl Default for InMemoryEventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EventPublisher for InMemoryEventBus {
    async fn publish(&self, event: EventEnvelope) -> Result<(), DomainError> {
        self.published
            .write()
            .expect("event bus: published lock poisoned")
            .push(event.clone());

        // Snapshot the subscriber list so no lock is held across awaits
        let subscribers: Vec<Arc<dyn EventHandler>> = {
            let handlers = self
                .handlers
                .read()
                .expect("event bus: handlers lock poisoned");
            handlers
                .get(&event.event_type)
                .cloned()
                .unwrap_or_default()
        };

        for handler in subscribers {
            if let Err(e) = handler.handle(event.clone()).await {
                warn!(
                    handler = handler.name(),
                    event_type = %event.event_type,
                    event_id = %event.event_id,
                    error = %e,
                    "Event handler failed, continuing dispatch"
                );
            }
        }

        Ok(())
    }

    async fn publish_all(&self, events: Vec<EventEnvelope>) -> Result<(), DomainError> {
        for event in events {
            self.publish(event).await?;
        }
        Ok(())
    }
}

impl EventSubscriber for InMemoryEventBus {
    fn subscribe(&self, event_type: &str, handler: Arc<dyn EventHandler>) {
        let mut handlers = self
            .handlers
            .write()
            .expect("event bus: handlers lock poisoned");
        handlers
            .entry(event_type.to_string())
            .or_default()
            .push(handler);
    }

    fn subscribe_all(&self, event_types: &[&str], handler: Arc<dyn EventHandler>) {
        let mut handlers = self
            .handlers
            .write()
            .expect("event bus: handlers lock poisoned");
        for event_type in event_types {
            handlers
                .entry(event_type.to_string())
                .or_default()
                .push(Arc::clone(&handler));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::ErrorCode;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn envelope(event_type: &str, aggregate_id: &str) -> EventEnvelope {
        EventEnvelope::new(event_type, aggregate_id, "Session", json!({}))
    }

    struct CountingHandler(Arc<AtomicUsize>);

    #[async_trait]
    impl EventHandler for CountingHandler {
        async fn handle(&self, _: EventEnvelope) -> Result<(), DomainError> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        fn name(&self) -> &'static str {
            "CountingHandler"
        }
    }

    struct FailingHandler;

    #[async_trait]
    impl EventHandler for FailingHandler {
        async fn handle(&self, _: EventEnvelope) -> Result<(), DomainError> {
            Err(DomainError::new(ErrorCode::InternalError, "Handler failed"))
        }

        fn name(&self) -> &'static str {
            "FailingHandler"
        }
    }

    #[tokio::test]
    async fn publish_records_the_envelope() {
        let bus = InMemoryEventBus::new();

        bus.publish(envelope("session.completed.v1", "session-1"))
            .await
            .unwrap();

        assert_eq!(bus.event_count(), 1);
        assert!(bus.has_event("session.completed.v1"));
        assert!(!bus.has_event("drill.scored.v1"));
    }

    #[tokio::test]
    async fn subscribed_handler_sees_only_its_event_type() {
        let bus = InMemoryEventBus::new();
        let seen = Arc::new(AtomicUsize::new(0));

        bus.subscribe(
            "session.completed.v1",
            Arc::new(CountingHandler(seen.clone())),
        );

        bus.publish(envelope("session.started.v1", "session-1"))
            .await
            .unwrap();
        bus.publish(envelope("session.completed.v1", "session-1"))
            .await
            .unwrap();

        assert_eq!(seen.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn every_subscriber_of_a_type_is_invoked() {
        let bus = InMemoryEventBus::new();
        let seen = Arc::new(AtomicUsize::new(0));

        bus.subscribe("drill.scored.v1", Arc::new(CountingHandler(seen.clone())));
        bus.subscribe("drill.scored.v1", Arc::new(CountingHandler(seen.clone())));

        bus.publish(envelope("drill.scored.v1", "record-1"))
            .await
            .unwrap();

        assert_eq!(seen.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn subscribe_all_covers_every_listed_type() {
        let bus = InMemoryEventBus::new();
        let seen = Arc::new(AtomicUsize::new(0));

        bus.subscribe_all(
            &["session.started.v1", "session.completed.v1"],
            Arc::new(CountingHandler(seen.clone())),
        );

        bus.publish(envelope("session.started.v1", "session-1"))
            .await
            .unwrap();
        bus.publish(envelope("session.completed.v1", "session-1"))
            .await
            .unwrap();
        bus.publish(envelope("email.sent.v1", "record-1"))
            .await
            .unwrap();

        assert_eq!(seen.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn failing_handler_does_not_fail_publish_or_block_others() {
        let bus = InMemoryEventBus::new();
        let seen = Arc::new(AtomicUsize::new(0));

        bus.subscribe("session.completed.v1", Arc::new(FailingHandler));
        bus.subscribe(
            "session.completed.v1",
            Arc::new(CountingHandler(seen.clone())),
        );

        let result = bus
            .publish(envelope("session.completed.v1", "session-1"))
            .await;

        assert!(result.is_ok());
        assert_eq!(seen.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn publish_all_keeps_order() {
        let bus = InMemoryEventBus::new();

        bus.publish_all(vec![
            envelope("session.completed.v1", "session-1"),
            envelope("drill.scored.v1", "record-1"),
            envelope("email.sent.v1", "send-1"),
        ])
        .await
        .unwrap();

        let order: Vec<String> = bus
            .published_events()
            .into_iter()
            .map(|e| e.event_type)
            .collect();
        assert_eq!(
            order,
            vec!["session.completed.v1", "drill.scored.v1", "email.sent.v1"]
        );
    }

    #[tokio::test]
    async fn capture_filters_by_type_and_aggregate() {
        let bus = InMemoryEventBus::new();

        bus.publish(envelope("session.completed.v1", "session-1"))
            .await
            .unwrap();
        bus.publish(envelope("session.completed.v1", "session-2"))
            .await
            .unwrap();
        bus.publish(envelope("drill.scored.v1", "session-1"))
            .await
            .unwrap();

        assert_eq!(bus.events_of_type("session.completed.v1").len(), 2);
        assert_eq!(bus.events_for_aggregate("session-1").len(), 2);
    }

    #[tokio::test]
    async fn clear_drops_capture_but_keeps_subscriptions() {
        let bus = InMemoryEventBus::new();
        let seen = Arc::new(AtomicUsize::new(0));

        bus.subscribe(
            "session.completed.v1",
            Arc::new(CountingHandler(seen.clone())),
        );
        bus.publish(envelope("session.completed.v1", "session-1"))
            .await
            .unwrap();
        bus.clear();

        assert_eq!(bus.event_count(), 0);

        bus.publish(envelope("session.completed.v1", "session-2"))
            .await
            .unwrap();

        assert_eq!(bus.event_count(), 1);
        assert_eq!(seen.load(Ordering::SeqCst), 2);
    }
}
