//! Mock email sender for testing.
//!
//! Records every message instead of delivering it, with optional error
//! injection for the idempotency and retry paths.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use crate::domain::notification::{EmailMessage, NotificationError};
use crate::ports::EmailSender;

/// Mock email sender.
///
/// Sends succeed and are recorded unless an error has been queued;
/// queued errors are consumed in order before any send succeeds.
#[derive(Debug, Clone, Default)]
pub struct MockEmailSender {
    /// Delivered messages, in send order.
    sent: Arc<Mutex<Vec<EmailMessage>>>,
    /// Scripted failures (consumed in order).
    failures: Arc<Mutex<VecDeque<NotificationError>>>,
}

impl MockEmailSender {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a failure for the next send.
    pub fn with_failure(self, error: NotificationError) -> Self {
        let mut failures = self.failures.lock().unwrap();
        failures.push_back(error);
        drop(failures);
        self
    }

    /// Returns all recorded messages.
    pub fn sent_messages(&self) -> Vec<EmailMessage> {
        self.sent.lock().unwrap().clone()
    }

    /// Returns the number of delivered messages.
    pub fn sent_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }

    /// Clears the delivery record.
    pub fn clear(&self) {
        self.sent.lock().unwrap().clear();
    }
}

#[async_trait]
impl EmailSender for MockEmailSender {
    async fn send(&self, message: &EmailMessage) -> Result<(), NotificationError> {
        if let Some(error) = self.failures.lock().unwrap().pop_front() {
            return Err(error);
        }

        self.sent.lock().unwrap().push(message.clone());
        Ok(())
    }
}
