//! Email sender port.
//!
//! Delivery only. Composition happens in the domain, idempotency in the
//! send store; this port owns nothing but the outbound call.

use async_trait::async_trait;

use crate::domain::notification::{EmailMessage, NotificationError};

/// Port for dispatching a composed email.
#[async_trait]
pub trait EmailSender: Send + Sync {
    /// Send one message.
    ///
    /// # Errors
    ///
    /// - `Delivery` when the provider rejects or fails the send
    async fn send(&self, message: &EmailMessage) -> Result<(), NotificationError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    // Trait object safety test
    #[test]
    fn email_sender_is_object_safe() {
        fn _accepts_dyn(_sender: &dyn EmailSender) {}
    }
}
