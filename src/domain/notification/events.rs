//! Notification domain events.
//!
//! - `EmailSent` - An email went out and its send record was written

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{domain_event, EmailRecordId, EventId, Timestamp, UserId};

use super::EmailKind;

// ════════════════════════════════════════════════════════════════════════════
// EmailSent
// ════════════════════════════════════════════════════════════════════════════

/// Published after a notification email is dispatched and its send
/// record committed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailSent {
    /// Unique identifier for this event.
    pub event_id: EventId,

    /// Send record that was written.
    pub email_record_id: EmailRecordId,

    /// Recipient user.
    pub user_id: UserId,

    /// Which email went out.
    pub kind: EmailKind,

    /// ISO year of the idempotency week.
    pub iso_year: i32,

    /// ISO week number of the idempotency week.
    pub iso_week: u32,

    /// When the send was recorded.
    pub sent_at: Timestamp,
}

domain_event!(
    EmailSent,
    event_type = "email.sent.v1",
    schema_version = 1,
    aggregate_id = email_record_id,
    aggregate_type = "EmailSend",
    occurred_at = sent_at,
    event_id = event_id
);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{DomainEvent, EventEnvelope};

    fn test_event() -> EmailSent {
        EmailSent {
            event_id: EventId::new(),
            email_record_id: EmailRecordId::new(),
            user_id: UserId::new("user-1").unwrap(),
            kind: EmailKind::Teaser,
            iso_year: 2026,
            iso_week: 34,
            sent_at: Timestamp::now(),
        }
    }

    #[test]
    fn email_sent_implements_domain_event() {
        let event = test_event();
        assert_eq!(event.event_type(), "email.sent.v1");
        assert_eq!(event.aggregate_type(), "EmailSend");
        assert_eq!(event.aggregate_id(), event.email_record_id.to_string());
    }

    #[test]
    fn email_sent_payload_round_trips() {
        let event = test_event();
        let envelope = EventEnvelope::from_event(&event);
        let restored: EmailSent = envelope.payload_as().unwrap();

        assert_eq!(restored.kind, EmailKind::Teaser);
        assert_eq!(restored.iso_week, 34);
    }
}
