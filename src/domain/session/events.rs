//! Session domain events.
//!
//! Events published when session lifecycle changes occur:
//! - `SessionStarted` - New practice session started
//! - `SessionCompleted` - Session finished its drill script

use serde::{Deserialize, Serialize};

use super::LevelChange;
use crate::domain::catalog::ModeKey;
use crate::domain::foundation::{domain_event, EventId, SessionId, Timestamp, UserId};

// ════════════════════════════════════════════════════════════════════════════
// SessionStarted
// ════════════════════════════════════════════════════════════════════════════

/// Published when a new practice session starts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionStarted {
    /// Unique identifier for this event.
    pub event_id: EventId,

    /// ID of the started session.
    pub session_id: SessionId,

    /// User running the session.
    pub user_id: UserId,

    /// Practice mode being run.
    pub mode: ModeKey,

    /// The user's level in this mode at session start.
    pub level_at_start: u32,

    /// When the session started.
    pub started_at: Timestamp,
}

domain_event!(
    SessionStarted,
    event_type = "session.started.v1",
    schema_version = 1,
    aggregate_id = session_id,
    aggregate_type = "Session",
    occurred_at = started_at,
    event_id = event_id
);

// ════════════════════════════════════════════════════════════════════════════
// SessionCompleted
// ════════════════════════════════════════════════════════════════════════════

/// Published when a session finishes its drill script.
///
/// Drives the post-session pipeline: progress is already persisted when
/// this fires, so subscribers may read it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionCompleted {
    /// Unique identifier for this event.
    pub event_id: EventId,

    /// ID of the completed session.
    pub session_id: SessionId,

    /// User who completed the session.
    pub user_id: UserId,

    /// Practice mode that was run.
    pub mode: ModeKey,

    /// Accepted user responses over the whole session.
    pub exchange_count: u32,

    /// Drills finished during this session.
    pub drills_completed: u32,

    /// Level change produced by this session's level check, if any.
    pub level_change: Option<LevelChange>,

    /// When the session completed.
    pub completed_at: Timestamp,
}

domain_event!(
    SessionCompleted,
    event_type = "session.completed.v1",
    schema_version = 1,
    aggregate_id = session_id,
    aggregate_type = "Session",
    occurred_at = completed_at,
    event_id = event_id
);

// ════════════════════════════════════════════════════════════════════════════
// Unit Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{DomainEvent, EventEnvelope};

    fn test_user_id() -> UserId {
        UserId::new("user-1").unwrap()
    }

    // ────────────────────────────────────────────────────────────────────────
    // SessionStarted Tests
    // ────────────────────────────────────────────────────────────────────────

    #[test]
    fn session_started_implements_domain_event() {
        let event = SessionStarted {
            event_id: EventId::new(),
            session_id: SessionId::new(),
            user_id: test_user_id(),
            mode: ModeKey::from("assertiveness"),
            level_at_start: 1,
            started_at: Timestamp::now(),
        };

        assert_eq!(event.event_type(), "session.started.v1");
        assert_eq!(event.schema_version(), 1);
        assert_eq!(event.aggregate_type(), "Session");
        assert!(!event.aggregate_id().is_empty());
    }

    #[test]
    fn session_started_serializes_to_json() {
        let session_id = SessionId::new();
        let event = SessionStarted {
            event_id: EventId::from_string("evt-1"),
            session_id,
            user_id: test_user_id(),
            mode: ModeKey::from("brevity"),
            level_at_start: 2,
            started_at: Timestamp::now(),
        };

        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("brevity"));
        assert!(json.contains(&session_id.to_string()));
    }

    #[test]
    fn session_started_envelope_carries_version() {
        let event = SessionStarted {
            event_id: EventId::from_string("evt-123"),
            session_id: SessionId::new(),
            user_id: test_user_id(),
            mode: ModeKey::from("assertiveness"),
            level_at_start: 1,
            started_at: Timestamp::now(),
        };

        let envelope = EventEnvelope::from_event(&event);
        assert_eq!(envelope.event_type, "session.started.v1");
        assert_eq!(envelope.schema_version, 1);
        assert_eq!(envelope.event_id.as_str(), "evt-123");
    }

    // ────────────────────────────────────────────────────────────────────────
    // SessionCompleted Tests
    // ────────────────────────────────────────────────────────────────────────

    #[test]
    fn session_completed_implements_domain_event() {
        let event = SessionCompleted {
            event_id: EventId::new(),
            session_id: SessionId::new(),
            user_id: test_user_id(),
            mode: ModeKey::from("assertiveness"),
            exchange_count: 5,
            drills_completed: 3,
            level_change: None,
            completed_at: Timestamp::now(),
        };

        assert_eq!(event.event_type(), "session.completed.v1");
        assert_eq!(event.aggregate_type(), "Session");
    }

    #[test]
    fn session_completed_carries_level_change() {
        let event = SessionCompleted {
            event_id: EventId::new(),
            session_id: SessionId::new(),
            user_id: test_user_id(),
            mode: ModeKey::from("assertiveness"),
            exchange_count: 6,
            drills_completed: 3,
            level_change: Some(LevelChange::Advanced { new_level: 2 }),
            completed_at: Timestamp::now(),
        };

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["level_change"]["kind"], "advanced");
        assert_eq!(json["level_change"]["new_level"], 2);
    }

    #[test]
    fn session_completed_payload_round_trips() {
        let session_id = SessionId::new();
        let event = SessionCompleted {
            event_id: EventId::from_string("evt-done"),
            session_id,
            user_id: test_user_id(),
            mode: ModeKey::from("brevity"),
            exchange_count: 4,
            drills_completed: 2,
            level_change: Some(LevelChange::Capped { level: 5 }),
            completed_at: Timestamp::now(),
        };

        let envelope = EventEnvelope::from_event(&event);
        let restored: SessionCompleted = envelope.payload_as().unwrap();

        assert_eq!(restored.session_id, session_id);
        assert_eq!(restored.exchange_count, 4);
        assert_eq!(restored.level_change, Some(LevelChange::Capped { level: 5 }));
    }
}
