//! Scoring domain events.
//!
//! - `DrillScored` - A response was judged and its scores persisted

use serde::{Deserialize, Serialize};

use crate::domain::catalog::{DimensionKey, DrillPhase, DrillType, ModeKey};
use crate::domain::foundation::{
    domain_event, EventId, ScoreRecordId, SessionId, Timestamp, UserId,
};

// ════════════════════════════════════════════════════════════════════════════
// DrillScored
// ════════════════════════════════════════════════════════════════════════════

/// Published after the scoring pipeline persists a score record and its
/// derived dimension scores.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DrillScored {
    /// Unique identifier for this event.
    pub event_id: EventId,

    /// Score record that was written.
    pub score_record_id: ScoreRecordId,

    /// Session the scored response belongs to.
    pub session_id: SessionId,

    /// User whose response was scored.
    pub user_id: UserId,

    /// Practice mode that was running.
    pub mode: ModeKey,

    /// Drill type whose rubric was applied.
    pub drill_type: DrillType,

    /// Phase tag the answered card carried.
    pub drill_phase: DrillPhase,

    /// Whether the response was a retry.
    pub is_iteration: bool,

    /// Dimensions that received a derived score.
    pub dimensions: Vec<DimensionKey>,

    /// When scoring finished.
    pub scored_at: Timestamp,
}

domain_event!(
    DrillScored,
    event_type = "drill.scored.v1",
    schema_version = 1,
    aggregate_id = score_record_id,
    aggregate_type = "ScoreRecord",
    occurred_at = scored_at,
    event_id = event_id
);
