//! Immutable record of one scored response.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::catalog::{CriterionKey, CriterionValue, DrillPhase, DrillType, ModeKey};
use crate::domain::foundation::{ScoreRecordId, SessionId, Timestamp, UserId};

/// Criterion outcomes for one scored response.
///
/// Keyed map rather than a fixed struct: the criteria set varies by drill
/// type, and criteria the oracle failed to judge are simply absent.
pub type CriterionOutcomes = BTreeMap<CriterionKey, CriterionValue>;

/// One scored answer, written once by the scoring pipeline.
///
/// # Invariants
///
/// - immutable once written; corrections produce a new record
/// - absent criteria mean "not judged", never pass or fail
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreRecord {
    /// Unique identifier for this record.
    id: ScoreRecordId,

    /// User whose response was scored.
    user_id: UserId,

    /// Session the response belongs to.
    session_id: SessionId,

    /// Practice mode the session was running.
    mode: ModeKey,

    /// Drill type whose rubric was applied.
    drill_type: DrillType,

    /// Phase tag the answered card carried.
    drill_phase: DrillPhase,

    /// Whether this was a retry of an already-attempted drill.
    is_iteration: bool,

    /// Judged outcome per criterion; unjudged criteria are absent.
    outcomes: CriterionOutcomes,

    /// Raw response text as submitted.
    response_text: String,

    /// Whitespace-delimited word count of the response.
    word_count: u32,

    /// When the record was written.
    created_at: Timestamp,
}

impl ScoreRecord {
    /// Creates a new score record. Word count is derived from the text.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        user_id: UserId,
        session_id: SessionId,
        mode: ModeKey,
        drill_type: DrillType,
        drill_phase: DrillPhase,
        is_iteration: bool,
        outcomes: CriterionOutcomes,
        response_text: impl Into<String>,
    ) -> Self {
        let response_text = response_text.into();
        let word_count = response_text.split_whitespace().count() as u32;
        Self {
            id: ScoreRecordId::new(),
            user_id,
            session_id,
            mode,
            drill_type,
            drill_phase,
            is_iteration,
            outcomes,
            response_text,
            word_count,
            created_at: Timestamp::now(),
        }
    }

    /// Reconstitute a record from persistence.
    #[allow(clippy::too_many_arguments)]
    pub fn reconstitute(
        id: ScoreRecordId,
        user_id: UserId,
        session_id: SessionId,
        mode: ModeKey,
        drill_type: DrillType,
        drill_phase: DrillPhase,
        is_iteration: bool,
        outcomes: CriterionOutcomes,
        response_text: String,
        word_count: u32,
        created_at: Timestamp,
    ) -> Self {
        Self {
            id,
            user_id,
            session_id,
            mode,
            drill_type,
            drill_phase,
            is_iteration,
            outcomes,
            response_text,
            word_count,
            created_at,
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────────

    pub fn id(&self) -> &ScoreRecordId {
        &self.id
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    pub fn mode(&self) -> &ModeKey {
        &self.mode
    }

    pub fn drill_type(&self) -> &DrillType {
        &self.drill_type
    }

    pub fn drill_phase(&self) -> &DrillPhase {
        &self.drill_phase
    }

    pub fn is_iteration(&self) -> bool {
        self.is_iteration
    }

    pub fn outcomes(&self) -> &CriterionOutcomes {
        &self.outcomes
    }

    pub fn response_text(&self) -> &str {
        &self.response_text
    }

    pub fn word_count(&self) -> u32 {
        self.word_count
    }

    pub fn created_at(&self) -> &Timestamp {
        &self.created_at
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Queries
    // ─────────────────────────────────────────────────────────────────────────

    /// Returns the outcome for a criterion, if it was judged.
    pub fn outcome(&self, key: &CriterionKey) -> Option<&CriterionValue> {
        self.outcomes.get(key)
    }

    /// Returns the keys of all judged criteria.
    pub fn judged_criteria(&self) -> Vec<CriterionKey> {
        self.outcomes.keys().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_record(outcomes: CriterionOutcomes, text: &str) -> ScoreRecord {
        ScoreRecord::new(
            UserId::new("user-1").unwrap(),
            SessionId::new(),
            ModeKey::from("assertiveness"),
            DrillType::from("direct_ask"),
            DrillPhase::from("Opening Ask"),
            false,
            outcomes,
            text,
        )
    }

    #[test]
    fn word_count_derived_from_text() {
        let record = test_record(BTreeMap::new(), "I need the budget approved today");
        assert_eq!(record.word_count(), 6);

        let empty = test_record(BTreeMap::new(), "   ");
        assert_eq!(empty.word_count(), 0);
    }

    #[test]
    fn absent_criterion_has_no_outcome() {
        let mut outcomes = BTreeMap::new();
        outcomes.insert(CriterionKey::from("hedging"), CriterionValue::Flag(false));
        let record = test_record(outcomes, "Done.");

        assert!(record.outcome(&CriterionKey::from("hedging")).is_some());
        assert!(record.outcome(&CriterionKey::from("apology")).is_none());
    }

    #[test]
    fn judged_criteria_lists_present_keys() {
        let mut outcomes = BTreeMap::new();
        outcomes.insert(CriterionKey::from("hedging"), CriterionValue::Flag(true));
        outcomes.insert(CriterionKey::from("filler_phrases"), CriterionValue::Count(2));
        let record = test_record(outcomes, "Well, um, maybe we could try");

        let keys = record.judged_criteria();
        assert_eq!(keys.len(), 2);
        assert!(keys.contains(&CriterionKey::from("hedging")));
    }

    #[test]
    fn record_serialization_round_trips() {
        let mut outcomes = BTreeMap::new();
        outcomes.insert(CriterionKey::from("hedging"), CriterionValue::Flag(true));
        let record = test_record(outcomes, "Maybe we could look at it?");

        let json = serde_json::to_string(&record).unwrap();
        let restored: ScoreRecord = serde_json::from_str(&json).unwrap();

        assert_eq!(restored.id(), record.id());
        assert_eq!(restored.word_count(), record.word_count());
        assert_eq!(
            restored.outcome(&CriterionKey::from("hedging")),
            Some(&CriterionValue::Flag(true))
        );
    }
}
