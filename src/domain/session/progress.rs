//! Per-user, per-mode progress aggregate.
//!
//! Tracks level and lifetime counters for one user in one practice mode.
//! Accepted responses accumulate toward the mode's per-level exchange
//! thresholds; the level check runs once per completed session. Drill
//! completions are recorded by the scoring pipeline, first attempts only.

use serde::{Deserialize, Serialize};

use crate::domain::catalog::{ModeKey, ModeSpec};
use crate::domain::foundation::{Timestamp, UserId};

/// Outcome of a level evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LevelChange {
    /// The user moved up a level.
    Advanced { new_level: u32 },
    /// The user hit the threshold at the mode's maximum level.
    Capped { level: u32 },
}

/// Progress aggregate - one user's standing in one practice mode.
///
/// # Invariants
///
/// - `level` starts at 1 and never exceeds the mode's `max_level`
/// - `exchanges_at_level` resets to zero whenever a threshold is crossed,
///   including at the level cap
/// - lifetime counters are monotonic non-decreasing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    /// Owner of this progress record.
    user_id: UserId,

    /// Practice mode this record tracks.
    mode: ModeKey,

    /// Current level, starting at 1.
    level: u32,

    /// Accepted responses counted toward the next level.
    exchanges_at_level: u32,

    /// Lifetime completed sessions in this mode.
    sessions_completed: u32,

    /// Lifetime first-attempt drill completions in this mode.
    drills_completed: u32,

    /// Lifetime accepted responses in this mode.
    exchanges_recorded: u32,

    /// When this record was created.
    created_at: Timestamp,

    /// When this record last changed.
    updated_at: Timestamp,
}

impl Progress {
    /// Creates a fresh record at level 1 with all counters at zero.
    pub fn new(user_id: UserId, mode: ModeKey) -> Self {
        let now = Timestamp::now();
        Self {
            user_id,
            mode,
            level: 1,
            exchanges_at_level: 0,
            sessions_completed: 0,
            drills_completed: 0,
            exchanges_recorded: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Reconstitute a record from persistence (no validation, no events).
    #[allow(clippy::too_many_arguments)]
    pub fn reconstitute(
        user_id: UserId,
        mode: ModeKey,
        level: u32,
        exchanges_at_level: u32,
        sessions_completed: u32,
        drills_completed: u32,
        exchanges_recorded: u32,
        created_at: Timestamp,
        updated_at: Timestamp,
    ) -> Self {
        Self {
            user_id,
            mode,
            level,
            exchanges_at_level,
            sessions_completed,
            drills_completed,
            exchanges_recorded,
            created_at,
            updated_at,
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────────

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    pub fn mode(&self) -> &ModeKey {
        &self.mode
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn exchanges_at_level(&self) -> u32 {
        self.exchanges_at_level
    }

    pub fn sessions_completed(&self) -> u32 {
        self.sessions_completed
    }

    pub fn drills_completed(&self) -> u32 {
        self.drills_completed
    }

    pub fn exchanges_recorded(&self) -> u32 {
        self.exchanges_recorded
    }

    pub fn created_at(&self) -> &Timestamp {
        &self.created_at
    }

    pub fn updated_at(&self) -> &Timestamp {
        &self.updated_at
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Mutations
    // ─────────────────────────────────────────────────────────────────────────

    /// Records one accepted user response.
    pub fn record_exchange(&mut self) {
        self.exchanges_recorded += 1;
        self.exchanges_at_level += 1;
        self.touch();
    }

    /// Records one first-attempt drill completion.
    pub fn record_drill_completed(&mut self) {
        self.drills_completed += 1;
        self.touch();
    }

    /// Records one completed session.
    pub fn record_session_completed(&mut self) {
        self.sessions_completed += 1;
        self.touch();
    }

    /// Runs the level check against the mode's thresholds.
    ///
    /// Called once per completed session. Crossing a threshold below the
    /// mode's `max_level` advances the level; crossing it at `max_level`
    /// reports the cap. Both outcomes reset the exchange counter so the
    /// next stretch starts from zero.
    pub fn evaluate_level(&mut self, spec: &ModeSpec) -> Option<LevelChange> {
        let threshold = spec.threshold_for(self.level)?;
        if self.exchanges_at_level < threshold {
            return None;
        }

        self.exchanges_at_level = 0;
        self.touch();

        if self.level < spec.max_level {
            self.level += 1;
            Some(LevelChange::Advanced {
                new_level: self.level,
            })
        } else {
            Some(LevelChange::Capped { level: self.level })
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Private helpers
    // ─────────────────────────────────────────────────────────────────────────

    fn touch(&mut self) {
        self.updated_at = Timestamp::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::catalog::CriteriaRegistry;

    fn test_user_id() -> UserId {
        UserId::new("user-123").unwrap()
    }

    fn test_progress() -> Progress {
        Progress::new(test_user_id(), ModeKey::from("assertiveness"))
    }

    fn assertiveness_spec() -> ModeSpec {
        CriteriaRegistry::builtin()
            .mode(&ModeKey::from("assertiveness"))
            .cloned()
            .unwrap()
    }

    #[test]
    fn new_progress_starts_at_level_one() {
        let progress = test_progress();
        assert_eq!(progress.level(), 1);
        assert_eq!(progress.exchanges_at_level(), 0);
        assert_eq!(progress.sessions_completed(), 0);
    }

    #[test]
    fn counters_accumulate() {
        let mut progress = test_progress();
        progress.record_exchange();
        progress.record_exchange();
        progress.record_drill_completed();
        progress.record_session_completed();

        assert_eq!(progress.exchanges_recorded(), 2);
        assert_eq!(progress.exchanges_at_level(), 2);
        assert_eq!(progress.drills_completed(), 1);
        assert_eq!(progress.sessions_completed(), 1);
    }

    #[test]
    fn drill_completions_do_not_count_toward_level() {
        let mut progress = test_progress();
        let spec = assertiveness_spec();

        for _ in 0..20 {
            progress.record_drill_completed();
        }
        assert_eq!(progress.evaluate_level(&spec), None);
        assert_eq!(progress.level(), 1);
    }

    #[test]
    fn below_threshold_no_level_change() {
        let mut progress = test_progress();
        let spec = assertiveness_spec();

        for _ in 0..9 {
            progress.record_exchange();
        }
        assert_eq!(progress.evaluate_level(&spec), None);
        assert_eq!(progress.level(), 1);
        assert_eq!(progress.exchanges_at_level(), 9);
    }

    #[test]
    fn crossing_threshold_advances_and_resets_counter() {
        let mut progress = test_progress();
        let spec = assertiveness_spec();

        for _ in 0..10 {
            progress.record_exchange();
        }
        assert_eq!(
            progress.evaluate_level(&spec),
            Some(LevelChange::Advanced { new_level: 2 })
        );
        assert_eq!(progress.level(), 2);
        assert_eq!(progress.exchanges_at_level(), 0);
        assert_eq!(progress.exchanges_recorded(), 10);
    }

    #[test]
    fn evaluation_is_per_session_not_per_exchange() {
        let mut progress = test_progress();
        let spec = assertiveness_spec();

        // Overshooting between evaluations still yields a single advance.
        for _ in 0..14 {
            progress.record_exchange();
        }
        assert_eq!(
            progress.evaluate_level(&spec),
            Some(LevelChange::Advanced { new_level: 2 })
        );
        assert_eq!(progress.evaluate_level(&spec), None);
    }

    #[test]
    fn cap_is_reported_and_counter_still_resets() {
        let mut progress = Progress::reconstitute(
            test_user_id(),
            ModeKey::from("assertiveness"),
            5,
            70,
            40,
            200,
            400,
            Timestamp::now(),
            Timestamp::now(),
        );
        let spec = assertiveness_spec();

        assert_eq!(
            progress.evaluate_level(&spec),
            Some(LevelChange::Capped { level: 5 })
        );
        assert_eq!(progress.level(), 5);
        assert_eq!(progress.exchanges_at_level(), 0);
    }

    #[test]
    fn level_change_serializes_with_kind_tag() {
        let change = LevelChange::Advanced { new_level: 3 };
        let json = serde_json::to_value(&change).unwrap();
        assert_eq!(json["kind"], "advanced");
        assert_eq!(json["new_level"], 3);
    }
}
