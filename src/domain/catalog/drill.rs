//! Drill and practice-mode reference data.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::{DimensionKey, DrillPhase};

/// Key identifying a drill type (rubric family), e.g. "direct_ask".
///
/// Drill types are an open set defined by the catalog; an unknown drill
/// type is a scoring no-op, not an error.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DrillType(String);

impl DrillType {
    /// Creates a drill type key from a string.
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Returns the inner string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DrillType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for DrillType {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Key identifying a practice mode (e.g., "assertiveness").
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModeKey(String);

impl ModeKey {
    /// Creates a mode key from a string.
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Returns the inner string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ModeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ModeKey {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// How the user answers a drill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputKind {
    Text,
    MultipleChoice,
}

impl Default for InputKind {
    fn default() -> Self {
        InputKind::Text
    }
}

/// One scripted step of a practice mode. Immutable reference data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrillSpec {
    /// Stable key, unique within the mode.
    pub key: String,

    /// Ordering position within the mode (0-based).
    pub position: u32,

    /// Rubric family applied when scoring answers to this drill.
    pub drill_type: DrillType,

    /// Phase tag stamped on this drill's scenario and answer records.
    pub phase: DrillPhase,

    /// Skill dimensions this drill is meant to exercise.
    pub dimensions: Vec<DimensionKey>,

    /// How the user answers.
    #[serde(default)]
    pub input: InputKind,

    /// Scenario text presented to the user.
    pub scenario: String,

    /// One-time teaching card shown before the first encounter.
    #[serde(default)]
    pub insight: Option<String>,

    /// Choices for multiple-choice drills.
    #[serde(default)]
    pub choices: Vec<String>,

    /// Word limit the response should respect, if any.
    #[serde(default)]
    pub word_limit: Option<u32>,

    /// Optional countdown timer in seconds.
    #[serde(default)]
    pub timer_seconds: Option<u32>,
}

/// A practice mode: an ordered drill script plus level progression rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModeSpec {
    /// Human-readable label.
    pub label: String,

    /// Highest reachable level for this mode.
    pub max_level: u32,

    /// Exchange thresholds per level: `level_thresholds[0]` is the number
    /// of exchanges needed to go from level 1 to 2, and so on. Levels past
    /// the table reuse the last entry.
    pub level_thresholds: Vec<u32>,

    /// Drills in presentation order.
    pub drills: Vec<DrillSpec>,
}

impl ModeSpec {
    /// Returns the drill at the given index, ordered by position.
    pub fn drill_at(&self, index: u32) -> Option<&DrillSpec> {
        self.drills.get(index as usize)
    }

    /// Returns the number of drills in this mode.
    pub fn drill_count(&self) -> u32 {
        self.drills.len() as u32
    }

    /// Returns the exchange threshold to advance from the given level.
    ///
    /// Levels beyond the configured table fall back to the last entry so a
    /// capped mode still has a defined reset point. Returns None only when
    /// the table is empty.
    pub fn threshold_for(&self, level: u32) -> Option<u32> {
        if self.level_thresholds.is_empty() {
            return None;
        }
        let index = (level.saturating_sub(1) as usize).min(self.level_thresholds.len() - 1);
        Some(self.level_thresholds[index])
    }
}
