//! Drill phase tags and their mapping onto drill types.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::DrillType;

/// Human-readable tag on a card identifying which drill/rubric is active
/// (e.g., "Opening Ask", "Holding Firm").
///
/// Phases are an open set defined by the catalog; unmapped phases are
/// treated as non-scorable rather than rejected.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DrillPhase(String);

impl DrillPhase {
    /// Creates a phase tag from a string.
    pub fn new(phase: impl Into<String>) -> Self {
        Self(phase.into())
    }

    /// Returns the inner string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DrillPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for DrillPhase {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// How a phase maps onto the scoring pipeline.
///
/// A `None` drill type marks the phase as non-scorable (terminal and
/// reflection phases); answers in such phases never enqueue scoring work.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseMapping {
    /// Drill type whose rubric applies, or None for non-scorable phases.
    pub drill_type: Option<DrillType>,

    /// True when this phase is a re-ask of an already-attempted drill.
    #[serde(default)]
    pub is_iteration: bool,
}

impl PhaseMapping {
    /// Returns true if answers in this phase should be scored.
    pub fn is_scorable(&self) -> bool {
        self.drill_type.is_some()
    }
}
