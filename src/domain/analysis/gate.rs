//! Access gate for the insights surface.

use serde::{Deserialize, Serialize};

use crate::domain::membership::MembershipTier;

use super::AnalysisThresholds;

/// Outcome of the insights access check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GateDecision {
    /// Too few completed sessions to say anything meaningful.
    InsufficientData,

    /// Enough data, but the user's tier does not include insights.
    RequiresUpgrade,

    /// Full insights available.
    Unlocked,
}

impl GateDecision {
    pub fn as_str(&self) -> &'static str {
        match self {
            GateDecision::InsufficientData => "insufficient_data",
            GateDecision::RequiresUpgrade => "requires_upgrade",
            GateDecision::Unlocked => "unlocked",
        }
    }

    pub fn is_unlocked(&self) -> bool {
        matches!(self, GateDecision::Unlocked)
    }
}

/// Decides what a user may see of their own analysis.
///
/// Data sufficiency is checked before tier: a free user with two
/// sessions is told to practice more, not to upgrade.
#[derive(Debug, Clone)]
pub struct AccessGate {
    thresholds: AnalysisThresholds,
}

impl AccessGate {
    pub fn new(thresholds: AnalysisThresholds) -> Self {
        Self { thresholds }
    }

    pub fn evaluate(&self, completed_sessions: u32, tier: MembershipTier) -> GateDecision {
        if !self.thresholds.has_enough_sessions(completed_sessions) {
            return GateDecision::InsufficientData;
        }
        if !tier.unlocks_insights() {
            return GateDecision::RequiresUpgrade;
        }
        GateDecision::Unlocked
    }

    pub fn sessions_until_insights(&self, completed_sessions: u32) -> u32 {
        self.thresholds.sessions_until_insights(completed_sessions)
    }
}
