//! Membership tier definitions.
//!
//! Represents the subscription tier levels available in Candor.

use serde::{Deserialize, Serialize};

/// Membership subscription tier.
///
/// Determines the daily exchange budget and whether blind-spot insights
/// are unlocked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MembershipTier {
    /// Free tier - limited daily practice, insights gated.
    /// - 10 exchanges per day
    /// - Teaser analysis only
    Free,

    /// Pro subscription tier.
    /// - 100 exchanges per day
    /// - Full blind-spot insights and weekly reports
    Pro,

    /// Premium subscription tier.
    /// - Unlimited exchanges
    /// - Full blind-spot insights and weekly reports
    Premium,
}

impl MembershipTier {
    /// Returns true if this tier is a paid tier.
    pub fn is_paid(&self) -> bool {
        !matches!(self, MembershipTier::Free)
    }

    /// Returns true if this tier unlocks full blind-spot insights.
    ///
    /// The access gate and the weekly report both key off this.
    pub fn unlocks_insights(&self) -> bool {
        self.is_paid()
    }

    /// Returns the display name for this tier.
    pub fn display_name(&self) -> &'static str {
        match self {
            MembershipTier::Free => "Free",
            MembershipTier::Pro => "Pro",
            MembershipTier::Premium => "Premium",
        }
    }

    /// Returns the numeric rank of this tier for comparison.
    ///
    /// Higher rank = more features. Used for upgrade validation.
    pub fn rank(&self) -> u8 {
        match self {
            MembershipTier::Free => 0,
            MembershipTier::Pro => 1,
            MembershipTier::Premium => 2,
        }
    }
}

impl std::fmt::Display for MembershipTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}
