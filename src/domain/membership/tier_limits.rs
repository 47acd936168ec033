//! Tier-based usage limits configuration.
//!
//! Defines what each membership tier may do per day and which analysis
//! surfaces it unlocks.

use super::MembershipTier;
use crate::domain::foundation::ValidationError;
use serde::{Deserialize, Serialize};

/// Usage limits for a membership tier.
///
/// Defines the boundaries of what a user can do based on their subscription.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierLimits {
    /// The tier these limits apply to.
    pub tier: MembershipTier,
    /// Maximum accepted responses per calendar day. None = unlimited.
    pub daily_exchange_budget: Option<u32>,
    /// Whether full blind-spot insights are available.
    pub insights_enabled: bool,
    /// Whether the weekly report email is sent.
    pub weekly_report_enabled: bool,
}

impl TierLimits {
    /// Get the limits for a specific tier.
    ///
    /// # Tier Configuration
    ///
    /// | Tier | Exchanges/day | Insights | Weekly report |
    /// |------|---------------|----------|---------------|
    /// | Free | 10 | No | No |
    /// | Pro | 100 | Yes | Yes |
    /// | Premium | Unlimited | Yes | Yes |
    pub fn for_tier(tier: MembershipTier) -> Self {
        match tier {
            MembershipTier::Free => Self {
                tier,
                daily_exchange_budget: Some(10),
                insights_enabled: false,
                weekly_report_enabled: false,
            },
            MembershipTier::Pro => Self {
                tier,
                daily_exchange_budget: Some(100),
                insights_enabled: true,
                weekly_report_enabled: true,
            },
            MembershipTier::Premium => Self {
                tier,
                daily_exchange_budget: None, // Unlimited
                insights_enabled: true,
                weekly_report_enabled: true,
            },
        }
    }

    /// Check if the daily exchange budget has been used up.
    ///
    /// Returns false if unlimited or under budget.
    pub fn budget_reached(&self, exchanges_today: u32) -> bool {
        self.daily_exchange_budget
            .map(|max| exchanges_today >= max)
            .unwrap_or(false)
    }

    /// Remaining exchanges today, if the budget is bounded.
    pub fn remaining_budget(&self, exchanges_today: u32) -> Option<u32> {
        self.daily_exchange_budget
            .map(|max| max.saturating_sub(exchanges_today))
    }
}

/// Deployment-tunable daily exchange budgets per tier.
///
/// Only the budget numbers are meant to move between deployments; feature
/// unlocks (insights, weekly report) stay structural on the tier itself.
/// `None` means unlimited.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyBudgets {
    #[serde(default = "default_free_budget")]
    pub free: Option<u32>,

    #[serde(default = "default_pro_budget")]
    pub pro: Option<u32>,

    #[serde(default = "default_premium_budget")]
    pub premium: Option<u32>,
}

fn default_free_budget() -> Option<u32> {
    TierLimits::for_tier(MembershipTier::Free).daily_exchange_budget
}

fn default_pro_budget() -> Option<u32> {
    TierLimits::for_tier(MembershipTier::Pro).daily_exchange_budget
}

fn default_premium_budget() -> Option<u32> {
    TierLimits::for_tier(MembershipTier::Premium).daily_exchange_budget
}

impl Default for DailyBudgets {
    fn default() -> Self {
        Self {
            free: default_free_budget(),
            pro: default_pro_budget(),
            premium: default_premium_budget(),
        }
    }
}

impl DailyBudgets {
    /// The daily exchange budget for a tier. `None` means unlimited.
    pub fn for_tier(&self, tier: MembershipTier) -> Option<u32> {
        match tier {
            MembershipTier::Free => self.free,
            MembershipTier::Pro => self.pro,
            MembershipTier::Premium => self.premium,
        }
    }

    /// Checks internal consistency of the budget table.
    ///
    /// # Errors
    ///
    /// - `OutOfRange` when a bounded budget is zero, or a paid tier's
    ///   bounded budget is below the free tier's
    pub fn validate(&self) -> Result<(), ValidationError> {
        for (field, budget) in [
            ("plans.free", self.free),
            ("plans.pro", self.pro),
            ("plans.premium", self.premium),
        ] {
            if budget == Some(0) {
                return Err(ValidationError::out_of_range(field, 1, i32::MAX, 0));
            }
        }
        if let (Some(free), Some(pro)) = (self.free, self.pro) {
            if pro < free {
                return Err(ValidationError::out_of_range(
                    "plans.pro",
                    free as i32,
                    i32::MAX,
                    pro as i32,
                ));
            }
        }
        Ok(())
    }
}
