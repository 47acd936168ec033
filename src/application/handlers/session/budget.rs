//! Daily exchange budget enforcement shared by the session handlers.

use std::sync::Arc;

use crate::domain::foundation::{Timestamp, UserId};
use crate::domain::membership::{DailyBudgets, MembershipTier};
use crate::domain::session::SessionError;
use crate::ports::{ExchangeLog, MembershipReader};

/// Checks a user's daily exchange budget against their membership tier.
///
/// Users without a membership record are treated as Free tier. The budget
/// counts entries the user authored since the start of the current UTC day,
/// so it resets at midnight rather than on a rolling window.
pub struct ExchangeBudget {
    exchanges: Arc<dyn ExchangeLog>,
    memberships: Arc<dyn MembershipReader>,
    budgets: DailyBudgets,
}

impl ExchangeBudget {
    pub fn new(
        exchanges: Arc<dyn ExchangeLog>,
        memberships: Arc<dyn MembershipReader>,
        budgets: DailyBudgets,
    ) -> Self {
        Self {
            exchanges,
            memberships,
            budgets,
        }
    }

    /// Errors with `LimitReached` when today's budget is already spent.
    /// Unlimited tiers always pass without touching the exchange log.
    pub async fn ensure_available(&self, user_id: &UserId) -> Result<(), SessionError> {
        let tier = self
            .memberships
            .get_by_user(user_id)
            .await?
            .map(|view| view.tier)
            .unwrap_or(MembershipTier::Free);

        let budget = match self.budgets.for_tier(tier) {
            Some(budget) => budget,
            None => return Ok(()),
        };

        let used = self
            .exchanges
            .count_user_entries_since(user_id, Timestamp::start_of_today())
            .await?;
        if used >= budget {
            return Err(SessionError::limit_reached(used, budget));
        }
        Ok(())
    }
}
