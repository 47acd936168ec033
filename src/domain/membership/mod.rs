//! Membership domain module.
//!
//! Reference data for plan tiers and their usage limits. Billing itself
//! lives outside this service; the rest of the system only asks two
//! questions of a membership: what is the daily exchange budget, and are
//! insights unlocked.
//!
//! # Module Structure
//!
//! - `tier` - MembershipTier subscription levels
//! - `tier_limits` - Usage limits per tier

mod tier;
mod tier_limits;

pub use tier::MembershipTier;
pub use tier_limits::{DailyBudgets, TierLimits};
