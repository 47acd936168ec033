//! Membership reader port (read side / CQRS queries).
//!
//! The platform never writes membership state; billing lives elsewhere.
//! This reader answers the two questions the gate and the notification
//! triggers ask: what tier is this user on, and where do we email them.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{DomainError, UserId};
use crate::domain::membership::MembershipTier;

/// Reader port for membership lookups.
///
/// Implementations may cache aggressively; tier changes are rare and a
/// short staleness window only delays an unlock.
#[async_trait]
pub trait MembershipReader: Send + Sync {
    /// Get the membership view for a user.
    ///
    /// Returns `None` for an unknown user; callers treat that as the
    /// free tier with notifications disabled.
    async fn get_by_user(&self, user_id: &UserId) -> Result<Option<MembershipView>, DomainError>;
}

/// What the platform knows about a user's plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MembershipView {
    /// User who owns this membership.
    pub user_id: UserId,

    /// Plan tier.
    pub tier: MembershipTier,

    /// Address notification emails go to.
    pub email: String,

    /// Whether the user opted out of the weekly report.
    pub weekly_reports_opted_out: bool,
}

impl MembershipView {
    /// The free-tier fallback for users the reader doesn't know.
    pub fn free(user_id: UserId) -> Self {
        Self {
            user_id,
            tier: MembershipTier::Free,
            email: String::new(),
            weekly_reports_opted_out: true,
        }
    }

    pub fn can_email(&self) -> bool {
        !self.email.is_empty()
    }
}
