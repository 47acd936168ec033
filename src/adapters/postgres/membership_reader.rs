//! PostgreSQL implementation of MembershipReader.
//!
//! Membership rows are written by the billing integration out of band;
//! the platform only ever reads them.

use async_trait::async_trait;
use sqlx::PgPool;

use crate::domain::foundation::{DomainError, ErrorCode, UserId};
use crate::domain::membership::MembershipTier;
use crate::ports::{MembershipReader, MembershipView};

/// PostgreSQL implementation of the MembershipReader port.
#[derive(Clone)]
pub struct PostgresMembershipReader {
    pool: PgPool,
}

impl PostgresMembershipReader {
    /// Creates a new PostgresMembershipReader.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct MembershipRow {
    user_id: String,
    tier: String,
    email: String,
    weekly_reports_opted_out: bool,
}

fn parse_tier(s: &str) -> Result<MembershipTier, DomainError> {
    match s {
        "free" => Ok(MembershipTier::Free),
        "pro" => Ok(MembershipTier::Pro),
        "premium" => Ok(MembershipTier::Premium),
        _ => Err(DomainError::new(
            ErrorCode::DatabaseError,
            format!("Invalid tier value: {}", s),
        )),
    }
}

impl TryFrom<MembershipRow> for MembershipView {
    type Error = DomainError;

    fn try_from(row: MembershipRow) -> Result<Self, Self::Error> {
        Ok(MembershipView {
            user_id: UserId::new(row.user_id).map_err(|e| {
                DomainError::new(ErrorCode::DatabaseError, format!("Invalid user_id: {}", e))
            })?,
            tier: parse_tier(&row.tier)?,
            email: row.email,
            weekly_reports_opted_out: row.weekly_reports_opted_out,
        })
    }
}

#[async_trait]
impl MembershipReader for PostgresMembershipReader {
    async fn get_by_user(&self, user_id: &UserId) -> Result<Option<MembershipView>, DomainError> {
        let row: Option<MembershipRow> = sqlx::query_as(
            r#"
            SELECT user_id, tier, email, weekly_reports_opted_out
            FROM memberships
            WHERE user_id = $1
            "#,
        )
        .bind(user_id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to fetch membership: {}", e),
            )
        })?;

        row.map(MembershipView::try_from).transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tier_strings_parse() {
        assert_eq!(parse_tier("free").unwrap(), MembershipTier::Free);
        assert_eq!(parse_tier("pro").unwrap(), MembershipTier::Pro);
        assert_eq!(parse_tier("premium").unwrap(), MembershipTier::Premium);
        assert!(parse_tier("platinum").is_err());
    }

    #[test]
    fn row_conversion_builds_the_view() {
        let row = MembershipRow {
            user_id: "user-1".to_string(),
            tier: "pro".to_string(),
            email: "user@example.com".to_string(),
            weekly_reports_opted_out: false,
        };

        let view = MembershipView::try_from(row).unwrap();
        assert_eq!(view.tier, MembershipTier::Pro);
        assert!(view.can_email());
        assert!(!view.weekly_reports_opted_out);
    }
}
