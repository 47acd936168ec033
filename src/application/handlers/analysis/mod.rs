//! Analysis query handlers.

mod get_insight_status;
mod get_insights;

pub use get_insight_status::{GetInsightStatusHandler, GetInsightStatusQuery, InsightStatus};
pub use get_insights::{GetInsightsHandler, GetInsightsQuery};
