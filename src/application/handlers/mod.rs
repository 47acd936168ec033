//! Application handlers.
//!
//! Command and query handlers that orchestrate domain operations.

pub mod analysis;
pub mod notification;
pub mod scoring;
pub mod session;

pub use analysis::{GetInsightStatusHandler, GetInsightStatusQuery, GetInsightsHandler, GetInsightsQuery, InsightStatus};
pub use notification::{TeaserMailer, WeeklyReportMailer, WeeklyRunReport};
pub use scoring::ScoreResponseHandler;
pub use session::{
    ContinueSessionCommand, ContinueSessionHandler, ContinueSessionResult, ExchangeBudget,
    GetProgressHandler, GetProgressQuery, ProgressView, ResponseInput, StartSessionCommand,
    StartSessionHandler, StartSessionResult, SubmitResponseCommand, SubmitResponseHandler,
    SubmitResponseResult,
};
