//! Application layer - Commands, Queries, and Handlers.
//!
//! This layer orchestrates domain operations and coordinates between ports.
//! Following CQRS, it separates command handlers (write) from query handlers (read).

pub mod handlers;

pub use handlers::{
    // Session handlers
    ContinueSessionCommand, ContinueSessionHandler, ContinueSessionResult, ExchangeBudget,
    GetProgressHandler, GetProgressQuery, ProgressView, ResponseInput, StartSessionCommand,
    StartSessionHandler, StartSessionResult, SubmitResponseCommand, SubmitResponseHandler,
    SubmitResponseResult,
    // Scoring handlers
    ScoreResponseHandler,
    // Analysis handlers
    GetInsightStatusHandler, GetInsightStatusQuery, GetInsightsHandler, GetInsightsQuery,
    InsightStatus,
    // Notification handlers
    TeaserMailer, WeeklyReportMailer, WeeklyRunReport,
};
