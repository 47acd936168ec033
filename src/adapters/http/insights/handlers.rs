//! HTTP handlers for insight endpoints.

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::adapters::http::middleware::CallerId;
use crate::application::handlers::analysis::{
    GetInsightStatusHandler, GetInsightStatusQuery, GetInsightsHandler, GetInsightsQuery,
};
use crate::domain::analysis::AnalysisError;
use crate::domain::foundation::Timestamp;

use super::dto::ErrorResponse;

// ════════════════════════════════════════════════════════════════════════════
// Handler state
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone)]
pub struct InsightsHandlers {
    insights_handler: Arc<GetInsightsHandler>,
    status_handler: Arc<GetInsightStatusHandler>,
}

impl InsightsHandlers {
    pub fn new(
        insights_handler: Arc<GetInsightsHandler>,
        status_handler: Arc<GetInsightStatusHandler>,
    ) -> Self {
        Self {
            insights_handler,
            status_handler,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// HTTP handlers
// ════════════════════════════════════════════════════════════════════════════

/// GET /api/insights - Full insight report, gated by tier and data sufficiency
pub async fn get_insights(
    State(handlers): State<InsightsHandlers>,
    CallerId(user_id): CallerId,
) -> Response {
    let query = GetInsightsQuery { user_id };

    match handlers.insights_handler.handle(query, Timestamp::now()).await {
        Ok(report) => (StatusCode::OK, Json(report)).into_response(),
        Err(e) => handle_analysis_error(e),
    }
}

/// GET /api/insights/status - Gate state plus the teaser, without the report
pub async fn get_insight_status(
    State(handlers): State<InsightsHandlers>,
    CallerId(user_id): CallerId,
) -> Response {
    let query = GetInsightStatusQuery { user_id };

    match handlers.status_handler.handle(query, Timestamp::now()).await {
        Ok(status) => (StatusCode::OK, Json(status)).into_response(),
        Err(e) => handle_analysis_error(e),
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Error handling
// ════════════════════════════════════════════════════════════════════════════

/// Both analysis failures are server faults. Threshold misconfiguration is
/// an operator problem, never something the caller can correct.
fn handle_analysis_error(error: AnalysisError) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse::new(error.code().to_string(), error.message())),
    )
        .into_response()
}
