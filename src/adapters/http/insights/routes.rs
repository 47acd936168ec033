//! HTTP routes for insight endpoints.

use axum::{routing::get, Router};

use super::handlers::{get_insight_status, get_insights, InsightsHandlers};

/// Creates the insights router with all endpoints.
pub fn insight_routes(handlers: InsightsHandlers) -> Router {
    Router::new()
        .route("/", get(get_insights))
        .route("/status", get(get_insight_status))
        .with_state(handlers)
}
