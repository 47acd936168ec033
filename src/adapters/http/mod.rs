//! HTTP adapters - REST API implementations.
//!
//! Each context has its own HTTP adapter for endpoint exposure; `api_router`
//! assembles them into the full service surface.

pub mod insights;
pub mod middleware;
pub mod session;

pub use insights::{insight_routes, InsightsHandlers};
pub use middleware::{CallerId, CallerRejection};
pub use session::{progress_routes, session_routes, SessionHandlers};

use axum::{routing::get, Router};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Assembles the API router with all endpoints mounted.
pub fn api_router(session: SessionHandlers, insights: InsightsHandlers) -> Router {
    Router::new()
        .nest("/api/sessions", session_routes(session.clone()))
        .nest("/api/progress", progress_routes(session))
        .nest("/api/insights", insight_routes(insights))
        .route("/health", get(health))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

async fn health() -> &'static str {
    "OK"
}
