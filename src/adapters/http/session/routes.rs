//! HTTP routes for session and progress endpoints.

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::{
    continue_session, get_progress, start_session, submit_response, SessionHandlers,
};

/// Creates the session router with all endpoints.
pub fn session_routes(handlers: SessionHandlers) -> Router {
    Router::new()
        .route("/", post(start_session))
        .route("/:id/respond", post(submit_response))
        .route("/:id/continue", post(continue_session))
        .with_state(handlers)
}

/// Creates the progress router.
///
/// Mounted separately because progress is per mode, not per session.
pub fn progress_routes(handlers: SessionHandlers) -> Router {
    Router::new()
        .route("/:mode", get(get_progress))
        .with_state(handlers)
}
