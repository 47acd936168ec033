//! HTTP handlers for session and progress endpoints.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::adapters::http::middleware::CallerId;
use crate::application::handlers::session::{
    ContinueSessionCommand, ContinueSessionHandler, GetProgressHandler, GetProgressQuery,
    ResponseInput, StartSessionCommand, StartSessionHandler, SubmitResponseCommand,
    SubmitResponseHandler,
};
use crate::domain::catalog::ModeKey;
use crate::domain::foundation::{CommandMetadata, SessionId};
use crate::domain::session::SessionError;

use super::dto::{
    ContinueResponse, ErrorResponse, ProgressResponse, RespondRequest, RespondResponse,
    StartSessionRequest, StartSessionResponse,
};

// ════════════════════════════════════════════════════════════════════════════
// Handler state
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone)]
pub struct SessionHandlers {
    start_handler: Arc<StartSessionHandler>,
    submit_handler: Arc<SubmitResponseHandler>,
    continue_handler: Arc<ContinueSessionHandler>,
    progress_handler: Arc<GetProgressHandler>,
}

impl SessionHandlers {
    pub fn new(
        start_handler: Arc<StartSessionHandler>,
        submit_handler: Arc<SubmitResponseHandler>,
        continue_handler: Arc<ContinueSessionHandler>,
        progress_handler: Arc<GetProgressHandler>,
    ) -> Self {
        Self {
            start_handler,
            submit_handler,
            continue_handler,
            progress_handler,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// HTTP handlers
// ════════════════════════════════════════════════════════════════════════════

/// POST /api/sessions - Start a session, or resume the active one
pub async fn start_session(
    State(handlers): State<SessionHandlers>,
    CallerId(user_id): CallerId,
    Json(req): Json<StartSessionRequest>,
) -> Response {
    let cmd = StartSessionCommand {
        user_id: user_id.clone(),
        mode: ModeKey::new(req.mode),
    };

    let metadata = CommandMetadata::new(user_id).with_correlation_id("http-request");

    match handlers.start_handler.handle(cmd, metadata).await {
        Ok(result) => {
            // A resume returns the existing session rather than creating one.
            let status = if result.resumed {
                StatusCode::OK
            } else {
                StatusCode::CREATED
            };
            let response: StartSessionResponse = result.into();
            (status, Json(response)).into_response()
        }
        Err(e) => handle_session_error(e),
    }
}

/// POST /api/sessions/:id/respond - Answer the card the session is waiting on
pub async fn submit_response(
    State(handlers): State<SessionHandlers>,
    CallerId(user_id): CallerId,
    Path(session_id): Path<String>,
    Json(req): Json<RespondRequest>,
) -> Response {
    let session_id = match session_id.parse::<SessionId>() {
        Ok(id) => id,
        Err(_) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse::bad_request("Invalid session ID")),
            )
                .into_response()
        }
    };

    let input = match (req.text, req.choice) {
        (Some(text), None) => ResponseInput::Text(text),
        (None, Some(choice)) => ResponseInput::Choice(choice),
        _ => {
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse::bad_request(
                    "Provide exactly one of text or choice",
                )),
            )
                .into_response()
        }
    };

    let cmd = SubmitResponseCommand {
        session_id,
        user_id,
        input,
    };

    match handlers.submit_handler.handle(cmd).await {
        Ok(result) => {
            let response: RespondResponse = result.into();
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => handle_session_error(e),
    }
}

/// POST /api/sessions/:id/continue - Acknowledge an informational card
pub async fn continue_session(
    State(handlers): State<SessionHandlers>,
    CallerId(user_id): CallerId,
    Path(session_id): Path<String>,
) -> Response {
    let session_id = match session_id.parse::<SessionId>() {
        Ok(id) => id,
        Err(_) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse::bad_request("Invalid session ID")),
            )
                .into_response()
        }
    };

    let cmd = ContinueSessionCommand {
        session_id,
        user_id: user_id.clone(),
    };

    let metadata = CommandMetadata::new(user_id).with_correlation_id("http-request");

    match handlers.continue_handler.handle(cmd, metadata).await {
        Ok(result) => {
            let response: ContinueResponse = result.into();
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => handle_session_error(e),
    }
}

/// GET /api/progress/:mode - The caller's standing in one practice mode
pub async fn get_progress(
    State(handlers): State<SessionHandlers>,
    CallerId(user_id): CallerId,
    Path(mode): Path<String>,
) -> Response {
    let query = GetProgressQuery {
        user_id,
        mode: ModeKey::new(mode),
    };

    match handlers.progress_handler.handle(query).await {
        Ok(view) => {
            let response: ProgressResponse = view.into();
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => handle_session_error(e),
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Error handling
// ════════════════════════════════════════════════════════════════════════════

fn handle_session_error(error: SessionError) -> Response {
    let status = match &error {
        SessionError::NotFound(_)
        | SessionError::ModeNotFound(_)
        | SessionError::DrillNotFound { .. } => StatusCode::NOT_FOUND,
        SessionError::Forbidden => StatusCode::FORBIDDEN,
        SessionError::LimitReached { .. } => StatusCode::TOO_MANY_REQUESTS,
        SessionError::Completed
        | SessionError::AwaitingContinue
        | SessionError::AwaitingResponse
        | SessionError::InvalidState(_)
        | SessionError::ValidationFailed { .. } => StatusCode::BAD_REQUEST,
        SessionError::Infrastructure(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };

    let mut body = ErrorResponse::new(error.code().to_string(), error.message());
    if let SessionError::LimitReached { used, budget } = &error {
        body = body.with_details(serde_json::json!({ "used": used, "budget": budget }));
    }

    (status, Json(body)).into_response()
}
