//! HTTP adapter for session and progress endpoints.

mod dto;
mod handlers;
mod routes;

pub use dto::{
    ContinueResponse, ErrorResponse, LevelChangeResponse, ProgressResponse, RespondRequest,
    RespondResponse, StartSessionRequest, StartSessionResponse,
};
pub use handlers::SessionHandlers;
pub use routes::{progress_routes, session_routes};
