//! HTTP adapter for insight endpoints.

mod dto;
mod handlers;
mod routes;

pub use handlers::InsightsHandlers;
pub use routes::insight_routes;
