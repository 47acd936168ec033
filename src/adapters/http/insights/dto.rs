//! HTTP DTOs for insight endpoints.
//!
//! The insight read models (`InsightsReport`, `InsightStatus`) are already
//! wire-shaped view types; handlers serialize them as-is. Only the error
//! body needs an HTTP-side type.

use serde::Serialize;

/// Standard error response.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}
