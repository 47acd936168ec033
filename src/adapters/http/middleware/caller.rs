//! Caller identity extraction for axum.
//!
//! Identity arrives on the `X-User-Id` header, set by the gateway after it
//! has authenticated the caller. This service trusts the header; token
//! validation lives at the edge, not here.
//!
//! # Example
//!
//! ```ignore
//! async fn my_handler(CallerId(user_id): CallerId) -> String {
//!     format!("Hello, {}!", user_id)
//! }
//! ```

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::domain::foundation::UserId;

/// Header carrying the authenticated caller's user id.
pub const USER_ID_HEADER: &str = "X-User-Id";

/// Extractor that identifies the calling user.
///
/// Rejects the request with 401 when the header is missing or does not
/// hold a usable user id.
#[derive(Debug, Clone)]
pub struct CallerId(pub UserId);

impl<S> axum::extract::FromRequestParts<S> for CallerId
where
    S: Send + Sync,
{
    type Rejection = CallerRejection;

    fn from_request_parts<'life0, 'life1, 'async_trait>(
        parts: &'life0 mut axum::http::request::Parts,
        _state: &'life1 S,
    ) -> std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self, Self::Rejection>> + Send + 'async_trait>,
    >
    where
        'life0: 'async_trait,
        'life1: 'async_trait,
        Self: 'async_trait,
    {
        Box::pin(async move {
            let header = parts
                .headers
                .get(USER_ID_HEADER)
                .ok_or(CallerRejection::MissingHeader)?;

            let value = header
                .to_str()
                .map_err(|_| CallerRejection::InvalidHeader)?;

            UserId::new(value)
                .map(CallerId)
                .map_err(|_| CallerRejection::InvalidHeader)
        })
    }
}

/// Rejection type for caller identification failures.
#[derive(Debug, Clone)]
pub enum CallerRejection {
    /// The identity header was not present.
    MissingHeader,
    /// The identity header was present but not a usable user id.
    InvalidHeader,
}

impl IntoResponse for CallerRejection {
    fn into_response(self) -> Response {
        let message = match self {
            CallerRejection::MissingHeader => "Caller identity required",
            CallerRejection::InvalidHeader => "Caller identity invalid",
        };

        (
            StatusCode::UNAUTHORIZED,
            Json(serde_json::json!({
                "error": message,
                "code": "UNAUTHENTICATED"
            })),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::FromRequestParts;
    use axum::http::Request;

    // ════════════════════════════════════════════════════════════════════════════
    // CallerId Extractor Tests
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn caller_id_extracts_user_from_header() {
        let request: Request<()> = Request::builder()
            .uri("/test")
            .header(USER_ID_HEADER, "user-123")
            .body(())
            .unwrap();

        let (mut parts, _body) = request.into_parts();

        let result: Result<CallerId, CallerRejection> =
            CallerId::from_request_parts(&mut parts, &()).await;

        assert!(result.is_ok());
        let CallerId(user_id) = result.unwrap();
        assert_eq!(user_id.as_str(), "user-123");
    }

    #[tokio::test]
    async fn caller_id_header_lookup_is_case_insensitive() {
        let request: Request<()> = Request::builder()
            .uri("/test")
            .header("x-user-id", "user-456")
            .body(())
            .unwrap();

        let (mut parts, _body) = request.into_parts();

        let result: Result<CallerId, CallerRejection> =
            CallerId::from_request_parts(&mut parts, &()).await;

        assert!(result.is_ok());
        assert_eq!(result.unwrap().0.as_str(), "user-456");
    }

    #[tokio::test]
    async fn caller_id_fails_without_header() {
        let request: Request<()> = Request::builder().uri("/test").body(()).unwrap();

        let (mut parts, _body) = request.into_parts();

        let result: Result<CallerId, CallerRejection> =
            CallerId::from_request_parts(&mut parts, &()).await;

        assert!(matches!(result, Err(CallerRejection::MissingHeader)));
    }

    #[tokio::test]
    async fn caller_id_rejects_empty_header() {
        let request: Request<()> = Request::builder()
            .uri("/test")
            .header(USER_ID_HEADER, "")
            .body(())
            .unwrap();

        let (mut parts, _body) = request.into_parts();

        let result: Result<CallerId, CallerRejection> =
            CallerId::from_request_parts(&mut parts, &()).await;

        assert!(matches!(result, Err(CallerRejection::InvalidHeader)));
    }

    // ════════════════════════════════════════════════════════════════════════════
    // CallerRejection Tests
    // ════════════════════════════════════════════════════════════════════════════

    #[test]
    fn missing_header_returns_401() {
        let rejection = CallerRejection::MissingHeader;
        let response = rejection.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn invalid_header_returns_401() {
        let rejection = CallerRejection::InvalidHeader;
        let response = rejection.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn caller_id_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<CallerId>();
    }
}
