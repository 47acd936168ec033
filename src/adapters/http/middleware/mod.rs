//! HTTP middleware for axum.
//!
//! This module contains extractors for cross-cutting concerns:
//!
//! - `caller` - Caller identity extraction from the gateway-set header

pub mod caller;

pub use caller::{CallerId, CallerRejection, USER_ID_HEADER};
