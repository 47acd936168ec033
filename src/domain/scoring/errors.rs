//! Scoring-specific error types.

use crate::domain::foundation::{DomainError, ErrorCode};

/// Scoring-specific errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScoringError {
    /// The oracle failed or timed out.
    Oracle(String),
    /// The oracle's reply had an invalid shape.
    InvalidReply(String),
    /// Infrastructure error.
    Infrastructure(String),
}

impl ScoringError {
    pub fn oracle(message: impl Into<String>) -> Self {
        ScoringError::Oracle(message.into())
    }
    pub fn invalid_reply(message: impl Into<String>) -> Self {
        ScoringError::InvalidReply(message.into())
    }
    pub fn infrastructure(message: impl Into<String>) -> Self {
        ScoringError::Infrastructure(message.into())
    }
    /// Whether a retry with backoff can reasonably succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            ScoringError::Oracle(_) => true,
            ScoringError::InvalidReply(_) => false,
            ScoringError::Infrastructure(_) => true,
        }
    }
    pub fn code(&self) -> ErrorCode {
        match self {
            ScoringError::Oracle(_) => ErrorCode::OracleError,
            ScoringError::InvalidReply(_) => ErrorCode::ValidationFailed,
            ScoringError::Infrastructure(_) => ErrorCode::DatabaseError,
        }
    }
    pub fn message(&self) -> String {
        match self {
            ScoringError::Oracle(msg) => format!("Scoring oracle failed: {}", msg),
            ScoringError::InvalidReply(msg) => format!("Invalid oracle reply: {}", msg),
            ScoringError::Infrastructure(msg) => format!("Error: {}", msg),
        }
    }
}

impl std::fmt::Display for ScoringError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ScoringError {}

impl From<DomainError> for ScoringError {
    fn from(err: DomainError) -> Self {
        match err.code {
            ErrorCode::OracleError => ScoringError::Oracle(err.to_string()),
            ErrorCode::ValidationFailed => ScoringError::InvalidReply(err.to_string()),
            _ => ScoringError::Infrastructure(err.to_string()),
        }
    }
}
