//! Session-specific error types.

use crate::domain::catalog::ModeKey;
use crate::domain::foundation::{DomainError, ErrorCode, SessionId};

/// Session-specific errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// Session was not found.
    NotFound(SessionId),
    /// User is not authorized.
    Forbidden,
    /// Practice mode is not in the catalog.
    ModeNotFound(ModeKey),
    /// Drill index does not exist in the mode's script.
    DrillNotFound { mode: ModeKey, index: u32 },
    /// Session is already completed.
    Completed,
    /// A continue is pending, not a response.
    AwaitingContinue,
    /// A response is pending, not a continue.
    AwaitingResponse,
    /// Invalid state for operation.
    InvalidState(String),
    /// Daily exchange budget for the user's tier is used up.
    LimitReached { used: u32, budget: u32 },
    /// Validation failed.
    ValidationFailed { field: String, message: String },
    /// Infrastructure error.
    Infrastructure(String),
}

impl SessionError {
    pub fn not_found(id: SessionId) -> Self {
        SessionError::NotFound(id)
    }
    pub fn forbidden() -> Self {
        SessionError::Forbidden
    }
    pub fn mode_not_found(mode: ModeKey) -> Self {
        SessionError::ModeNotFound(mode)
    }
    pub fn drill_not_found(mode: ModeKey, index: u32) -> Self {
        SessionError::DrillNotFound { mode, index }
    }
    pub fn completed() -> Self {
        SessionError::Completed
    }
    pub fn limit_reached(used: u32, budget: u32) -> Self {
        SessionError::LimitReached { used, budget }
    }
    pub fn invalid_state(message: impl Into<String>) -> Self {
        SessionError::InvalidState(message.into())
    }
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        SessionError::ValidationFailed {
            field: field.into(),
            message: message.into(),
        }
    }
    pub fn infrastructure(message: impl Into<String>) -> Self {
        SessionError::Infrastructure(message.into())
    }
    pub fn code(&self) -> ErrorCode {
        match self {
            SessionError::NotFound(_) => ErrorCode::SessionNotFound,
            SessionError::Forbidden => ErrorCode::Forbidden,
            SessionError::ModeNotFound(_) => ErrorCode::ModeNotFound,
            SessionError::DrillNotFound { .. } => ErrorCode::DrillNotFound,
            SessionError::Completed => ErrorCode::SessionCompleted,
            SessionError::AwaitingContinue => ErrorCode::AwaitingContinue,
            SessionError::AwaitingResponse => ErrorCode::AwaitingResponse,
            SessionError::InvalidState(_) => ErrorCode::InvalidStateTransition,
            SessionError::LimitReached { .. } => ErrorCode::LimitReached,
            SessionError::ValidationFailed { .. } => ErrorCode::ValidationFailed,
            SessionError::Infrastructure(_) => ErrorCode::DatabaseError,
        }
    }
    pub fn message(&self) -> String {
        match self {
            SessionError::NotFound(id) => format!("Session not found: {}", id),
            SessionError::Forbidden => "Permission denied".to_string(),
            SessionError::ModeNotFound(mode) => format!("Unknown practice mode: {}", mode),
            SessionError::DrillNotFound { mode, index } => {
                format!("Mode '{}' has no drill at index {}", mode, index)
            }
            SessionError::Completed => "Session is already completed".to_string(),
            SessionError::AwaitingContinue => {
                "Session is waiting for a continue, not a response".to_string()
            }
            SessionError::AwaitingResponse => {
                "Session is waiting for a response, not a continue".to_string()
            }
            SessionError::InvalidState(msg) => format!("Invalid state: {}", msg),
            SessionError::LimitReached { used, budget } => {
                format!("Daily exchange budget reached ({} of {})", used, budget)
            }
            SessionError::ValidationFailed { field, message } => {
                format!("Validation failed for '{}': {}", field, message)
            }
            SessionError::Infrastructure(msg) => format!("Error: {}", msg),
        }
    }
}

impl std::fmt::Display for SessionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for SessionError {}

impl From<DomainError> for SessionError {
    fn from(err: DomainError) -> Self {
        match err.code {
            ErrorCode::Forbidden => SessionError::Forbidden,
            ErrorCode::SessionCompleted => SessionError::Completed,
            ErrorCode::AwaitingContinue => SessionError::AwaitingContinue,
            ErrorCode::AwaitingResponse => SessionError::AwaitingResponse,
            ErrorCode::InvalidStateTransition => SessionError::InvalidState(err.to_string()),
            ErrorCode::ValidationFailed | ErrorCode::EmptyField => SessionError::ValidationFailed {
                field: "unknown".to_string(),
                message: err.to_string(),
            },
            _ => SessionError::Infrastructure(err.to_string()),
        }
    }
}
