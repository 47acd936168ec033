//! Errors for the notification triggers.

use std::error::Error;
use std::fmt;

use crate::domain::foundation::{DomainError, ErrorCode};

/// Errors raised while composing or dispatching notification emails.
///
/// An already-sent duplicate is not represented here: the send store
/// reports it as an outcome and handlers treat it as success.
#[derive(Debug, Clone, PartialEq)]
pub enum NotificationError {
    /// The delivery provider rejected or failed the send.
    Delivery(String),

    /// Underlying store or reader failed.
    Infrastructure(String),
}

impl NotificationError {
    pub fn delivery(message: impl Into<String>) -> Self {
        NotificationError::Delivery(message.into())
    }
    pub fn infrastructure(message: impl Into<String>) -> Self {
        NotificationError::Infrastructure(message.into())
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            NotificationError::Delivery(_) => ErrorCode::EmailError,
            NotificationError::Infrastructure(_) => ErrorCode::DatabaseError,
        }
    }

    pub fn message(&self) -> String {
        match self {
            NotificationError::Delivery(message) => {
                format!("Email delivery failed: {}", message)
            }
            NotificationError::Infrastructure(message) => message.clone(),
        }
    }
}

impl fmt::Display for NotificationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl Error for NotificationError {}

impl From<DomainError> for NotificationError {
    fn from(err: DomainError) -> Self {
        match err.code {
            ErrorCode::EmailError => NotificationError::delivery(err.message),
            _ => NotificationError::infrastructure(err.to_string()),
        }
    }
}
