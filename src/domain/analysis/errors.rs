//! Errors for the analysis read side.

use std::error::Error;
use std::fmt;

use crate::domain::foundation::{DomainError, ErrorCode, ValidationError};

/// Errors raised while assembling insights.
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisError {
    /// Threshold configuration failed validation.
    InvalidThresholds { field: String, message: String },

    /// Underlying store or reader failed.
    Infrastructure(String),
}

impl AnalysisError {
    pub fn invalid_thresholds(field: impl Into<String>, message: impl Into<String>) -> Self {
        AnalysisError::InvalidThresholds {
            field: field.into(),
            message: message.into(),
        }
    }
    pub fn infrastructure(message: impl Into<String>) -> Self {
        AnalysisError::Infrastructure(message.into())
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            AnalysisError::InvalidThresholds { .. } => ErrorCode::ValidationFailed,
            AnalysisError::Infrastructure(_) => ErrorCode::DatabaseError,
        }
    }

    pub fn message(&self) -> String {
        match self {
            AnalysisError::InvalidThresholds { field, message } => {
                format!("Invalid analysis threshold '{}': {}", field, message)
            }
            AnalysisError::Infrastructure(message) => message.clone(),
        }
    }
}

impl fmt::Display for AnalysisError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl Error for AnalysisError {}

impl From<ValidationError> for AnalysisError {
    fn from(err: ValidationError) -> Self {
        let field = match &err {
            ValidationError::EmptyField { field } => field.clone(),
            ValidationError::OutOfRange { field, .. } => field.clone(),
            ValidationError::InvalidFormat { field, .. } => field.clone(),
        };
        AnalysisError::invalid_thresholds(field, err.to_string())
    }
}

impl From<DomainError> for AnalysisError {
    fn from(err: DomainError) -> Self {
        AnalysisError::infrastructure(err.to_string())
    }
}
