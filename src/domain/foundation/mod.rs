//! Foundation module - Shared domain primitives.
//!
//! Contains value objects, identifiers, event infrastructure, and error
//! types that form the vocabulary of the Candor domain.

mod command;
mod errors;
mod events;
mod ids;
mod timestamp;

pub use command::CommandMetadata;
pub use errors::{DomainError, ErrorCode, ValidationError};
pub use events::{domain_event, DomainEvent, EventEnvelope, EventId, EventMetadata};
pub use ids::{
    DimensionScoreId, EmailRecordId, ExchangeId, ScoreRecordId, SessionId, UserId,
};
pub use timestamp::Timestamp;
