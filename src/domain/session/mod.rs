//! Session domain module.
//!
//! Handles the practice session lifecycle: starting a session, walking its
//! mode's drill script card by card, accepting responses, and completing.
//! Per-mode progress and leveling live here as well.
//!
//! # Events
//!
//! - `SessionStarted` - Published when a new session starts
//! - `SessionCompleted` - Published when a session finishes its script

mod aggregate;
mod card;
mod errors;
mod events;
mod exchange;
mod progress;

pub use aggregate::{Awaiting, ContinueAction, Session, SessionStatus};
pub use card::Card;
pub use errors::SessionError;
pub use events::{SessionCompleted, SessionStarted};
pub use exchange::{ExchangePayload, ExchangeRecord, Role, UserResponse};
pub use progress::{LevelChange, Progress};
