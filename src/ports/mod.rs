//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! ## Persistence Ports
//!
//! - `SessionRepository` - Active session state with optimistic locking
//! - `ExchangeLog` - Append-only transcript of session exchanges
//! - `ProgressRepository` - Per-mode level and completion tracking
//! - `SessionReader` - Completion counts and scheduler candidate queries
//! - `ScoreStore` - Score records and dimension samples for analysis
//! - `EmailSendStore` - Weekly idempotency ledger for outbound email
//!
//! ## Scoring Ports
//!
//! - `ScoringOracle` - Conversational coaching and criteria judging
//! - `ScoringQueue` - Deferred scoring jobs, decoupled from sessions
//!
//! ## Notification Ports
//!
//! - `MembershipReader` - Tier, email address, and opt-out lookup
//! - `EmailSender` - Outbound email delivery
//!
//! ## Event Ports
//!
//! - `EventPublisher` / `EventSubscriber` / `EventHandler` - Domain event bus
//! - `ProcessedEventStore` - Idempotency tracking for event handlers

mod email_send_store;
mod email_sender;
mod event_publisher;
mod event_subscriber;
mod exchange_log;
mod membership_reader;
mod processed_event_store;
mod progress_repository;
mod score_store;
mod scoring_oracle;
mod scoring_queue;
mod session_reader;
mod session_repository;

pub use email_send_store::{EmailSendStore, SendOutcome};
pub use email_sender::EmailSender;
pub use event_publisher::EventPublisher;
pub use event_subscriber::{EventBus, EventHandler, EventSubscriber};
pub use exchange_log::ExchangeLog;
pub use membership_reader::{MembershipReader, MembershipView};
pub use processed_event_store::ProcessedEventStore;
pub use progress_repository::ProgressRepository;
pub use score_store::ScoreStore;
pub use scoring_oracle::{CoachReply, CoachRequest, JudgeRequest, ScoringOracle};
pub use scoring_queue::{ScoringJob, ScoringQueue};
pub use session_reader::SessionReader;
pub use session_repository::SessionRepository;
