//! PostgreSQL adapters - Database implementations for repository ports.
//!
//! Write-side repositories and read-side readers share the same pool
//! but stay separate types so the CQRS boundary holds at the adapter
//! layer too.

mod email_send_store;
mod exchange_log;
mod membership_reader;
mod processed_event_store;
mod progress_store;
mod score_store;
mod session_reader;
mod session_repository;

pub use email_send_store::PostgresEmailSendStore;
pub use exchange_log::PostgresExchangeLog;
pub use membership_reader::PostgresMembershipReader;
pub use processed_event_store::PostgresProcessedEventStore;
pub use progress_store::PostgresProgressRepository;
pub use score_store::PostgresScoreStore;
pub use session_reader::PostgresSessionReader;
pub use session_repository::PostgresSessionRepository;
