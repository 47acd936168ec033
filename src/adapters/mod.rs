//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `email` - Resend delivery and the test mock
//! - `events` - In-process event bus and idempotent handler wrapper
//! - `http` - Axum REST API
//! - `oracle` - Scoring oracle HTTP client and mock
//! - `postgres` - Repository and reader implementations
//! - `queue` - Scoring queue and worker pool
//! - `scheduler` - Weekly report scheduler

pub mod email;
pub mod events;
pub mod http;
pub mod oracle;
pub mod postgres;
pub mod queue;
pub mod scheduler;

pub use email::{MockEmailSender, ResendConfig, ResendEmailSender};
pub use events::{IdempotentHandler, InMemoryEventBus};
pub use oracle::{HttpScoringOracle, MockScoringOracle, OracleConfig};
pub use queue::{ScoringWorkerConfig, ScoringWorkerPool, TokioScoringQueue};
pub use scheduler::{WeeklyScheduler, WeeklySchedulerConfig};
