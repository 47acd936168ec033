//! Scoring queue adapters.
//!
//! - `TokioScoringQueue` - Bounded mpsc producer behind the queue port
//! - `ScoringWorkerPool` - Workers that drain the queue with retries

mod scoring_queue;
mod worker_pool;

pub use scoring_queue::TokioScoringQueue;
pub use worker_pool::{ScoringWorkerConfig, ScoringWorkerPool};
