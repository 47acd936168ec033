//! Tokio mpsc scoring queue.
//!
//! The submit path try-sends and returns; the worker pool owns the
//! receiver. The bound is a backpressure valve: when workers fall
//! behind, new jobs are refused instead of queued without limit, and
//! the caller logs the dropped job.

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::domain::foundation::{DomainError, ErrorCode};
use crate::ports::{ScoringJob, ScoringQueue};

/// Producer handle over a bounded tokio channel.
#[derive(Clone)]
pub struct TokioScoringQueue {
    tx: mpsc::Sender<ScoringJob>,
}

impl TokioScoringQueue {
    /// Creates the queue and hands back the receiver for the worker pool.
    pub fn bounded(capacity: usize) -> (Self, mpsc::Receiver<ScoringJob>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self { tx }, rx)
    }
}

#[async_trait]
impl ScoringQueue for TokioScoringQueue {
    async fn enqueue(&self, job: ScoringJob) -> Result<(), DomainError> {
        // try_send keeps the session transition non-blocking
        self.tx.try_send(job).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => {
                DomainError::new(ErrorCode::InternalError, "Scoring queue is full")
            }
            mpsc::error::TrySendError::Closed(_) => {
                DomainError::new(ErrorCode::InternalError, "Scoring queue is closed")
            }
        })
    }
}
