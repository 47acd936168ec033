//! Scoring queue port.
//!
//! Response submission enqueues and returns; the worker pool drains.
//! A job carries everything the worker needs so scoring never re-reads
//! session state.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::catalog::{DrillPhase, DrillType, ModeKey};
use crate::domain::foundation::{DomainError, SessionId, UserId};

/// One queued scoring request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoringJob {
    /// User whose answer is being scored.
    pub user_id: UserId,

    /// Session the answer belongs to.
    pub session_id: SessionId,

    /// Practice mode that was running.
    pub mode: ModeKey,

    /// Rubric family to apply.
    pub drill_type: DrillType,

    /// Phase tag the answered card carried.
    pub drill_phase: DrillPhase,

    /// Whether the answer was a retry of the same drill.
    pub is_iteration: bool,

    /// Scenario text the user was answering.
    pub scenario: String,

    /// The user's answer.
    pub response: String,
}

/// Producer side of the scoring pipeline.
///
/// Enqueueing must be fast and must never block a session transition;
/// a full or closed queue surfaces as `DomainError` and the caller
/// logs and moves on.
#[async_trait]
pub trait ScoringQueue: Send + Sync {
    /// Enqueue a scoring job.
    async fn enqueue(&self, job: ScoringJob) -> Result<(), DomainError>;
}
