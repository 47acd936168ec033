//! Mock scoring oracle for testing.
//!
//! Configurable implementation of the ScoringOracle port so tests and
//! local development run without a live oracle service.
//!
//! # Features
//!
//! - Scripted replies consumed in order
//! - Error injection for retry-path testing
//! - Simulated delays
//! - Call tracking for verification
//!
//! # Example
//!
//! ```ignore
//! let oracle = MockScoringOracle::new()
//!     .with_coach_reply(CoachReply::feedback("Direct and short. Good."))
//!     .with_judge_error(ScoringError::oracle("overloaded"));
//! ```

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::sleep;

use crate::domain::catalog::{CriterionKind, CriterionValue};
use crate::domain::scoring::{CriterionOutcomes, ScoringError};
use crate::ports::{CoachReply, CoachRequest, JudgeRequest, ScoringOracle};

/// Mock scoring oracle.
///
/// Scripted replies are consumed in order. When a script runs out the
/// coach falls back to plain feedback and the judge returns a clean
/// outcome of the declared kind for every requested criterion.
#[derive(Debug, Clone)]
pub struct MockScoringOracle {
    /// Scripted coach replies (consumed in order).
    coach_replies: Arc<Mutex<VecDeque<Result<CoachReply, ScoringError>>>>,
    /// Scripted judge outcomes (consumed in order).
    judge_outcomes: Arc<Mutex<VecDeque<Result<CriterionOutcomes, ScoringError>>>>,
    /// Simulated latency per request.
    delay: Duration,
    /// Call histories for verification.
    coach_calls: Arc<Mutex<Vec<CoachRequest>>>,
    judge_calls: Arc<Mutex<Vec<JudgeRequest>>>,
}

impl Default for MockScoringOracle {
    fn default() -> Self {
        Self::new()
    }
}

impl MockScoringOracle {
    /// Creates a new mock oracle with empty scripts.
    pub fn new() -> Self {
        Self {
            coach_replies: Arc::new(Mutex::new(VecDeque::new())),
            judge_outcomes: Arc::new(Mutex::new(VecDeque::new())),
            delay: Duration::ZERO,
            coach_calls: Arc::new(Mutex::new(Vec::new())),
            judge_calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Queues a coach reply.
    pub fn with_coach_reply(self, reply: CoachReply) -> Self {
        let mut replies = self.coach_replies.lock().unwrap();
        replies.push_back(Ok(reply));
        drop(replies);
        self
    }

    /// Queues a coach failure.
    pub fn with_coach_error(self, error: ScoringError) -> Self {
        let mut replies = self.coach_replies.lock().unwrap();
        replies.push_back(Err(error));
        drop(replies);
        self
    }

    /// Queues a judge outcome map.
    pub fn with_judge_outcomes(self, outcomes: CriterionOutcomes) -> Self {
        let mut queue = self.judge_outcomes.lock().unwrap();
        queue.push_back(Ok(outcomes));
        drop(queue);
        self
    }

    /// Queues a judge failure.
    pub fn with_judge_error(self, error: ScoringError) -> Self {
        let mut queue = self.judge_outcomes.lock().unwrap();
        queue.push_back(Err(error));
        drop(queue);
        self
    }

    /// Sets simulated latency per request.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Returns the number of coach calls made.
    pub fn coach_call_count(&self) -> usize {
        self.coach_calls.lock().unwrap().len()
    }

    /// Returns the number of judge calls made.
    pub fn judge_call_count(&self) -> usize {
        self.judge_calls.lock().unwrap().len()
    }

    /// Returns all recorded judge calls.
    pub fn judge_calls(&self) -> Vec<JudgeRequest> {
        self.judge_calls.lock().unwrap().clone()
    }

    /// Returns all recorded coach calls.
    pub fn coach_calls(&self) -> Vec<CoachRequest> {
        self.coach_calls.lock().unwrap().clone()
    }

    /// Clears both call histories.
    pub fn clear_calls(&self) {
        self.coach_calls.lock().unwrap().clear();
        self.judge_calls.lock().unwrap().clear();
    }

    fn next_coach_reply(&self) -> Result<CoachReply, ScoringError> {
        self.coach_replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(CoachReply::feedback("Mock feedback")))
    }

    /// Pops the next scripted outcome, or judges every requested
    /// criterion with the clean value of its declared kind.
    fn next_judge_outcomes(&self, request: &JudgeRequest) -> Result<CriterionOutcomes, ScoringError> {
        if let Some(scripted) = self.judge_outcomes.lock().unwrap().pop_front() {
            return scripted;
        }

        let mut outcomes = CriterionOutcomes::new();
        for spec in &request.criteria {
            let value = match spec.kind {
                CriterionKind::Boolean => CriterionValue::Flag(false),
                CriterionKind::Count => CriterionValue::Count(0),
            };
            outcomes.insert(spec.key.clone(), value);
        }
        Ok(outcomes)
    }
}

#[async_trait]
impl ScoringOracle for MockScoringOracle {
    async fn coach(&self, request: CoachRequest) -> Result<CoachReply, ScoringError> {
        self.coach_calls.lock().unwrap().push(request);

        if !self.delay.is_zero() {
            sleep(self.delay).await;
        }

        self.next_coach_reply()
    }

    async fn judge(&self, request: JudgeRequest) -> Result<CriterionOutcomes, ScoringError> {
        let reply = self.next_judge_outcomes(&request);
        self.judge_calls.lock().unwrap().push(request);

        if !self.delay.is_zero() {
            sleep(self.delay).await;
        }

        reply
    }
}
