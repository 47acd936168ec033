//! Scoring oracle port - the external judge and coach.
//!
//! One upstream service plays two roles: it writes the conversational
//! reply to an answer (coach) and it judges an answer against a
//! criteria list (judge). Both are fallible and slow; neither is ever
//! allowed to block or fail a session transition. The session handlers
//! degrade the card on coach failure, and the scoring worker owns
//! retry policy for judge failures.

use async_trait::async_trait;

use crate::domain::catalog::{CriterionSpec, DrillPhase, DrillType, ModeKey};
use crate::domain::foundation::{SessionId, UserId};
use crate::domain::scoring::{CriterionOutcomes, ScoringError};

/// Port for the external scoring oracle.
#[async_trait]
pub trait ScoringOracle: Send + Sync {
    /// Produce the conversational reply to a just-submitted answer.
    async fn coach(&self, request: CoachRequest) -> Result<CoachReply, ScoringError>;

    /// Judge an answer against a criteria list.
    ///
    /// The reply maps each judged criterion key to its outcome value.
    /// Implementations may omit criteria they could not judge; missing
    /// keys are treated as not judged, never defaulted.
    async fn judge(&self, request: JudgeRequest) -> Result<CriterionOutcomes, ScoringError>;
}

/// Context for a coaching reply.
#[derive(Debug, Clone)]
pub struct CoachRequest {
    /// User who answered.
    pub user_id: UserId,

    /// Session the answer belongs to.
    pub session_id: SessionId,

    /// Practice mode that is running.
    pub mode: ModeKey,

    /// Drill being answered.
    pub drill_key: String,

    /// Phase tag of the answered card.
    pub drill_phase: Option<DrillPhase>,

    /// Scenario text the user was answering.
    pub scenario: String,

    /// The user's answer.
    pub response: String,

    /// The user's current level in this mode.
    pub level: u32,
}

/// The coach's reply to an answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoachReply {
    /// Feedback text on the answer.
    pub feedback: String,

    /// When set, the coach wants the user to try again; the text is the
    /// retry prompt.
    pub retry_prompt: Option<String>,
}

impl CoachReply {
    /// A plain feedback reply with no retry.
    pub fn feedback(text: impl Into<String>) -> Self {
        Self {
            feedback: text.into(),
            retry_prompt: None,
        }
    }

    /// A reply directing the user to try the drill again.
    pub fn retry(feedback: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            feedback: feedback.into(),
            retry_prompt: Some(prompt.into()),
        }
    }

    pub fn wants_retry(&self) -> bool {
        self.retry_prompt.is_some()
    }
}

/// Context for a judging call.
#[derive(Debug, Clone)]
pub struct JudgeRequest {
    /// Rubric family being applied.
    pub drill_type: DrillType,

    /// Phase tag of the answered card.
    pub drill_phase: DrillPhase,

    /// Scenario text the user was answering.
    pub scenario: String,

    /// The user's answer.
    pub response: String,

    /// Criteria the oracle must judge.
    pub criteria: Vec<CriterionSpec>,
}

#[cfg(test)]
mod tests {
    use super::*;

    // Trait object safety test
    #[test]
    fn scoring_oracle_is_object_safe() {
        fn _accepts_dyn(_oracle: &dyn ScoringOracle) {}
    }

    #[test]
    fn coach_reply_constructors_set_retry() {
        let plain = CoachReply::feedback("Direct and short. Good.");
        assert!(!plain.wants_retry());

        let retry = CoachReply::retry("Too soft.", "Say it again without the apology.");
        assert!(retry.wants_retry());
        assert_eq!(
            retry.retry_prompt.as_deref(),
            Some("Say it again without the apology.")
        );
    }
}
