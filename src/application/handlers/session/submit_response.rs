//! SubmitResponseHandler - Command handler for answering the current card.
//!
//! Accepts a user's response, asks the coaching oracle for feedback (and
//! possibly a retry prompt), and hands the scored phases to the scoring
//! queue. Scoring never blocks the reply: a queue failure is logged and
//! dropped, and an oracle failure degrades to canned feedback.

use std::sync::Arc;

use tracing::warn;

use crate::application::handlers::session::budget::ExchangeBudget;
use crate::application::handlers::session::cards::DEGRADED_FEEDBACK;
use crate::domain::catalog::{CriteriaRegistry, DrillPhase, DrillSpec, ModeKey};
use crate::domain::foundation::{SessionId, UserId};
use crate::domain::session::{
    Card, ExchangeRecord, Progress, Session, SessionError, UserResponse,
};
use crate::ports::{
    CoachRequest, ExchangeLog, ProgressRepository, ScoringJob, ScoringOracle, ScoringQueue,
    SessionRepository,
};

/// Raw response input as it arrives from the client.
#[derive(Debug, Clone)]
pub enum ResponseInput {
    /// Free text for scenario and prompt cards.
    Text(String),
    /// Zero-based choice index for multiple choice cards.
    Choice(u32),
}

/// Command to submit a response to the session's current card.
#[derive(Debug, Clone)]
pub struct SubmitResponseCommand {
    pub session_id: SessionId,
    pub user_id: UserId,
    pub input: ResponseInput,
}

/// Result of a submission: the updated session and the cards to render.
#[derive(Debug, Clone)]
pub struct SubmitResponseResult {
    pub session: Session,
    pub cards: Vec<Card>,
}

/// Handler for response submissions.
pub struct SubmitResponseHandler {
    sessions: Arc<dyn SessionRepository>,
    exchanges: Arc<dyn ExchangeLog>,
    progress: Arc<dyn ProgressRepository>,
    budget: Arc<ExchangeBudget>,
    oracle: Arc<dyn ScoringOracle>,
    queue: Arc<dyn ScoringQueue>,
    registry: Arc<CriteriaRegistry>,
}

impl SubmitResponseHandler {
    pub fn new(
        sessions: Arc<dyn SessionRepository>,
        exchanges: Arc<dyn ExchangeLog>,
        progress: Arc<dyn ProgressRepository>,
        budget: Arc<ExchangeBudget>,
        oracle: Arc<dyn ScoringOracle>,
        queue: Arc<dyn ScoringQueue>,
        registry: Arc<CriteriaRegistry>,
    ) -> Self {
        Self {
            sessions,
            exchanges,
            progress,
            budget,
            oracle,
            queue,
            registry,
        }
    }

    pub async fn handle(
        &self,
        cmd: SubmitResponseCommand,
    ) -> Result<SubmitResponseResult, SessionError> {
        // 1. Load and authorize.
        let mut session = self
            .sessions
            .find_by_id(&cmd.session_id)
            .await?
            .ok_or_else(|| SessionError::not_found(cmd.session_id))?;
        session.authorize(&cmd.user_id)?;

        // 2. Enforce the daily exchange budget.
        self.budget.ensure_available(&cmd.user_id).await?;

        // 3. The card being answered is the latest system entry in the log.
        let entries = self.exchanges.list_for_session(&cmd.session_id).await?;
        let answered = entries
            .iter()
            .rev()
            .find(|entry| entry.as_card().is_some())
            .ok_or_else(|| SessionError::invalid_state("Session has no card to answer"))?;
        let answered_card = answered
            .as_card()
            .cloned()
            .ok_or_else(|| SessionError::invalid_state("Session has no card to answer"))?;
        let answered_phase = answered.drill_phase().cloned();

        // 4. Gate on session state before validating the input, so a
        //    mistimed submit reports the state problem.
        let loaded_exchange_count = session.exchange_count();
        session.accept_response()?;
        let response = resolve_input(cmd.input.clone(), &answered_card)?;

        // 5. Current drill, for the oracle's context.
        let spec = self
            .registry
            .mode(session.mode())
            .ok_or_else(|| SessionError::mode_not_found(session.mode().clone()))?;
        let drill = spec.drill_at(session.drill_index()).ok_or_else(|| {
            SessionError::drill_not_found(session.mode().clone(), session.drill_index())
        })?;

        // 6. Coach the response into the next cards; degrade on failure.
        let next_cards = match self
            .oracle
            .coach(CoachRequest {
                user_id: cmd.user_id.clone(),
                session_id: cmd.session_id,
                mode: session.mode().clone(),
                drill_key: drill.key.clone(),
                drill_phase: answered_phase.clone(),
                scenario: drill.scenario.clone(),
                response: response.text().to_string(),
                level: session.level_at_start(),
            })
            .await
        {
            Ok(reply) => {
                let mut cards = vec![(Card::Feedback {
                    text: reply.feedback,
                }, None)];
                if let Some(prompt) = reply.retry_prompt {
                    let phase = self.registry.iteration_phase_for(&drill.drill_type).cloned();
                    cards.push((Card::Prompt { text: prompt }, phase));
                }
                cards
            }
            Err(err) => {
                warn!(
                    session_id = %cmd.session_id,
                    error = %err,
                    "Coaching oracle unavailable, falling back to canned feedback"
                );
                vec![(
                    Card::Feedback {
                        text: DEGRADED_FEEDBACK.to_string(),
                    },
                    None,
                )]
            }
        };
        for (card, _) in &next_cards {
            session.present_card(card)?;
        }

        // 7. Conditional update serializes concurrent submissions; the
        //    loser stops here without queueing or logging anything.
        self.sessions
            .update(&session, loaded_exchange_count)
            .await?;

        // 8. Queue scoring for phases that map to a drill type. Never
        //    blocks the reply.
        self.enqueue_scoring(&cmd, session.mode(), &response, answered_phase.as_ref(), drill)
            .await;

        // 9. Append the response and the new cards to the log.
        let mut new_entries = Vec::with_capacity(next_cards.len() + 1);
        let mut sequence = entries.len() as u32;
        new_entries.push(ExchangeRecord::response(
            cmd.session_id,
            cmd.user_id.clone(),
            sequence,
            response,
            answered_phase,
        ));
        for (card, phase) in &next_cards {
            sequence += 1;
            new_entries.push(ExchangeRecord::card(
                cmd.session_id,
                cmd.user_id.clone(),
                sequence,
                card.clone(),
                phase.clone(),
            ));
        }
        self.exchanges.append_all(&new_entries).await?;

        // 10. Count the exchange toward level progress.
        let mut progress = match self.progress.find(&cmd.user_id, session.mode()).await? {
            Some(progress) => progress,
            None => Progress::new(cmd.user_id.clone(), session.mode().clone()),
        };
        progress.record_exchange();
        self.progress.upsert(&progress).await?;

        Ok(SubmitResponseResult {
            session,
            cards: next_cards.into_iter().map(|(card, _)| card).collect(),
        })
    }

    /// Hands the answered phase to the scoring queue when it maps to a
    /// drill type. Queue failures are logged and dropped.
    async fn enqueue_scoring(
        &self,
        cmd: &SubmitResponseCommand,
        mode: &ModeKey,
        response: &UserResponse,
        answered_phase: Option<&DrillPhase>,
        drill: &DrillSpec,
    ) {
        let phase = match answered_phase {
            Some(phase) => phase,
            None => return,
        };
        let (drill_type, is_iteration) = match self.registry.scoring_target(phase) {
            Some(target) => target,
            None => return,
        };

        let job = ScoringJob {
            user_id: cmd.user_id.clone(),
            session_id: cmd.session_id,
            mode: mode.clone(),
            drill_type: drill_type.clone(),
            drill_phase: phase.clone(),
            is_iteration,
            scenario: drill.scenario.clone(),
            response: response.text().to_string(),
        };
        if let Err(err) = self.queue.enqueue(job).await {
            warn!(
                session_id = %cmd.session_id,
                error = %err,
                "Failed to enqueue scoring job, response will go unscored"
            );
        }
    }
}

/// Resolves raw input against the card it answers.
fn resolve_input(input: ResponseInput, card: &Card) -> Result<UserResponse, SessionError> {
    match input {
        ResponseInput::Text(text) => {
            if text.trim().is_empty() {
                return Err(SessionError::validation(
                    "response",
                    "Response text must not be empty",
                ));
            }
            if matches!(card, Card::MultipleChoice { .. }) {
                return Err(SessionError::validation(
                    "response",
                    "This card expects a choice selection, not free text",
                ));
            }
            Ok(UserResponse::Text { text })
        }
        ResponseInput::Choice(index) => match card {
            Card::MultipleChoice { choices, .. } => {
                let text = choices.get(index as usize).cloned().ok_or_else(|| {
                    SessionError::validation(
                        "choice",
                        format!(
                            "Choice index {} is out of range for {} choices",
                            index,
                            choices.len()
                        ),
                    )
                })?;
                Ok(UserResponse::Choice { index, text })
            }
            _ => Err(SessionError::validation(
                "choice",
                "This card expects a text response, not a choice",
            )),
        },
    }
}
