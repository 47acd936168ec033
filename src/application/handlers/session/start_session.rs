//! StartSessionHandler - Command handler for starting practice sessions.
//!
//! Starts a new session in the requested mode, or resumes the user's
//! active session when one exists. A fresh start presents the first
//! drill's opening card (a one-time insight, or the scenario itself) and
//! publishes `session.started.v1`.

use std::sync::Arc;

use crate::application::handlers::session::budget::ExchangeBudget;
use crate::application::handlers::session::cards::opening_card;
use crate::domain::catalog::{CriteriaRegistry, ModeKey};
use crate::domain::foundation::{CommandMetadata, EventEnvelope, EventId, SessionId, UserId};
use crate::domain::session::{
    Card, ExchangeRecord, Progress, Session, SessionError, SessionStarted,
};
use crate::ports::{EventPublisher, ExchangeLog, ProgressRepository, SessionRepository};

/// Command to start (or resume) a practice session.
#[derive(Debug, Clone)]
pub struct StartSessionCommand {
    pub user_id: UserId,
    pub mode: ModeKey,
}

/// Result of starting a session.
#[derive(Debug, Clone)]
pub struct StartSessionResult {
    pub session: Session,
    pub card: Card,
    pub level: u32,
    pub resumed: bool,
}

/// Handler for starting practice sessions.
pub struct StartSessionHandler {
    sessions: Arc<dyn SessionRepository>,
    exchanges: Arc<dyn ExchangeLog>,
    progress: Arc<dyn ProgressRepository>,
    budget: Arc<ExchangeBudget>,
    event_publisher: Arc<dyn EventPublisher>,
    registry: Arc<CriteriaRegistry>,
}

impl StartSessionHandler {
    pub fn new(
        sessions: Arc<dyn SessionRepository>,
        exchanges: Arc<dyn ExchangeLog>,
        progress: Arc<dyn ProgressRepository>,
        budget: Arc<ExchangeBudget>,
        event_publisher: Arc<dyn EventPublisher>,
        registry: Arc<CriteriaRegistry>,
    ) -> Self {
        Self {
            sessions,
            exchanges,
            progress,
            budget,
            event_publisher,
            registry,
        }
    }

    pub async fn handle(
        &self,
        cmd: StartSessionCommand,
        metadata: CommandMetadata,
    ) -> Result<StartSessionResult, SessionError> {
        // 1. One active session per user; a second start resumes it.
        if let Some(session) = self.sessions.find_active_for_user(&cmd.user_id).await? {
            tracing::debug!(
                user_id = %cmd.user_id,
                session_id = %session.id(),
                "Resuming active session instead of starting a new one"
            );
            return self.resume(session).await;
        }

        // 2. Validate the requested mode.
        let spec = self
            .registry
            .mode(&cmd.mode)
            .ok_or_else(|| SessionError::mode_not_found(cmd.mode.clone()))?;

        // 3. Enforce the daily exchange budget up front.
        self.budget.ensure_available(&cmd.user_id).await?;

        // 4. Resolve the user's level in this mode, creating progress on
        //    first contact.
        let progress = match self.progress.find(&cmd.user_id, &cmd.mode).await? {
            Some(progress) => progress,
            None => {
                let fresh = Progress::new(cmd.user_id.clone(), cmd.mode.clone());
                self.progress.upsert(&fresh).await?;
                fresh
            }
        };
        let level = progress.level();

        // 5. Build the session around the first drill's opening card.
        let drill = spec
            .drill_at(0)
            .ok_or_else(|| SessionError::drill_not_found(cmd.mode.clone(), 0))?;
        let insight_seen = match drill.insight {
            Some(_) => {
                self.exchanges
                    .has_seen_insight(&cmd.user_id, &drill.key)
                    .await?
            }
            None => true,
        };
        let (card, phase) = opening_card(drill, insight_seen);

        let mut session = Session::start(
            SessionId::new(),
            cmd.user_id.clone(),
            cmd.mode.clone(),
            level,
        );
        session.present_card(&card)?;

        // 6. Persist the session, then its first log entry.
        self.sessions.save(&session).await?;
        let entry = ExchangeRecord::card(
            *session.id(),
            cmd.user_id.clone(),
            0,
            card.clone(),
            Some(phase),
        );
        self.exchanges.append(&entry).await?;

        // 7. Publish session.started.v1.
        let event = SessionStarted {
            event_id: EventId::new(),
            session_id: *session.id(),
            user_id: cmd.user_id.clone(),
            mode: cmd.mode,
            level_at_start: level,
            started_at: *session.started_at(),
        };
        let envelope = EventEnvelope::from_event(&event)
            .with_correlation_id(metadata.correlation_id())
            .with_user_id(metadata.user_id.to_string());
        self.event_publisher.publish(envelope).await?;

        Ok(StartSessionResult {
            session,
            card,
            level,
            resumed: false,
        })
    }

    /// Returns the active session with its most recent card so the client
    /// can re-render where the user left off.
    async fn resume(&self, session: Session) -> Result<StartSessionResult, SessionError> {
        let entries = self.exchanges.list_for_session(session.id()).await?;
        let card = entries
            .iter()
            .rev()
            .find_map(|entry| entry.as_card())
            .cloned()
            .ok_or_else(|| SessionError::invalid_state("Active session has no presented card"))?;

        Ok(StartSessionResult {
            level: session.level_at_start(),
            card,
            resumed: true,
            session,
        })
    }
}
