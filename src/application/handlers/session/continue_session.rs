//! ContinueSessionHandler - Command handler for advancing past a continue
//! point.
//!
//! A continue either reveals the current drill's scenario (after an
//! insight) or advances to the next drill. Advancing past the last drill
//! completes the session: progress is updated, the level check runs, and
//! `session.completed.v1` is published after progress is persisted so
//! subscribers can read it.

use std::sync::Arc;

use crate::application::handlers::session::cards::{opening_card, scenario_card};
use crate::domain::catalog::{CriteriaRegistry, DrillPhase, ModeSpec};
use crate::domain::foundation::{
    CommandMetadata, EventEnvelope, EventId, SessionId, Timestamp, UserId,
};
use crate::domain::session::{
    Card, ContinueAction, ExchangeRecord, LevelChange, Progress, Session, SessionCompleted,
    SessionError,
};
use crate::ports::{EventPublisher, ExchangeLog, ProgressRepository, SessionRepository};

/// Command to advance a session waiting on a continue.
#[derive(Debug, Clone)]
pub struct ContinueSessionCommand {
    pub session_id: SessionId,
    pub user_id: UserId,
}

/// Result of a continue: the updated session and the cards to render.
#[derive(Debug, Clone)]
pub struct ContinueSessionResult {
    pub session: Session,
    pub cards: Vec<Card>,
    pub level_change: Option<LevelChange>,
}

/// Handler for session continues.
pub struct ContinueSessionHandler {
    sessions: Arc<dyn SessionRepository>,
    exchanges: Arc<dyn ExchangeLog>,
    progress: Arc<dyn ProgressRepository>,
    event_publisher: Arc<dyn EventPublisher>,
    registry: Arc<CriteriaRegistry>,
}

impl ContinueSessionHandler {
    pub fn new(
        sessions: Arc<dyn SessionRepository>,
        exchanges: Arc<dyn ExchangeLog>,
        progress: Arc<dyn ProgressRepository>,
        event_publisher: Arc<dyn EventPublisher>,
        registry: Arc<CriteriaRegistry>,
    ) -> Self {
        Self {
            sessions,
            exchanges,
            progress,
            event_publisher,
            registry,
        }
    }

    pub async fn handle(
        &self,
        cmd: ContinueSessionCommand,
        metadata: CommandMetadata,
    ) -> Result<ContinueSessionResult, SessionError> {
        // 1. Load and authorize.
        let mut session = self
            .sessions
            .find_by_id(&cmd.session_id)
            .await?
            .ok_or_else(|| SessionError::not_found(cmd.session_id))?;
        session.authorize(&cmd.user_id)?;
        let loaded_exchange_count = session.exchange_count();

        // 2. What this continue does depends on the pending action.
        let action = session.pending_continue()?;
        let spec = self
            .registry
            .mode(session.mode())
            .ok_or_else(|| SessionError::mode_not_found(session.mode().clone()))?;
        let entries = self.exchanges.list_for_session(&cmd.session_id).await?;
        let next_sequence = entries.len() as u32;

        match action {
            ContinueAction::RevealScenario => {
                self.reveal_scenario(session, cmd, spec, next_sequence, loaded_exchange_count)
                    .await
            }
            ContinueAction::AdvanceDrill => {
                let next_index = session.advance_drill()?;
                match spec.drill_at(next_index) {
                    Some(_) => {
                        self.arrive_at_drill(
                            session,
                            cmd,
                            spec,
                            next_index,
                            next_sequence,
                            loaded_exchange_count,
                        )
                        .await
                    }
                    None => {
                        self.complete_session(
                            session,
                            cmd,
                            spec,
                            next_sequence,
                            loaded_exchange_count,
                            metadata,
                        )
                        .await
                    }
                }
            }
        }
    }

    /// Shows the scenario for the drill the user is already on.
    async fn reveal_scenario(
        &self,
        mut session: Session,
        cmd: ContinueSessionCommand,
        spec: &ModeSpec,
        sequence: u32,
        loaded_exchange_count: u32,
    ) -> Result<ContinueSessionResult, SessionError> {
        let drill = spec.drill_at(session.drill_index()).ok_or_else(|| {
            SessionError::drill_not_found(session.mode().clone(), session.drill_index())
        })?;
        let card = scenario_card(drill);
        session.present_card(&card)?;

        self.sessions
            .update(&session, loaded_exchange_count)
            .await?;
        self.exchanges
            .append(&ExchangeRecord::card(
                cmd.session_id,
                cmd.user_id,
                sequence,
                card.clone(),
                Some(drill.phase.clone()),
            ))
            .await?;

        Ok(ContinueSessionResult {
            session,
            cards: vec![card],
            level_change: None,
        })
    }

    /// Presents the opening card of the drill the session just advanced to.
    async fn arrive_at_drill(
        &self,
        mut session: Session,
        cmd: ContinueSessionCommand,
        spec: &ModeSpec,
        index: u32,
        sequence: u32,
        loaded_exchange_count: u32,
    ) -> Result<ContinueSessionResult, SessionError> {
        let drill = spec
            .drill_at(index)
            .ok_or_else(|| SessionError::drill_not_found(session.mode().clone(), index))?;
        let insight_seen = match drill.insight {
            Some(_) => {
                self.exchanges
                    .has_seen_insight(&cmd.user_id, &drill.key)
                    .await?
            }
            None => true,
        };
        let (card, phase) = opening_card(drill, insight_seen);
        session.present_card(&card)?;

        self.sessions
            .update(&session, loaded_exchange_count)
            .await?;
        self.exchanges
            .append(&ExchangeRecord::card(
                cmd.session_id,
                cmd.user_id,
                sequence,
                card.clone(),
                Some(phase),
            ))
            .await?;

        Ok(ContinueSessionResult {
            session,
            cards: vec![card],
            level_change: None,
        })
    }

    /// Completes the session after the last drill: terminal cards, progress
    /// bookkeeping, level check, completion event.
    async fn complete_session(
        &self,
        mut session: Session,
        cmd: ContinueSessionCommand,
        spec: &ModeSpec,
        sequence: u32,
        loaded_exchange_count: u32,
        metadata: CommandMetadata,
    ) -> Result<ContinueSessionResult, SessionError> {
        let now = Timestamp::now();

        // 1. Progress bookkeeping and the level check.
        let mut progress = match self.progress.find(&cmd.user_id, session.mode()).await? {
            Some(progress) => progress,
            None => Progress::new(cmd.user_id.clone(), session.mode().clone()),
        };
        progress.record_session_completed();
        let level_change = progress.evaluate_level(spec);

        // 2. Terminal cards. These are not presented to the state machine;
        //    a completed session answers nothing.
        let mut cards = vec![Card::Reflection {
            text: format!(
                "Session complete: {} responses across {} drills in {}. Which answer would you send word for word tomorrow?",
                session.exchange_count(),
                spec.drill_count(),
                spec.label
            ),
        }];
        match level_change {
            Some(LevelChange::Advanced { new_level }) => cards.push(Card::LevelUp {
                level: new_level,
                message: format!("Level {} unlocked in {}.", new_level, spec.label),
            }),
            Some(LevelChange::Capped { level }) => cards.push(Card::LevelCap {
                level,
                message: format!(
                    "{} is at its top level ({}). New scenarios rotate in weekly.",
                    spec.label, level
                ),
            }),
            None => {}
        }

        session.complete(now)?;

        // 3. Persist the session, then the log, then progress.
        self.sessions
            .update(&session, loaded_exchange_count)
            .await?;
        let mut new_entries = Vec::with_capacity(cards.len());
        for (offset, card) in cards.iter().enumerate() {
            let phase = match card {
                Card::Reflection { .. } => Some(DrillPhase::from("Session Complete")),
                _ => None,
            };
            new_entries.push(ExchangeRecord::card(
                cmd.session_id,
                cmd.user_id.clone(),
                sequence + offset as u32,
                card.clone(),
                phase,
            ));
        }
        self.exchanges.append_all(&new_entries).await?;
        self.progress.upsert(&progress).await?;

        // 4. Publish session.completed.v1. Progress is already persisted,
        //    so subscribers may read it.
        let event = SessionCompleted {
            event_id: EventId::new(),
            session_id: cmd.session_id,
            user_id: cmd.user_id,
            mode: session.mode().clone(),
            exchange_count: session.exchange_count(),
            drills_completed: spec.drill_count(),
            level_change,
            completed_at: now,
        };
        let envelope = EventEnvelope::from_event(&event)
            .with_correlation_id(metadata.correlation_id())
            .with_user_id(metadata.user_id.to_string());
        self.event_publisher.publish(envelope).await?;

        Ok(ContinueSessionResult {
            session,
            cards,
            level_change,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    use crate::domain::catalog::ModeKey;
    use crate::domain::foundation::DomainError;
    use crate::domain::session::UserResponse;

    struct MockSessionRepository {
        stored: Mutex<Option<Session>>,
        updates: Mutex<u32>,
    }

    impl MockSessionRepository {
        fn with_session(session: Session) -> Self {
            Self {
                stored: Mutex::new(Some(session)),
                updates: Mutex::new(0),
            }
        }

        fn updated(&self) -> Option<Session> {
            if *self.updates.lock().unwrap() == 0 {
                return None;
            }
            self.stored.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl SessionRepository for MockSessionRepository {
        async fn save(&self, _session: &Session) -> Result<(), DomainError> {
            Ok(())
        }

        async fn update(
            &self,
            session: &Session,
            _loaded_exchange_count: u32,
        ) -> Result<(), DomainError> {
            *self.updates.lock().unwrap() += 1;
            *self.stored.lock().unwrap() = Some(session.clone());
            Ok(())
        }

        async fn find_by_id(&self, _id: &SessionId) -> Result<Option<Session>, DomainError> {
            Ok(self.stored.lock().unwrap().clone())
        }

        async fn find_active_for_user(
            &self,
            _user_id: &UserId,
        ) -> Result<Option<Session>, DomainError> {
            Ok(None)
        }
    }

    struct MockExchangeLog {
        existing: Vec<ExchangeRecord>,
        appended: Mutex<Vec<ExchangeRecord>>,
        insight_seen: bool,
    }

    impl MockExchangeLog {
        fn with_entries(existing: Vec<ExchangeRecord>) -> Self {
            Self {
                existing,
                appended: Mutex::new(Vec::new()),
                insight_seen: false,
            }
        }

        fn appended(&self) -> Vec<ExchangeRecord> {
            self.appended.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ExchangeLog for MockExchangeLog {
        async fn append(&self, entry: &ExchangeRecord) -> Result<(), DomainError> {
            self.appended.lock().unwrap().push(entry.clone());
            Ok(())
        }

        async fn append_all(&self, entries: &[ExchangeRecord]) -> Result<(), DomainError> {
            self.appended.lock().unwrap().extend_from_slice(entries);
            Ok(())
        }

        async fn list_for_session(
            &self,
            _session_id: &SessionId,
        ) -> Result<Vec<ExchangeRecord>, DomainError> {
            Ok(self.existing.clone())
        }

        async fn count_user_entries_since(
            &self,
            _user_id: &UserId,
            _since: Timestamp,
        ) -> Result<u32, DomainError> {
            Ok(0)
        }

        async fn has_seen_insight(
            &self,
            _user_id: &UserId,
            _drill_key: &str,
        ) -> Result<bool, DomainError> {
            Ok(self.insight_seen)
        }
    }

    struct MockProgressRepository {
        stored: Mutex<Option<Progress>>,
    }

    impl MockProgressRepository {
        fn new() -> Self {
            Self {
                stored: Mutex::new(None),
            }
        }

        fn with_progress(progress: Progress) -> Self {
            Self {
                stored: Mutex::new(Some(progress)),
            }
        }

        fn stored(&self) -> Option<Progress> {
            self.stored.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ProgressRepository for MockProgressRepository {
        async fn find(
            &self,
            _user_id: &UserId,
            _mode: &ModeKey,
        ) -> Result<Option<Progress>, DomainError> {
            Ok(self.stored.lock().unwrap().clone())
        }

        async fn upsert(&self, progress: &Progress) -> Result<(), DomainError> {
            *self.stored.lock().unwrap() = Some(progress.clone());
            Ok(())
        }
    }

    struct MockEventPublisher {
        published: Mutex<Vec<EventEnvelope>>,
    }

    impl MockEventPublisher {
        fn new() -> Self {
            Self {
                published: Mutex::new(Vec::new()),
            }
        }

        fn published(&self) -> Vec<EventEnvelope> {
            self.published.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl EventPublisher for MockEventPublisher {
        async fn publish(&self, envelope: EventEnvelope) -> Result<(), DomainError> {
            self.published.lock().unwrap().push(envelope);
            Ok(())
        }

        async fn publish_all(&self, envelopes: Vec<EventEnvelope>) -> Result<(), DomainError> {
            self.published.lock().unwrap().extend(envelopes);
            Ok(())
        }
    }

    fn test_user_id() -> UserId {
        UserId::new("user-1").unwrap()
    }

    fn test_metadata() -> CommandMetadata {
        CommandMetadata::test_fixture()
    }

    fn mode() -> ModeKey {
        ModeKey::from("assertiveness")
    }

    /// Fresh session sitting on an insight card, awaiting the reveal.
    fn session_on_insight() -> (Session, Vec<ExchangeRecord>) {
        let mut session = Session::start(SessionId::new(), test_user_id(), mode(), 1);
        let card = Card::Insight {
            drill_key: "ask_bigger".to_string(),
            text: "Strong asks name the thing and stop.".to_string(),
        };
        session.present_card(&card).unwrap();
        let entry = ExchangeRecord::card(
            *session.id(),
            test_user_id(),
            0,
            card,
            Some(DrillPhase::from("Opening Ask")),
        );
        (session, vec![entry])
    }

    /// Session that answered a drill and awaits the advance continue.
    fn session_awaiting_advance(drill_index_answers: u32) -> (Session, Vec<ExchangeRecord>) {
        let mut session = Session::start(SessionId::new(), test_user_id(), mode(), 1);
        let mut entries = Vec::new();
        let mut sequence = 0;
        for _ in 0..=drill_index_answers {
            let scenario = Card::Scenario {
                text: "scenario".to_string(),
                word_limit: None,
                timer_seconds: None,
            };
            session.present_card(&scenario).unwrap();
            entries.push(ExchangeRecord::card(
                *session.id(),
                test_user_id(),
                sequence,
                scenario,
                None,
            ));
            sequence += 1;

            session.accept_response().unwrap();
            entries.push(ExchangeRecord::response(
                *session.id(),
                test_user_id(),
                sequence,
                UserResponse::Text {
                    text: "an answer".to_string(),
                },
                None,
            ));
            sequence += 1;

            let feedback = Card::Feedback {
                text: "Good.".to_string(),
            };
            session.present_card(&feedback).unwrap();
            entries.push(ExchangeRecord::card(
                *session.id(),
                test_user_id(),
                sequence,
                feedback,
                None,
            ));
            sequence += 1;

            if session.drill_index() < drill_index_answers {
                session.advance_drill().unwrap();
            }
        }
        (session, entries)
    }

    struct Fixture {
        exchanges: Arc<MockExchangeLog>,
        progress: Arc<MockProgressRepository>,
        events: Arc<MockEventPublisher>,
        sessions: Arc<MockSessionRepository>,
        handler: ContinueSessionHandler,
    }

    fn fixture(
        sessions: MockSessionRepository,
        exchanges: MockExchangeLog,
        progress: MockProgressRepository,
    ) -> Fixture {
        let sessions = Arc::new(sessions);
        let exchanges = Arc::new(exchanges);
        let progress = Arc::new(progress);
        let events = Arc::new(MockEventPublisher::new());
        let handler = ContinueSessionHandler::new(
            sessions.clone(),
            exchanges.clone(),
            progress.clone(),
            events.clone(),
            Arc::new(CriteriaRegistry::builtin()),
        );
        Fixture {
            exchanges,
            progress,
            events,
            sessions,
            handler,
        }
    }

    fn command(session: &Session) -> ContinueSessionCommand {
        ContinueSessionCommand {
            session_id: *session.id(),
            user_id: test_user_id(),
        }
    }

    #[tokio::test]
    async fn continue_after_insight_reveals_the_scenario() {
        let (session, entries) = session_on_insight();
        let fx = fixture(
            MockSessionRepository::with_session(session.clone()),
            MockExchangeLog::with_entries(entries),
            MockProgressRepository::new(),
        );

        let result = fx
            .handler
            .handle(command(&session), test_metadata())
            .await
            .unwrap();

        assert_eq!(result.cards.len(), 1);
        assert!(matches!(result.cards[0], Card::Scenario { .. }));
        // Still on the same drill.
        assert_eq!(result.session.drill_index(), 0);

        let appended = fx.exchanges.appended();
        assert_eq!(appended.len(), 1);
        assert_eq!(appended[0].sequence(), 1);
        assert_eq!(
            appended[0].drill_phase().map(|p| p.as_str()),
            Some("Opening Ask")
        );
    }

    #[tokio::test]
    async fn continue_after_feedback_advances_to_next_drill() {
        let (session, entries) = session_awaiting_advance(0);
        let fx = fixture(
            MockSessionRepository::with_session(session.clone()),
            MockExchangeLog::with_entries(entries),
            MockProgressRepository::new(),
        );

        let result = fx
            .handler
            .handle(command(&session), test_metadata())
            .await
            .unwrap();

        assert_eq!(result.session.drill_index(), 1);
        assert_eq!(result.cards.len(), 1);
        // Second assertiveness drill has no insight; the scenario shows
        // directly, tagged with its phase.
        assert!(matches!(result.cards[0], Card::Scenario { .. }));
        let appended = fx.exchanges.appended();
        assert_eq!(
            appended[0].drill_phase().map(|p| p.as_str()),
            Some("Holding Firm")
        );
        assert!(fx.events.published().is_empty());
    }

    #[tokio::test]
    async fn advancing_past_the_last_drill_completes_the_session() {
        let (session, entries) = session_awaiting_advance(2);
        let fx = fixture(
            MockSessionRepository::with_session(session.clone()),
            MockExchangeLog::with_entries(entries),
            MockProgressRepository::new(),
        );

        let result = fx
            .handler
            .handle(command(&session), test_metadata())
            .await
            .unwrap();

        assert!(!result.session.status().is_active());
        assert!(result.session.ended_at().is_some());
        assert!(matches!(result.cards[0], Card::Reflection { .. }));

        let stored = fx.sessions.updated().unwrap();
        assert!(stored.ended_at().is_some());

        let progress = fx.progress.stored().unwrap();
        assert_eq!(progress.sessions_completed(), 1);

        let published = fx.events.published();
        assert_eq!(published.len(), 1);
        assert_eq!(published[0].event_type, "session.completed.v1");
    }

    #[tokio::test]
    async fn completion_below_the_threshold_keeps_the_level() {
        let mut progress = Progress::new(test_user_id(), mode());
        for _ in 0..9 {
            progress.record_exchange();
        }

        let (session, entries) = session_awaiting_advance(2);
        let fx = fixture(
            MockSessionRepository::with_session(session.clone()),
            MockExchangeLog::with_entries(entries),
            MockProgressRepository::with_progress(progress),
        );

        let result = fx
            .handler
            .handle(command(&session), test_metadata())
            .await
            .unwrap();

        // 9 exchanges at level 1 is below the first threshold of 10.
        assert!(result.level_change.is_none());

        let progress = fx.progress.stored().unwrap();
        assert_eq!(progress.level(), 1);
        assert_eq!(progress.sessions_completed(), 1);
    }

    #[tokio::test]
    async fn completion_crosses_the_threshold_and_levels_up() {
        let mut progress = Progress::new(test_user_id(), mode());
        for _ in 0..10 {
            progress.record_exchange();
        }

        let (session, entries) = session_awaiting_advance(2);
        let fx = fixture(
            MockSessionRepository::with_session(session.clone()),
            MockExchangeLog::with_entries(entries),
            MockProgressRepository::with_progress(progress),
        );

        let result = fx
            .handler
            .handle(command(&session), test_metadata())
            .await
            .unwrap();

        assert_eq!(
            result.level_change,
            Some(LevelChange::Advanced { new_level: 2 })
        );
        assert!(result
            .cards
            .iter()
            .any(|card| matches!(card, Card::LevelUp { level: 2, .. })));

        let progress = fx.progress.stored().unwrap();
        assert_eq!(progress.level(), 2);
        assert_eq!(progress.exchanges_at_level(), 0);
    }

    #[tokio::test]
    async fn completed_event_carries_the_level_change() {
        let mut progress = Progress::new(test_user_id(), mode());
        for _ in 0..10 {
            progress.record_exchange();
        }

        let (session, entries) = session_awaiting_advance(2);
        let fx = fixture(
            MockSessionRepository::with_session(session.clone()),
            MockExchangeLog::with_entries(entries),
            MockProgressRepository::with_progress(progress),
        );

        fx.handler
            .handle(command(&session), test_metadata())
            .await
            .unwrap();

        let published = fx.events.published();
        let payload: SessionCompleted = published[0].payload_as().unwrap();
        assert_eq!(
            payload.level_change,
            Some(LevelChange::Advanced { new_level: 2 })
        );
        assert_eq!(payload.drills_completed, 3);
        assert_eq!(payload.exchange_count, 3);
    }

    #[tokio::test]
    async fn continue_while_awaiting_response_is_rejected() {
        let mut session = Session::start(SessionId::new(), test_user_id(), mode(), 1);
        let card = Card::Scenario {
            text: "scenario".to_string(),
            word_limit: None,
            timer_seconds: None,
        };
        session.present_card(&card).unwrap();

        let fx = fixture(
            MockSessionRepository::with_session(session.clone()),
            MockExchangeLog::with_entries(vec![]),
            MockProgressRepository::new(),
        );

        let err = fx
            .handler
            .handle(command(&session), test_metadata())
            .await
            .unwrap_err();

        assert!(matches!(err, SessionError::AwaitingResponse));
    }

    #[tokio::test]
    async fn other_users_continue_is_forbidden() {
        let (session, entries) = session_on_insight();
        let fx = fixture(
            MockSessionRepository::with_session(session.clone()),
            MockExchangeLog::with_entries(entries),
            MockProgressRepository::new(),
        );

        let cmd = ContinueSessionCommand {
            session_id: *session.id(),
            user_id: UserId::new("intruder").unwrap(),
        };
        let err = fx.handler.handle(cmd, test_metadata()).await.unwrap_err();

        assert!(matches!(err, SessionError::Forbidden));
    }

    #[tokio::test]
    async fn unknown_session_is_not_found() {
        struct EmptySessionRepository;

        #[async_trait]
        impl SessionRepository for EmptySessionRepository {
            async fn save(&self, _session: &Session) -> Result<(), DomainError> {
                Ok(())
            }

            async fn update(
                &self,
                _session: &Session,
                _loaded_exchange_count: u32,
            ) -> Result<(), DomainError> {
                Ok(())
            }

            async fn find_by_id(&self, _id: &SessionId) -> Result<Option<Session>, DomainError> {
                Ok(None)
            }

            async fn find_active_for_user(
                &self,
                _user_id: &UserId,
            ) -> Result<Option<Session>, DomainError> {
                Ok(None)
            }
        }

        let handler = ContinueSessionHandler::new(
            Arc::new(EmptySessionRepository),
            Arc::new(MockExchangeLog::with_entries(vec![])),
            Arc::new(MockProgressRepository::new()),
            Arc::new(MockEventPublisher::new()),
            Arc::new(CriteriaRegistry::builtin()),
        );

        let cmd = ContinueSessionCommand {
            session_id: SessionId::new(),
            user_id: test_user_id(),
        };
        let err = handler.handle(cmd, test_metadata()).await.unwrap_err();

        assert!(matches!(err, SessionError::NotFound(_)));
    }
}
