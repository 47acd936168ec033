//! GetProgressHandler - Query handler for per-mode training progress.

use std::sync::Arc;

use serde::Serialize;

use crate::domain::catalog::{CriteriaRegistry, ModeKey};
use crate::domain::foundation::UserId;
use crate::domain::session::{Progress, SessionError};
use crate::ports::ProgressRepository;

/// Query for a user's progress in one practice mode.
#[derive(Debug, Clone)]
pub struct GetProgressQuery {
    pub user_id: UserId,
    pub mode: ModeKey,
}

/// A user's standing in a mode, shaped for display.
#[derive(Debug, Clone, Serialize)]
pub struct ProgressView {
    pub mode: ModeKey,
    pub level: u32,
    pub max_level: u32,
    pub exchanges_at_level: u32,
    pub next_level_threshold: Option<u32>,
    pub sessions_completed: u32,
    pub drills_completed: u32,
    pub exchanges_recorded: u32,
}

/// Handler for progress queries.
pub struct GetProgressHandler {
    progress: Arc<dyn ProgressRepository>,
    registry: Arc<CriteriaRegistry>,
}

impl GetProgressHandler {
    pub fn new(progress: Arc<dyn ProgressRepository>, registry: Arc<CriteriaRegistry>) -> Self {
        Self { progress, registry }
    }

    /// Users who never practiced a mode get the level 1 defaults rather
    /// than an error.
    pub async fn handle(&self, query: GetProgressQuery) -> Result<ProgressView, SessionError> {
        let spec = self
            .registry
            .mode(&query.mode)
            .ok_or_else(|| SessionError::mode_not_found(query.mode.clone()))?;

        let progress = match self.progress.find(&query.user_id, &query.mode).await? {
            Some(progress) => progress,
            None => Progress::new(query.user_id.clone(), query.mode.clone()),
        };

        Ok(ProgressView {
            mode: query.mode,
            level: progress.level(),
            max_level: spec.max_level,
            exchanges_at_level: progress.exchanges_at_level(),
            next_level_threshold: spec.threshold_for(progress.level()),
            sessions_completed: progress.sessions_completed(),
            drills_completed: progress.drills_completed(),
            exchanges_recorded: progress.exchanges_recorded(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    use crate::domain::foundation::DomainError;

    struct MockProgressRepository {
        stored: Mutex<Option<Progress>>,
    }

    impl MockProgressRepository {
        fn empty() -> Self {
            Self {
                stored: Mutex::new(None),
            }
        }

        fn with_progress(progress: Progress) -> Self {
            Self {
                stored: Mutex::new(Some(progress)),
            }
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

    fn test_user_id() -> UserId {
        UserId::new("user-1").unwrap()
    }

    fn handler(repo: MockProgressRepository) -> GetProgressHandler {
        GetProgressHandler::new(Arc::new(repo), Arc::new(CriteriaRegistry::builtin()))
    }

    fn query() -> GetProgressQuery {
        GetProgressQuery {
            user_id: test_user_id(),
            mode: ModeKey::from("assertiveness"),
        }
    }

    #[tokio::test]
    async fn unknown_user_gets_level_one_defaults() {
        let handler = handler(MockProgressRepository::empty());

        let view = handler.handle(query()).await.unwrap();

        assert_eq!(view.level, 1);
        assert_eq!(view.max_level, 5);
        assert_eq!(view.exchanges_at_level, 0);
        assert_eq!(view.next_level_threshold, Some(10));
        assert_eq!(view.sessions_completed, 0);
    }

    #[tokio::test]
    async fn stored_progress_is_reflected() {
        let mut progress = Progress::new(test_user_id(), ModeKey::from("assertiveness"));
        for _ in 0..12 {
            progress.record_exchange();
        }
        progress.record_session_completed();
        progress.record_drill_completed();
        let spec = CriteriaRegistry::builtin();
        progress.evaluate_level(spec.mode(&ModeKey::from("assertiveness")).unwrap());

        let handler = handler(MockProgressRepository::with_progress(progress));

        let view = handler.handle(query()).await.unwrap();

        assert_eq!(view.level, 2);
        assert_eq!(view.exchanges_at_level, 0);
        assert_eq!(view.next_level_threshold, Some(25));
        assert_eq!(view.sessions_completed, 1);
        assert_eq!(view.drills_completed, 1);
        assert_eq!(view.exchanges_recorded, 12);
    }

    #[tokio::test]
    async fn unknown_mode_is_rejected() {
        let handler = handler(MockProgressRepository::empty());

        let err = handler
            .handle(GetProgressQuery {
                user_id: test_user_id(),
                mode: ModeKey::from("interpretive_dance"),
            })
            .await
            .unwrap_err();

        assert!(matches!(err, SessionError::ModeNotFound(_)));
    }
}
