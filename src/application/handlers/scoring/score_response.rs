//! ScoreResponseHandler - Processes one scoring job off the queue.
//!
//! Judges the response against the drill type's criteria, persists the
//! score record with its derived dimension scores, counts the drill
//! toward progress, and publishes `drill.scored.v1`. Runs on the worker
//! pool, never on a request path.

use std::sync::Arc;

use tracing::debug;

use crate::domain::catalog::CriteriaRegistry;
use crate::domain::foundation::{EventEnvelope, EventId};
use crate::domain::scoring::{DrillScored, Grader, ScoreRecord, ScoringError};
use crate::domain::session::Progress;
use crate::ports::{
    EventPublisher, JudgeRequest, ProgressRepository, ScoreStore, ScoringJob, ScoringOracle,
};

/// Handler for scoring jobs.
pub struct ScoreResponseHandler {
    oracle: Arc<dyn ScoringOracle>,
    scores: Arc<dyn ScoreStore>,
    progress: Arc<dyn ProgressRepository>,
    event_publisher: Arc<dyn EventPublisher>,
    registry: Arc<CriteriaRegistry>,
    grader: Grader,
    count_iterations: bool,
}

impl ScoreResponseHandler {
    pub fn new(
        oracle: Arc<dyn ScoringOracle>,
        scores: Arc<dyn ScoreStore>,
        progress: Arc<dyn ProgressRepository>,
        event_publisher: Arc<dyn EventPublisher>,
        registry: Arc<CriteriaRegistry>,
        grader: Grader,
        count_iterations: bool,
    ) -> Self {
        Self {
            oracle,
            scores,
            progress,
            event_publisher,
            registry,
            grader,
            count_iterations,
        }
    }

    /// Scores one job. Returns the published event, or None when the
    /// job's drill type has no criteria and scoring is a no-op.
    pub async fn handle(&self, job: ScoringJob) -> Result<Option<DrillScored>, ScoringError> {
        // 1. Unknown drill types are dropped, not failed; the card flow
        //    already moved on.
        let criteria = match self.registry.criteria_for_drill_type(&job.drill_type) {
            Some(criteria) => criteria,
            None => {
                debug!(
                    drill_type = %job.drill_type.as_str(),
                    "No criteria registered for drill type, dropping job"
                );
                return Ok(None);
            }
        };

        // 2. Judge the response against the full criteria set.
        let outcomes = self
            .oracle
            .judge(JudgeRequest {
                drill_type: job.drill_type.clone(),
                drill_phase: job.drill_phase.clone(),
                scenario: job.scenario.clone(),
                response: job.response.clone(),
                criteria: criteria.into_iter().cloned().collect(),
            })
            .await?;

        // 3. Derive dimension scores from the judged criteria only.
        let record = ScoreRecord::new(
            job.user_id.clone(),
            job.session_id,
            job.mode.clone(),
            job.drill_type.clone(),
            job.drill_phase.clone(),
            job.is_iteration,
            outcomes,
            job.response.clone(),
        );
        let judged = record.judged_criteria();
        let dimensions = self.registry.dimensions_for_criteria(&judged);
        let scores = self.grader.grade(&record, &dimensions);

        // 4. Record and derived scores land atomically.
        self.scores.insert_scored(&record, &scores).await?;

        // 5. First attempts count toward drill completions; retries only
        //    when configured to.
        if !job.is_iteration || self.count_iterations {
            let mut progress = match self.progress.find(&job.user_id, &job.mode).await? {
                Some(progress) => progress,
                None => Progress::new(job.user_id.clone(), job.mode.clone()),
            };
            progress.record_drill_completed();
            self.progress.upsert(&progress).await?;
        }

        // 6. Publish drill.scored.v1.
        let event = DrillScored {
            event_id: EventId::new(),
            score_record_id: *record.id(),
            session_id: job.session_id,
            user_id: job.user_id,
            mode: job.mode,
            drill_type: job.drill_type,
            drill_phase: job.drill_phase,
            is_iteration: job.is_iteration,
            dimensions: scores.iter().map(|s| s.dimension().clone()).collect(),
            scored_at: *record.created_at(),
        };
        self.event_publisher
            .publish(EventEnvelope::from_event(&event).with_user_id(event.user_id.to_string()))
            .await?;

        Ok(Some(event))
    }
}
