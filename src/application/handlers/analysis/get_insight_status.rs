//! GetInsightStatusHandler - Query handler for the insights gate state.
//!
//! A cheap companion to the full report: enough for a client to render
//! the right upsell or countdown without pulling pattern data. Only the
//! teaser path runs any analysis.

use std::sync::Arc;

use serde::Serialize;

use crate::domain::analysis::{
    AccessGate, AnalysisError, AnalysisThresholds, GateDecision, PatternClassifier, TeaserSummary,
};
use crate::domain::foundation::{Timestamp, UserId};
use crate::domain::membership::MembershipTier;
use crate::ports::{MembershipReader, ScoreStore, SessionReader};

/// Query for a user's insight gate status.
#[derive(Debug, Clone)]
pub struct GetInsightStatusQuery {
    pub user_id: UserId,
}

/// Where a user stands relative to the insights gate.
#[derive(Debug, Clone, Serialize)]
pub struct InsightStatus {
    pub state: GateDecision,
    pub sessions_completed: u32,
    pub sessions_until_insights: u32,
    /// Anonymized signal counts, present only behind the upgrade gate.
    pub teaser: Option<TeaserSummary>,
}

/// Handler for insight status queries.
pub struct GetInsightStatusHandler {
    sessions: Arc<dyn SessionReader>,
    scores: Arc<dyn ScoreStore>,
    memberships: Arc<dyn MembershipReader>,
    thresholds: AnalysisThresholds,
}

impl GetInsightStatusHandler {
    pub fn new(
        sessions: Arc<dyn SessionReader>,
        scores: Arc<dyn ScoreStore>,
        memberships: Arc<dyn MembershipReader>,
        thresholds: AnalysisThresholds,
    ) -> Self {
        Self {
            sessions,
            scores,
            memberships,
            thresholds,
        }
    }

    pub async fn handle(
        &self,
        query: GetInsightStatusQuery,
        now: Timestamp,
    ) -> Result<InsightStatus, AnalysisError> {
        let completed = self.sessions.count_completed(&query.user_id).await?;
        let tier = self
            .memberships
            .get_by_user(&query.user_id)
            .await?
            .map(|view| view.tier)
            .unwrap_or(MembershipTier::Free);

        let gate = AccessGate::new(self.thresholds.clone());
        let state = gate.evaluate(completed, tier);

        let teaser = match state {
            GateDecision::RequiresUpgrade => {
                let since = now.minus_days(self.thresholds.baseline_window_days);
                let samples = self
                    .scores
                    .samples_for_user_since(&query.user_id, since)
                    .await?;
                let patterns =
                    PatternClassifier::new(self.thresholds.clone()).classify(&samples, now);
                Some(TeaserSummary::from_patterns(&patterns, completed))
            }
            GateDecision::InsufficientData | GateDecision::Unlocked => None,
        };

        Ok(InsightStatus {
            state,
            sessions_completed: completed,
            sessions_until_insights: gate.sessions_until_insights(completed),
            teaser,
        })
    }
}
