//! GetInsightsHandler - Query handler for the insights report.
//!
//! Runs the access gate first, then does only the analysis the gate
//! allows: nothing extra for insufficient data, a pattern pass for the
//! teaser, patterns plus weekly trends for an unlocked report.

use std::sync::Arc;

use crate::domain::analysis::{
    AccessGate, AnalysisError, AnalysisThresholds, GateDecision, InsightsReport,
    PatternClassifier, TeaserSummary, TrendCalculator,
};
use crate::domain::foundation::{Timestamp, UserId};
use crate::domain::membership::MembershipTier;
use crate::domain::scoring::DimensionScore;
use crate::ports::{MembershipReader, ScoreStore, SessionReader};

/// Query for a user's insights report.
#[derive(Debug, Clone)]
pub struct GetInsightsQuery {
    pub user_id: UserId,
}

/// Handler for insights report queries.
pub struct GetInsightsHandler {
    sessions: Arc<dyn SessionReader>,
    scores: Arc<dyn ScoreStore>,
    memberships: Arc<dyn MembershipReader>,
    thresholds: AnalysisThresholds,
}

impl GetInsightsHandler {
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

    /// Builds the report as of `now`. The instant is explicit so the
    /// analysis windows are reproducible.
    pub async fn handle(
        &self,
        query: GetInsightsQuery,
        now: Timestamp,
    ) -> Result<InsightsReport, AnalysisError> {
        let completed = self.sessions.count_completed(&query.user_id).await?;
        let tier = self
            .memberships
            .get_by_user(&query.user_id)
            .await?
            .map(|view| view.tier)
            .unwrap_or(MembershipTier::Free);

        let gate = AccessGate::new(self.thresholds.clone());
        match gate.evaluate(completed, tier) {
            GateDecision::InsufficientData => Ok(InsightsReport::insufficient(
                completed,
                gate.sessions_until_insights(completed),
            )),
            GateDecision::RequiresUpgrade => {
                let samples = self.samples_since_baseline(&query.user_id, now).await?;
                let patterns = PatternClassifier::new(self.thresholds.clone())
                    .classify(&samples, now);
                Ok(InsightsReport::teaser(
                    completed,
                    TeaserSummary::from_patterns(&patterns, completed),
                ))
            }
            GateDecision::Unlocked => {
                let samples = self.samples_covering_trends(&query.user_id, now).await?;
                let patterns = PatternClassifier::new(self.thresholds.clone())
                    .classify(&samples, now);
                let trends = TrendCalculator::new(self.thresholds.clone())
                    .weekly_by_dimension(&samples, now);
                Ok(InsightsReport::unlocked(completed, patterns, trends))
            }
        }
    }

    async fn samples_since_baseline(
        &self,
        user_id: &UserId,
        now: Timestamp,
    ) -> Result<Vec<DimensionScore>, AnalysisError> {
        let since = now.minus_days(self.thresholds.baseline_window_days);
        Ok(self.scores.samples_for_user_since(user_id, since).await?)
    }

    /// Trend buckets reach further back than the baseline window, so the
    /// unlocked report fetches the wider of the two. The classifier
    /// ignores samples outside its own windows.
    async fn samples_covering_trends(
        &self,
        user_id: &UserId,
        now: Timestamp,
    ) -> Result<Vec<DimensionScore>, AnalysisError> {
        let baseline_start = now.minus_days(self.thresholds.baseline_window_days);
        let trend_start = now.minus_weeks(self.thresholds.trend_weeks as i64);
        let since = baseline_start.min(trend_start);
        Ok(self.scores.samples_for_user_since(user_id, since).await?)
    }
}
