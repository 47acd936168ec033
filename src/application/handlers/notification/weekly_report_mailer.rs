//! WeeklyReportMailer - Builds and sends the weekly insights digest.
//!
//! One run sweeps every user with a completed session in the trailing
//! seven days and mails each eligible one their unlocked report. The
//! scheduler invokes `run` once per tick; the send-record claim keyed on
//! the ISO week makes reruns and overlapping runs safe.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::domain::analysis::{
    AccessGate, AnalysisThresholds, GateDecision, InsightsReport, PatternClassifier,
    TrendCalculator,
};
use crate::domain::foundation::{EventEnvelope, EventId, Timestamp, UserId};
use crate::domain::membership::TierLimits;
use crate::domain::notification::{
    AnalysisSnapshot, EmailComposer, EmailKind, EmailSendRecord, EmailSent, NotificationError,
};
use crate::ports::{
    EmailSendStore, EmailSender, EventPublisher, MembershipReader, MembershipView, ScoreStore,
    SendOutcome, SessionReader,
};

/// Summary counts for one weekly run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeeklyRunReport {
    /// Users with a completed session in the trailing week.
    pub candidates: u32,
    /// Reports actually dispatched.
    pub sent: u32,
    /// Candidates skipped by tier, opt-out, gate, or the weekly claim.
    pub skipped: u32,
}

/// Batch mailer for the weekly insights report.
pub struct WeeklyReportMailer {
    memberships: Arc<dyn MembershipReader>,
    sessions: Arc<dyn SessionReader>,
    scores: Arc<dyn ScoreStore>,
    email_store: Arc<dyn EmailSendStore>,
    email_sender: Arc<dyn EmailSender>,
    event_publisher: Arc<dyn EventPublisher>,
    composer: EmailComposer,
    thresholds: AnalysisThresholds,
}

impl WeeklyReportMailer {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        memberships: Arc<dyn MembershipReader>,
        sessions: Arc<dyn SessionReader>,
        scores: Arc<dyn ScoreStore>,
        email_store: Arc<dyn EmailSendStore>,
        email_sender: Arc<dyn EmailSender>,
        event_publisher: Arc<dyn EventPublisher>,
        composer: EmailComposer,
        thresholds: AnalysisThresholds,
    ) -> Self {
        Self {
            memberships,
            sessions,
            scores,
            email_store,
            email_sender,
            event_publisher,
            composer,
            thresholds,
        }
    }

    /// Runs one weekly sweep as of `now`. A failure for one user is
    /// logged and does not stop the run.
    pub async fn run(&self, now: Timestamp) -> Result<WeeklyRunReport, NotificationError> {
        let since = now.minus_days(7);
        let users = self.sessions.users_completed_since(since).await?;
        let (iso_year, iso_week) = now.iso_week();

        let mut sent = 0;
        let mut skipped = 0;
        for user_id in &users {
            match self.process_user(user_id, now, iso_year, iso_week).await {
                Ok(true) => sent += 1,
                Ok(false) => skipped += 1,
                Err(err) => {
                    warn!(
                        user_id = %user_id,
                        error = %err,
                        "Weekly report failed for user, continuing the run"
                    );
                    skipped += 1;
                }
            }
        }

        info!(
            candidates = users.len(),
            sent, skipped, "Weekly report run finished"
        );
        Ok(WeeklyRunReport {
            candidates: users.len() as u32,
            sent,
            skipped,
        })
    }

    /// Returns true when a report was dispatched for this user.
    async fn process_user(
        &self,
        user_id: &UserId,
        now: Timestamp,
        iso_year: i32,
        iso_week: u32,
    ) -> Result<bool, NotificationError> {
        // 1. Tier, opt-out, and address checks.
        let view = self
            .memberships
            .get_by_user(user_id)
            .await?
            .unwrap_or_else(|| MembershipView::free(user_id.clone()));
        let limits = TierLimits::for_tier(view.tier);
        if !limits.weekly_report_enabled {
            return Ok(false);
        }
        if view.weekly_reports_opted_out || !view.can_email() {
            return Ok(false);
        }

        // 2. The report is the unlocked report; a gated user gets nothing.
        let completed = self.sessions.count_completed(user_id).await?;
        let gate = AccessGate::new(self.thresholds.clone());
        if gate.evaluate(completed, view.tier) != GateDecision::Unlocked {
            return Ok(false);
        }

        // 3. Cheap pre-check before running any analysis.
        if self
            .email_store
            .was_sent(user_id, EmailKind::WeeklyReport, iso_year, iso_week)
            .await?
        {
            debug!(user_id = %user_id, "Weekly report already sent this week");
            return Ok(false);
        }

        // 4. Build the unlocked report and its frozen snapshot.
        let baseline_start = now.minus_days(self.thresholds.baseline_window_days);
        let trend_start = now.minus_weeks(self.thresholds.trend_weeks as i64);
        let samples = self
            .scores
            .samples_for_user_since(user_id, baseline_start.min(trend_start))
            .await?;
        let patterns = PatternClassifier::new(self.thresholds.clone()).classify(&samples, now);
        let snapshot = AnalysisSnapshot::from_patterns(&patterns, completed);
        let trends = TrendCalculator::new(self.thresholds.clone()).weekly_by_dimension(&samples, now);
        let report = InsightsReport::unlocked(completed, patterns, trends);

        // 5. Claim the week, then send.
        let message = self.composer.weekly_report(view.email.clone(), &report, now);
        let record = EmailSendRecord::new(
            user_id.clone(),
            EmailKind::WeeklyReport,
            message.subject.clone(),
            snapshot,
            now,
        );
        match self.email_store.record(&record).await? {
            SendOutcome::AlreadySent => {
                debug!(user_id = %user_id, "Lost the weekly claim to a concurrent run");
                return Ok(false);
            }
            SendOutcome::Recorded => {}
        }

        self.email_sender.send(&message).await?;

        let sent = EmailSent {
            event_id: EventId::new(),
            email_record_id: *record.id(),
            user_id: user_id.clone(),
            kind: EmailKind::WeeklyReport,
            iso_year: record.iso_year(),
            iso_week: record.iso_week(),
            sent_at: *record.sent_at(),
        };
        self.event_publisher
            .publish(EventEnvelope::from_event(&sent).with_user_id(user_id.to_string()))
            .await?;

        info!(user_id = %user_id, "Weekly report sent");
        Ok(true)
    }
}
