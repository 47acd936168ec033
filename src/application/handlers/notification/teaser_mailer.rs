//! TeaserMailer - Sends the one-time insight teaser email.
//!
//! Subscribes to `session.completed.v1`. When a user on a tier below the
//! insights unlock lands exactly on the minimum session count and the
//! analysis finds at least one blind spot, they get a single anonymized
//! teaser. The send-record claim makes the email at-most-once per ISO
//! week even when completion events race or are redelivered.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::domain::analysis::{AnalysisThresholds, PatternClassifier};
use crate::domain::foundation::{DomainError, ErrorCode, EventEnvelope, EventId, Timestamp, UserId};
use crate::domain::notification::{
    AnalysisSnapshot, EmailComposer, EmailKind, EmailSendRecord, EmailSent,
};
use crate::domain::session::SessionCompleted;
use crate::ports::{
    EmailSendStore, EmailSender, EventHandler, EventPublisher, MembershipReader, MembershipView,
    ScoreStore, SendOutcome, SessionReader,
};

/// Event handler that mails the insight teaser after the qualifying
/// session completion.
pub struct TeaserMailer {
    memberships: Arc<dyn MembershipReader>,
    sessions: Arc<dyn SessionReader>,
    scores: Arc<dyn ScoreStore>,
    email_store: Arc<dyn EmailSendStore>,
    email_sender: Arc<dyn EmailSender>,
    event_publisher: Arc<dyn EventPublisher>,
    composer: EmailComposer,
    thresholds: AnalysisThresholds,
}

impl TeaserMailer {
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

    async fn process(
        &self,
        event: &EventEnvelope,
        payload: SessionCompleted,
    ) -> Result<(), DomainError> {
        let user_id = payload.user_id;

        // 1. Teasers target tiers below the insights unlock, and need an
        //    address to land on.
        let view = self
            .memberships
            .get_by_user(&user_id)
            .await?
            .unwrap_or_else(|| MembershipView::free(user_id.clone()));
        if view.tier.unlocks_insights() {
            debug!(user_id = %user_id, "Tier already unlocks insights, no teaser");
            return Ok(());
        }
        if !view.can_email() {
            debug!(user_id = %user_id, "No email address on file, skipping teaser");
            return Ok(());
        }

        // 2. Fire only when the count lands exactly on the minimum, so a
        //    user is teased once per crossing, not on every completion.
        let completed = self.sessions.count_completed(&user_id).await?;
        if completed != self.thresholds.minimum_sessions {
            debug!(
                user_id = %user_id,
                completed,
                "Session count is not at the teaser point"
            );
            return Ok(());
        }

        // 3. Without a blind spot there is nothing to tease.
        let snapshot = self
            .snapshot_for(&user_id, payload.completed_at, completed)
            .await?;
        if !snapshot.has_blind_spots() {
            debug!(user_id = %user_id, "No blind spots found, no teaser");
            return Ok(());
        }

        // 4. Claim the weekly send before dispatching. The claim, not the
        //    send, is what makes the teaser at-most-once per week.
        let message = self.composer.teaser(view.email.clone(), &snapshot);
        let record = EmailSendRecord::new(
            user_id.clone(),
            EmailKind::Teaser,
            message.subject.clone(),
            snapshot,
            payload.completed_at,
        );
        match self.email_store.record(&record).await? {
            SendOutcome::AlreadySent => {
                debug!(user_id = %user_id, "Teaser already claimed for this week");
                return Ok(());
            }
            SendOutcome::Recorded => {}
        }

        // 5. A dispatch failure after the claim drops the send; the claim
        //    stays so a redelivery cannot double-send.
        if let Err(err) = self.email_sender.send(&message).await {
            warn!(
                user_id = %user_id,
                error = %err,
                "Teaser dispatch failed after claim, dropping send"
            );
            return Ok(());
        }

        let sent = EmailSent {
            event_id: EventId::new(),
            email_record_id: *record.id(),
            user_id: user_id.clone(),
            kind: EmailKind::Teaser,
            iso_year: record.iso_year(),
            iso_week: record.iso_week(),
            sent_at: *record.sent_at(),
        };
        self.event_publisher
            .publish(
                EventEnvelope::from_event(&sent)
                    .with_causation_id(event.event_id.as_str())
                    .with_user_id(user_id.to_string()),
            )
            .await?;

        info!(user_id = %user_id, "Insight teaser sent");
        Ok(())
    }

    /// Classifies the user's baseline window as of the completion instant.
    async fn snapshot_for(
        &self,
        user_id: &UserId,
        completed_at: Timestamp,
        sessions_completed: u32,
    ) -> Result<AnalysisSnapshot, DomainError> {
        let since = completed_at.minus_days(self.thresholds.baseline_window_days);
        let samples = self.scores.samples_for_user_since(user_id, since).await?;
        let patterns =
            PatternClassifier::new(self.thresholds.clone()).classify(&samples, completed_at);
        Ok(AnalysisSnapshot::from_patterns(&patterns, sessions_completed))
    }
}

#[async_trait]
impl EventHandler for TeaserMailer {
    async fn handle(&self, event: EventEnvelope) -> Result<(), DomainError> {
        let payload: SessionCompleted = event.payload_as().map_err(|e| {
            DomainError::new(
                ErrorCode::ValidationFailed,
                format!("Malformed session.completed payload: {}", e),
            )
        })?;

        self.process(&event, payload).await
    }

    fn name(&self) -> &'static str {
        "TeaserMailer"
    }
}
