//! Outbound email types and the idempotency record.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::analysis::{DimensionPattern, PatternKind};
use crate::domain::foundation::{EmailRecordId, Timestamp, UserId};

/// The kinds of email the platform sends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmailKind {
    /// One-time nudge sent when a locked-out user first has findings.
    Teaser,

    /// Recurring digest for paying users.
    WeeklyReport,
}

impl EmailKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EmailKind::Teaser => "teaser",
            EmailKind::WeeklyReport => "weekly_report",
        }
    }
}

impl fmt::Display for EmailKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Aggregate counts frozen at send time.
///
/// Kept on the send record so a support question ("why did I get this?")
/// can be answered without replaying the analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AnalysisSnapshot {
    pub blind_spot_count: u32,
    pub improving_count: u32,
    pub slipping_count: u32,
    pub stable_count: u32,
    pub sessions_completed: u32,
}

impl AnalysisSnapshot {
    pub fn from_patterns(patterns: &[DimensionPattern], sessions_completed: u32) -> Self {
        let count = |kind: PatternKind| {
            patterns.iter().filter(|p| p.kind == kind).count() as u32
        };
        Self {
            blind_spot_count: count(PatternKind::BlindSpot),
            improving_count: count(PatternKind::Improving),
            slipping_count: count(PatternKind::Slipping),
            stable_count: patterns.iter().filter(|p| p.kind.is_stable_group()).count() as u32,
            sessions_completed,
        }
    }

    pub fn has_blind_spots(&self) -> bool {
        self.blind_spot_count > 0
    }
}

/// A fully composed message, ready for the delivery adapter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailMessage {
    /// Recipient address.
    pub to: String,

    /// Subject line.
    pub subject: String,

    /// HTML body.
    pub html_body: String,

    /// Plain-text fallback body.
    pub text_body: String,
}

/// Persisted proof that an email went out.
///
/// At most one record may exist per (user, kind, iso_year, iso_week);
/// the store enforces this and the notification handlers treat a
/// duplicate insert as an already-sent no-op.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmailSendRecord {
    /// Unique identifier for this record.
    id: EmailRecordId,

    /// Recipient user.
    user_id: UserId,

    /// Which email went out.
    kind: EmailKind,

    /// ISO year of the send week.
    iso_year: i32,

    /// ISO week number of the send.
    iso_week: u32,

    /// Subject line as sent.
    subject: String,

    /// Analysis counts that justified the send.
    snapshot: AnalysisSnapshot,

    /// When the send was recorded.
    sent_at: Timestamp,
}

impl EmailSendRecord {
    /// Creates a record for a send happening now; the idempotency week
    /// is derived from `sent_at`.
    pub fn new(
        user_id: UserId,
        kind: EmailKind,
        subject: impl Into<String>,
        snapshot: AnalysisSnapshot,
        sent_at: Timestamp,
    ) -> Self {
        let (iso_year, iso_week) = sent_at.iso_week();
        Self {
            id: EmailRecordId::new(),
            user_id,
            kind,
            iso_year,
            iso_week,
            subject: subject.into(),
            snapshot,
            sent_at,
        }
    }

    /// Reconstitute a record from persistence.
    #[allow(clippy::too_many_arguments)]
    pub fn reconstitute(
        id: EmailRecordId,
        user_id: UserId,
        kind: EmailKind,
        iso_year: i32,
        iso_week: u32,
        subject: String,
        snapshot: AnalysisSnapshot,
        sent_at: Timestamp,
    ) -> Self {
        Self {
            id,
            user_id,
            kind,
            iso_year,
            iso_week,
            subject,
            snapshot,
            sent_at,
        }
    }

    pub fn id(&self) -> &EmailRecordId {
        &self.id
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    pub fn kind(&self) -> EmailKind {
        self.kind
    }

    pub fn iso_year(&self) -> i32 {
        self.iso_year
    }

    pub fn iso_week(&self) -> u32 {
        self.iso_week
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn snapshot(&self) -> &AnalysisSnapshot {
        &self.snapshot
    }

    pub fn sent_at(&self) -> &Timestamp {
        &self.sent_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::catalog::DimensionKey;

    fn pattern(kind: PatternKind) -> DimensionPattern {
        DimensionPattern {
            dimension: DimensionKey::from("authority"),
            kind,
            recent_failure_rate: 0.7,
            baseline_failure_rate: 0.4,
            sample_count: 9,
        }
    }

    #[test]
    fn snapshot_counts_every_bucket() {
        let patterns = vec![
            pattern(PatternKind::BlindSpot),
            pattern(PatternKind::BlindSpot),
            pattern(PatternKind::Improving),
            pattern(PatternKind::Stable),
            pattern(PatternKind::Strength),
        ];

        let snapshot = AnalysisSnapshot::from_patterns(&patterns, 6);

        assert_eq!(snapshot.blind_spot_count, 2);
        assert_eq!(snapshot.improving_count, 1);
        assert_eq!(snapshot.slipping_count, 0);
        assert_eq!(snapshot.stable_count, 2);
        assert_eq!(snapshot.sessions_completed, 6);
        assert!(snapshot.has_blind_spots());
    }

    #[test]
    fn record_derives_iso_week_from_send_instant() {
        let sent_at = Timestamp::now();
        let record = EmailSendRecord::new(
            UserId::new("user-1").unwrap(),
            EmailKind::Teaser,
            "Your first insights are ready",
            AnalysisSnapshot::default(),
            sent_at,
        );

        assert_eq!((record.iso_year(), record.iso_week()), sent_at.iso_week());
        assert_eq!(record.kind(), EmailKind::Teaser);
    }

    #[test]
    fn kind_serializes_snake_case() {
        let json = serde_json::to_string(&EmailKind::WeeklyReport).unwrap();
        assert_eq!(json, "\"weekly_report\"");
        assert_eq!(EmailKind::WeeklyReport.as_str(), "weekly_report");
    }
}
