//! Assembled insights report, shaped by the access gate.
//!
//! The report is the single read model the insights surface returns.
//! What it carries depends on the gate decision: locked-out users get
//! aggregate counts at most, never which dimensions are weak.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::catalog::DimensionKey;

use super::{DimensionPattern, GateDecision, PatternKind, TrendBucket};

/// Aggregate-only view for users whose tier does not unlock insights.
///
/// Deliberately omits dimension identities. The counts exist to tell a
/// free user something is there, not what it is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeaserSummary {
    /// Number of dimensions currently classified as blind spots.
    pub blind_spot_count: u32,

    /// Whether any dimension is improving.
    pub has_improving: bool,

    /// Whether any dimension is slipping.
    pub has_regressing: bool,

    /// Completed sessions across all modes.
    pub sessions_completed: u32,
}

impl TeaserSummary {
    /// Collapses full classifications into their aggregate shadow.
    pub fn from_patterns(patterns: &[DimensionPattern], sessions_completed: u32) -> Self {
        Self {
            blind_spot_count: patterns
                .iter()
                .filter(|p| p.kind == PatternKind::BlindSpot)
                .count() as u32,
            has_improving: patterns.iter().any(|p| p.kind == PatternKind::Improving),
            has_regressing: patterns.iter().any(|p| p.kind == PatternKind::Slipping),
            sessions_completed,
        }
    }

    pub fn has_any_signal(&self) -> bool {
        self.blind_spot_count > 0 || self.has_improving || self.has_regressing
    }
}

/// The insights read model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsightsReport {
    /// Gate decision this report was shaped by.
    pub gate: GateDecision,

    /// Completed sessions across all modes.
    pub sessions_completed: u32,

    /// Sessions still needed before analysis is meaningful. Zero once
    /// the minimum is met.
    pub sessions_until_insights: u32,

    /// Dimensions classified as blind spots. Unlocked only.
    pub blind_spots: Option<Vec<DimensionPattern>>,

    /// Dimensions improving against their baseline. Unlocked only.
    pub improving: Option<Vec<DimensionPattern>>,

    /// Dimensions slipping against their baseline. Unlocked only.
    pub slipping: Option<Vec<DimensionPattern>>,

    /// Stable and strength dimensions. Unlocked only.
    pub stable: Option<Vec<DimensionPattern>>,

    /// Weekly failure-rate trend per dimension. Unlocked only.
    pub trends: Option<BTreeMap<DimensionKey, Vec<TrendBucket>>>,

    /// Aggregate counts for locked-out users. Present only when the
    /// gate says RequiresUpgrade.
    pub teaser: Option<TeaserSummary>,
}

impl InsightsReport {
    /// Report for a user below the session minimum.
    pub fn insufficient(sessions_completed: u32, sessions_until_insights: u32) -> Self {
        Self {
            gate: GateDecision::InsufficientData,
            sessions_completed,
            sessions_until_insights,
            blind_spots: None,
            improving: None,
            slipping: None,
            stable: None,
            trends: None,
            teaser: None,
        }
    }

    /// Report for a user with enough data but no unlocking tier.
    pub fn teaser(sessions_completed: u32, summary: TeaserSummary) -> Self {
        Self {
            gate: GateDecision::RequiresUpgrade,
            sessions_completed,
            sessions_until_insights: 0,
            blind_spots: None,
            improving: None,
            slipping: None,
            stable: None,
            trends: None,
            teaser: Some(summary),
        }
    }

    /// Full report for an unlocked user.
    pub fn unlocked(
        sessions_completed: u32,
        patterns: Vec<DimensionPattern>,
        trends: BTreeMap<DimensionKey, Vec<TrendBucket>>,
    ) -> Self {
        let mut blind_spots = Vec::new();
        let mut improving = Vec::new();
        let mut slipping = Vec::new();
        let mut stable = Vec::new();

        for pattern in patterns {
            match pattern.kind {
                PatternKind::BlindSpot => blind_spots.push(pattern),
                PatternKind::Improving => improving.push(pattern),
                PatternKind::Slipping => slipping.push(pattern),
                PatternKind::Stable | PatternKind::Strength => stable.push(pattern),
            }
        }

        Self {
            gate: GateDecision::Unlocked,
            sessions_completed,
            sessions_until_insights: 0,
            blind_spots: Some(blind_spots),
            improving: Some(improving),
            slipping: Some(slipping),
            stable: Some(stable),
            trends: Some(trends),
            teaser: None,
        }
    }

    pub fn is_unlocked(&self) -> bool {
        self.gate.is_unlocked()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pattern(dimension: &str, kind: PatternKind) -> DimensionPattern {
        DimensionPattern {
            dimension: DimensionKey::from(dimension),
            kind,
            recent_failure_rate: 0.5,
            baseline_failure_rate: 0.3,
            sample_count: 10,
        }
    }

    #[test]
    fn teaser_summary_counts_without_naming() {
        let patterns = vec![
            pattern("authority", PatternKind::BlindSpot),
            pattern("clarity", PatternKind::BlindSpot),
            pattern("empathy", PatternKind::Improving),
            pattern("brevity", PatternKind::Stable),
        ];

        let summary = TeaserSummary::from_patterns(&patterns, 7);

        assert_eq!(summary.blind_spot_count, 2);
        assert!(summary.has_improving);
        assert!(!summary.has_regressing);
        assert_eq!(summary.sessions_completed, 7);

        let json = serde_json::to_string(&summary).unwrap();
        assert!(!json.contains("authority"));
        assert!(!json.contains("clarity"));
    }

    #[test]
    fn teaser_signal_requires_some_movement() {
        let quiet = TeaserSummary::from_patterns(&[pattern("brevity", PatternKind::Stable)], 5);
        assert!(!quiet.has_any_signal());

        let loud = TeaserSummary::from_patterns(&[pattern("authority", PatternKind::BlindSpot)], 5);
        assert!(loud.has_any_signal());
    }

    #[test]
    fn insufficient_report_carries_only_the_countdown() {
        let report = InsightsReport::insufficient(2, 3);

        assert_eq!(report.gate, GateDecision::InsufficientData);
        assert_eq!(report.sessions_until_insights, 3);
        assert!(report.blind_spots.is_none());
        assert!(report.teaser.is_none());
        assert!(report.trends.is_none());
    }

    #[test]
    fn teaser_report_hides_pattern_lists() {
        let summary = TeaserSummary::from_patterns(&[pattern("authority", PatternKind::BlindSpot)], 6);
        let report = InsightsReport::teaser(6, summary);

        assert_eq!(report.gate, GateDecision::RequiresUpgrade);
        assert!(report.blind_spots.is_none());
        assert!(report.trends.is_none());
        assert_eq!(report.teaser.as_ref().map(|t| t.blind_spot_count), Some(1));
    }

    #[test]
    fn unlocked_report_splits_patterns_by_kind() {
        let patterns = vec![
            pattern("authority", PatternKind::BlindSpot),
            pattern("brevity", PatternKind::Strength),
            pattern("clarity", PatternKind::Slipping),
            pattern("empathy", PatternKind::Improving),
            pattern("timing", PatternKind::Stable),
        ];

        let report = InsightsReport::unlocked(12, patterns, BTreeMap::new());

        assert!(report.is_unlocked());
        assert_eq!(report.blind_spots.as_ref().map(Vec::len), Some(1));
        assert_eq!(report.improving.as_ref().map(Vec::len), Some(1));
        assert_eq!(report.slipping.as_ref().map(Vec::len), Some(1));
        assert_eq!(report.stable.as_ref().map(Vec::len), Some(2));
        assert!(report.teaser.is_none());
    }

    #[test]
    fn unlocked_report_with_no_patterns_has_empty_lists() {
        let report = InsightsReport::unlocked(9, Vec::new(), BTreeMap::new());

        assert_eq!(report.blind_spots.as_ref().map(Vec::len), Some(0));
        assert_eq!(report.stable.as_ref().map(Vec::len), Some(0));
    }
}
