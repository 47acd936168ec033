//! Blind-spot classifier over dimension score history.
//!
//! Pure read-side computation: takes already-committed dimension scores
//! and an explicit evaluation instant, returns one classification per
//! eligible dimension. Nothing here touches a clock or a store.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::catalog::DimensionKey;
use crate::domain::foundation::Timestamp;
use crate::domain::scoring::DimensionScore;

use super::AnalysisThresholds;

/// Classification bucket for one dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternKind {
    /// Failing most recent attempts.
    BlindSpot,
    /// Failure rate rising against the baseline.
    Slipping,
    /// Failure rate falling against the baseline.
    Improving,
    /// No meaningful movement.
    Stable,
    /// Consistently passing.
    Strength,
}

impl PatternKind {
    /// Strength entries ride along in the stable list; everything else
    /// has its own list in the report.
    pub fn is_stable_group(&self) -> bool {
        matches!(self, PatternKind::Stable | PatternKind::Strength)
    }
}

/// One classified dimension with the evidence behind the call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimensionPattern {
    /// Dimension being classified.
    pub dimension: DimensionKey,

    /// Assigned bucket.
    pub kind: PatternKind,

    /// Failure rate over the recent window.
    pub recent_failure_rate: f64,

    /// Failure rate over the baseline window.
    pub baseline_failure_rate: f64,

    /// Samples inside the baseline window.
    pub sample_count: u32,
}

/// Classifies dimensions from score history.
#[derive(Debug, Clone)]
pub struct PatternClassifier {
    thresholds: AnalysisThresholds,
}

impl PatternClassifier {
    pub fn new(thresholds: AnalysisThresholds) -> Self {
        Self { thresholds }
    }

    pub fn thresholds(&self) -> &AnalysisThresholds {
        &self.thresholds
    }

    /// Classifies every dimension with enough samples.
    ///
    /// # Algorithm
    ///
    /// Per dimension, over two nested trailing windows ending at `now`
    /// (recent and baseline), where failure rate is the fraction of
    /// samples below the pass cutoff. First matching rule wins:
    /// 1. blind spot: recent rate >= blind_spot_threshold
    /// 2. slipping: recent rate - baseline rate >= regression_threshold
    /// 3. improving: baseline rate - recent rate >= improvement_threshold
    /// 4. strength: baseline rate <= strength_threshold, else stable
    ///
    /// # Edge Cases
    ///
    /// - Fewer than `minimum_responses` samples in the baseline window:
    ///   dimension excluded from the output entirely
    /// - Empty recent window: recent failure rate is 0, so a dimension
    ///   nobody practiced lately can never be a fresh blind spot
    /// - Samples older than the baseline window: ignored
    ///
    /// Output is ordered by dimension key.
    pub fn classify(&self, samples: &[DimensionScore], now: Timestamp) -> Vec<DimensionPattern> {
        let mut by_dimension: BTreeMap<&DimensionKey, Vec<&DimensionScore>> = BTreeMap::new();
        for sample in samples {
            by_dimension
                .entry(sample.dimension())
                .or_default()
                .push(sample);
        }

        by_dimension
            .into_iter()
            .filter_map(|(dimension, samples)| self.classify_dimension(dimension, &samples, now))
            .collect()
    }

    /// Classifies a single dimension, or None below the sample minimum.
    pub fn classify_dimension(
        &self,
        dimension: &DimensionKey,
        samples: &[&DimensionScore],
        now: Timestamp,
    ) -> Option<DimensionPattern> {
        let baseline_start = now.minus_days(self.thresholds.baseline_window_days);
        let recent_start = now.minus_days(self.thresholds.recent_window_days);

        let baseline: Vec<&DimensionScore> = samples
            .iter()
            .copied()
            .filter(|s| s.created_at().is_after(&baseline_start))
            .collect();

        if (baseline.len() as u32) < self.thresholds.minimum_responses {
            return None;
        }

        let recent: Vec<&DimensionScore> = baseline
            .iter()
            .copied()
            .filter(|s| s.created_at().is_after(&recent_start))
            .collect();

        let baseline_rate = self.failure_rate(&baseline);
        let recent_rate = self.failure_rate(&recent);

        let kind = if recent_rate >= self.thresholds.blind_spot_threshold {
            PatternKind::BlindSpot
        } else if recent_rate - baseline_rate >= self.thresholds.regression_threshold {
            PatternKind::Slipping
        } else if baseline_rate - recent_rate >= self.thresholds.improvement_threshold {
            PatternKind::Improving
        } else if baseline_rate <= self.thresholds.strength_threshold {
            PatternKind::Strength
        } else {
            PatternKind::Stable
        };

        Some(DimensionPattern {
            dimension: dimension.clone(),
            kind,
            recent_failure_rate: recent_rate,
            baseline_failure_rate: baseline_rate,
            sample_count: baseline.len() as u32,
        })
    }

    /// Fraction of samples below the pass cutoff; 0 for an empty window.
    fn failure_rate(&self, samples: &[&DimensionScore]) -> f64 {
        if samples.is_empty() {
            return 0.0;
        }
        let failures = samples
            .iter()
            .filter(|s| s.score().is_failure_at(self.thresholds.pass_cutoff))
            .count();
        failures as f64 / samples.len() as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::catalog::DrillType;
    use crate::domain::foundation::{DimensionScoreId, ScoreRecordId, UserId};
    use crate::domain::scoring::ScoreValue;
    use proptest::prelude::*;

    fn sample(dimension: &str, score: f64, days_ago: i64, now: Timestamp) -> DimensionScore {
        DimensionScore::reconstitute(
            DimensionScoreId::new(),
            UserId::new("user-1").unwrap(),
            ScoreRecordId::new(),
            Some(DrillType::from("direct_ask")),
            DimensionKey::from(dimension),
            ScoreValue::new(score),
            now.minus_days(days_ago),
        )
    }

    fn classifier() -> PatternClassifier {
        PatternClassifier::new(AnalysisThresholds::default())
    }

    // Eligibility Tests

    #[test]
    fn too_few_samples_excludes_dimension() {
        let now = Timestamp::now();
        let samples: Vec<_> = (0..4).map(|_| sample("authority", 2.0, 1, now)).collect();

        let patterns = classifier().classify(&samples, now);
        assert!(patterns.is_empty());
    }

    #[test]
    fn exactly_minimum_samples_classifies() {
        let now = Timestamp::now();
        let samples: Vec<_> = (0..5).map(|_| sample("authority", 2.0, 1, now)).collect();

        let patterns = classifier().classify(&samples, now);
        assert_eq!(patterns.len(), 1);
    }

    #[test]
    fn samples_outside_baseline_window_do_not_count() {
        let now = Timestamp::now();
        // Three in-window samples plus ancient history.
        let mut samples: Vec<_> = (0..3).map(|_| sample("authority", 2.0, 1, now)).collect();
        samples.extend((0..10).map(|_| sample("authority", 2.0, 45, now)));

        let patterns = classifier().classify(&samples, now);
        assert!(patterns.is_empty());
    }

    // Classification Tests

    #[test]
    fn failing_recent_samples_mark_blind_spot() {
        let now = Timestamp::now();
        let samples: Vec<_> = (0..6).map(|_| sample("authority", 3.0, 2, now)).collect();

        let patterns = classifier().classify(&samples, now);
        assert_eq!(patterns[0].kind, PatternKind::BlindSpot);
        assert_eq!(patterns[0].recent_failure_rate, 1.0);
    }

    #[test]
    fn blind_spot_takes_precedence_over_slipping() {
        let now = Timestamp::now();
        // Clean older baseline, then a failing recent stretch: both the
        // blind-spot and slipping rules fire, blind spot wins.
        let mut samples: Vec<_> = (0..6).map(|_| sample("authority", 9.0, 20, now)).collect();
        samples.extend((0..6).map(|_| sample("authority", 2.0, 1, now)));

        let patterns = classifier().classify(&samples, now);
        assert_eq!(patterns[0].kind, PatternKind::BlindSpot);
    }

    #[test]
    fn rising_failure_rate_marks_slipping() {
        let now = Timestamp::now();
        // Baseline: 12 older passes. Recent: 1 fail, 1 pass (rate 0.5).
        // 0.5 recent vs 2/14 baseline rises past the regression threshold
        // while staying under the blind-spot bar.
        let mut samples: Vec<_> = (0..12).map(|_| sample("authority", 8.0, 15, now)).collect();
        samples.push(sample("authority", 3.0, 1, now));
        samples.push(sample("authority", 8.0, 1, now));

        let patterns = classifier().classify(&samples, now);
        assert_eq!(patterns[0].kind, PatternKind::Slipping);
    }

    #[test]
    fn falling_failure_rate_marks_improving() {
        let now = Timestamp::now();
        // Old failures, recent passes.
        let mut samples: Vec<_> = (0..8).map(|_| sample("authority", 2.0, 20, now)).collect();
        samples.extend((0..4).map(|_| sample("authority", 9.0, 1, now)));

        let patterns = classifier().classify(&samples, now);
        assert_eq!(patterns[0].kind, PatternKind::Improving);
    }

    #[test]
    fn flat_moderate_rate_is_stable() {
        let now = Timestamp::now();
        // One failure in four, both windows: 0.25 everywhere.
        let mut samples = Vec::new();
        for days_ago in [1, 10] {
            samples.push(sample("authority", 3.0, days_ago, now));
            samples.extend((0..3).map(|_| sample("authority", 8.0, days_ago, now)));
        }

        let patterns = classifier().classify(&samples, now);
        assert_eq!(patterns[0].kind, PatternKind::Stable);
    }

    #[test]
    fn consistently_passing_is_strength() {
        let now = Timestamp::now();
        let mut samples: Vec<_> = (0..5).map(|_| sample("authority", 9.0, 10, now)).collect();
        samples.extend((0..3).map(|_| sample("authority", 8.0, 1, now)));

        let patterns = classifier().classify(&samples, now);
        assert_eq!(patterns[0].kind, PatternKind::Strength);
        assert!(patterns[0].kind.is_stable_group());
    }

    #[test]
    fn no_recent_practice_never_flags_a_blind_spot() {
        let now = Timestamp::now();
        // All failures, but none in the last 7 days.
        let samples: Vec<_> = (0..8).map(|_| sample("authority", 2.0, 15, now)).collect();

        let patterns = classifier().classify(&samples, now);
        assert_ne!(patterns[0].kind, PatternKind::BlindSpot);
        assert_eq!(patterns[0].recent_failure_rate, 0.0);
    }

    #[test]
    fn score_at_the_cutoff_passes() {
        let now = Timestamp::now();
        let samples: Vec<_> = (0..6).map(|_| sample("authority", 6.0, 1, now)).collect();

        let patterns = classifier().classify(&samples, now);
        assert_eq!(patterns[0].kind, PatternKind::Strength);
        assert_eq!(patterns[0].recent_failure_rate, 0.0);
    }

    #[test]
    fn dimensions_are_classified_independently_and_ordered() {
        let now = Timestamp::now();
        let mut samples: Vec<_> = (0..6).map(|_| sample("clarity", 2.0, 1, now)).collect();
        samples.extend((0..6).map(|_| sample("authority", 9.0, 1, now)));
        // Below minimum, should vanish.
        samples.extend((0..2).map(|_| sample("brevity", 2.0, 1, now)));

        let patterns = classifier().classify(&samples, now);
        assert_eq!(patterns.len(), 2);
        assert_eq!(patterns[0].dimension.as_str(), "authority");
        assert_eq!(patterns[0].kind, PatternKind::Strength);
        assert_eq!(patterns[1].dimension.as_str(), "clarity");
        assert_eq!(patterns[1].kind, PatternKind::BlindSpot);
    }

    // Property Tests

    proptest! {
        /// Lowering the pass cutoff can only shrink the set of failures,
        /// so it must never increase the number of blind spots.
        #[test]
        fn lower_cutoff_never_increases_blind_spots(
            scores in proptest::collection::vec(0.0f64..=10.0, 5..40),
            cutoff_high in 0.0f64..=10.0,
            cutoff_drop in 0.0f64..=10.0,
        ) {
            let cutoff_low = (cutoff_high - cutoff_drop).max(0.0);
            let now = Timestamp::now();
            let samples: Vec<_> = scores
                .iter()
                .map(|&s| sample("authority", s, 1, now))
                .collect();

            let count_at = |cutoff: f64| {
                let thresholds = AnalysisThresholds {
                    pass_cutoff: cutoff,
                    ..AnalysisThresholds::default()
                };
                PatternClassifier::new(thresholds)
                    .classify(&samples, now)
                    .iter()
                    .filter(|p| p.kind == PatternKind::BlindSpot)
                    .count()
            };

            prop_assert!(count_at(cutoff_low) <= count_at(cutoff_high));
        }
    }
}
