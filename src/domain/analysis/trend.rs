//! Weekly failure-rate trend over dimension score history.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::catalog::DimensionKey;
use crate::domain::foundation::Timestamp;
use crate::domain::scoring::DimensionScore;

use super::AnalysisThresholds;

/// One ISO-week bucket of the trend.
///
/// `failure_rate` is None when no samples fell in that week; the null is
/// part of the contract, not an omission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendBucket {
    /// ISO year the bucket belongs to (may differ from the calendar year).
    pub iso_year: i32,

    /// ISO week number within the ISO year.
    pub iso_week: u32,

    /// Failure rate for the week, or None with no samples.
    pub failure_rate: Option<f64>,
}

impl TrendBucket {
    /// Week label in ISO 8601 form, e.g. "2026-W34".
    pub fn label(&self) -> String {
        format!("{}-W{:02}", self.iso_year, self.iso_week)
    }
}

/// Computes fixed-length weekly trends.
#[derive(Debug, Clone)]
pub struct TrendCalculator {
    thresholds: AnalysisThresholds,
}

impl TrendCalculator {
    pub fn new(thresholds: AnalysisThresholds) -> Self {
        Self { thresholds }
    }

    /// Returns one bucket per ISO week, trailing from `now`.
    ///
    /// # Algorithm
    ///
    /// Walks `trend_weeks` ISO weeks back from `now` and assigns each
    /// sample to the bucket whose (iso_year, iso_week) matches its
    /// creation instant. The result always has exactly `trend_weeks`
    /// entries, ordered oldest to newest.
    ///
    /// # Edge Cases
    ///
    /// - Weeks without samples: explicit `failure_rate: None`
    /// - Samples older than the window: ignored
    /// - ISO year boundaries: buckets follow the ISO year, so a late
    ///   December sample can land in week 1 of the following ISO year
    pub fn weekly(&self, samples: &[&DimensionScore], now: Timestamp) -> Vec<TrendBucket> {
        let weeks = i64::from(self.thresholds.trend_weeks);
        let mut buckets = Vec::with_capacity(weeks as usize);

        for offset in (0..weeks).rev() {
            let (iso_year, iso_week) = now.minus_weeks(offset).iso_week();
            let in_week: Vec<&&DimensionScore> = samples
                .iter()
                .filter(|s| s.created_at().iso_week() == (iso_year, iso_week))
                .collect();

            let failure_rate = if in_week.is_empty() {
                None
            } else {
                let failures = in_week
                    .iter()
                    .filter(|s| s.score().is_failure_at(self.thresholds.pass_cutoff))
                    .count();
                Some(failures as f64 / in_week.len() as f64)
            };

            buckets.push(TrendBucket {
                iso_year,
                iso_week,
                failure_rate,
            });
        }

        buckets
    }

    /// Weekly trend per dimension, ordered by dimension key.
    pub fn weekly_by_dimension(
        &self,
        samples: &[DimensionScore],
        now: Timestamp,
    ) -> BTreeMap<DimensionKey, Vec<TrendBucket>> {
        let mut by_dimension: BTreeMap<DimensionKey, Vec<&DimensionScore>> = BTreeMap::new();
        for sample in samples {
            by_dimension
                .entry(sample.dimension().clone())
                .or_default()
                .push(sample);
        }

        by_dimension
            .into_iter()
            .map(|(dimension, samples)| (dimension, self.weekly(&samples, now)))
            .collect()
    }
}
