//! Tunable constants for pattern analysis.
//!
//! Loaded once at startup and injected wherever classification runs, so
//! tests can swap them freely.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::ValidationError;

/// Threshold set driving classification, gating, and trend windows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisThresholds {
    /// Recent failure rate at or above this marks a blind spot.
    #[serde(default = "default_blind_spot_threshold")]
    pub blind_spot_threshold: f64,

    /// Baseline-to-recent failure rate drop at or above this marks improvement.
    #[serde(default = "default_improvement_threshold")]
    pub improvement_threshold: f64,

    /// Recent-over-baseline failure rate rise at or above this marks slipping.
    #[serde(default = "default_regression_threshold")]
    pub regression_threshold: f64,

    /// Overall failure rate at or below this marks a strength.
    #[serde(default = "default_strength_threshold")]
    pub strength_threshold: f64,

    /// Dimension samples required before a dimension is classified.
    #[serde(default = "default_minimum_responses")]
    pub minimum_responses: u32,

    /// Completed sessions required before any analysis is available.
    #[serde(default = "default_minimum_sessions")]
    pub minimum_sessions: u32,

    /// Length of the recent window, in days.
    #[serde(default = "default_recent_window_days")]
    pub recent_window_days: i64,

    /// Length of the baseline window, in days.
    #[serde(default = "default_baseline_window_days")]
    pub baseline_window_days: i64,

    /// Number of ISO-week buckets in the historical trend.
    #[serde(default = "default_trend_weeks")]
    pub trend_weeks: u32,

    /// A dimension score below this counts as a failure; at or above passes.
    #[serde(default = "default_pass_cutoff")]
    pub pass_cutoff: f64,
}

fn default_blind_spot_threshold() -> f64 {
    0.6
}
fn default_improvement_threshold() -> f64 {
    0.2
}
fn default_regression_threshold() -> f64 {
    0.15
}
fn default_strength_threshold() -> f64 {
    0.1
}
fn default_minimum_responses() -> u32 {
    5
}
fn default_minimum_sessions() -> u32 {
    5
}
fn default_recent_window_days() -> i64 {
    7
}
fn default_baseline_window_days() -> i64 {
    30
}
fn default_trend_weeks() -> u32 {
    8
}
fn default_pass_cutoff() -> f64 {
    6.0
}

impl AnalysisThresholds {
    /// Returns true once the user has completed enough sessions for analysis.
    pub fn has_enough_sessions(&self, completed_sessions: u32) -> bool {
        completed_sessions >= self.minimum_sessions
    }

    /// Sessions still needed before insights open up, never negative.
    pub fn sessions_until_insights(&self, completed_sessions: u32) -> u32 {
        self.minimum_sessions.saturating_sub(completed_sessions)
    }

    /// Checks internal consistency of the threshold set.
    ///
    /// # Errors
    ///
    /// - `OutOfRange` when a rate is outside [0, 1], the cutoff is outside
    ///   [0, 10], or a window is not positive
    pub fn validate(&self) -> Result<(), ValidationError> {
        for (field, rate) in [
            ("blind_spot_threshold", self.blind_spot_threshold),
            ("improvement_threshold", self.improvement_threshold),
            ("regression_threshold", self.regression_threshold),
            ("strength_threshold", self.strength_threshold),
        ] {
            if !(0.0..=1.0).contains(&rate) {
                return Err(ValidationError::out_of_range(field, 0, 1, rate as i32));
            }
        }
        if !(0.0..=10.0).contains(&self.pass_cutoff) {
            return Err(ValidationError::out_of_range(
                "pass_cutoff",
                0,
                10,
                self.pass_cutoff as i32,
            ));
        }
        if self.recent_window_days <= 0 {
            return Err(ValidationError::out_of_range(
                "recent_window_days",
                1,
                i32::MAX,
                self.recent_window_days as i32,
            ));
        }
        if self.baseline_window_days < self.recent_window_days {
            return Err(ValidationError::out_of_range(
                "baseline_window_days",
                self.recent_window_days as i32,
                i32::MAX,
                self.baseline_window_days as i32,
            ));
        }
        if self.trend_weeks == 0 {
            return Err(ValidationError::out_of_range("trend_weeks", 1, i32::MAX, 0));
        }
        Ok(())
    }
}

impl Default for AnalysisThresholds {
    fn default() -> Self {
        Self {
            blind_spot_threshold: default_blind_spot_threshold(),
            improvement_threshold: default_improvement_threshold(),
            regression_threshold: default_regression_threshold(),
            strength_threshold: default_strength_threshold(),
            minimum_responses: default_minimum_responses(),
            minimum_sessions: default_minimum_sessions(),
            recent_window_days: default_recent_window_days(),
            baseline_window_days: default_baseline_window_days(),
            trend_weeks: default_trend_weeks(),
            pass_cutoff: default_pass_cutoff(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_constants() {
        let t = AnalysisThresholds::default();
        assert_eq!(t.blind_spot_threshold, 0.6);
        assert_eq!(t.improvement_threshold, 0.2);
        assert_eq!(t.regression_threshold, 0.15);
        assert_eq!(t.minimum_responses, 5);
        assert_eq!(t.minimum_sessions, 5);
        assert_eq!(t.recent_window_days, 7);
        assert_eq!(t.baseline_window_days, 30);
        assert_eq!(t.trend_weeks, 8);
        assert_eq!(t.pass_cutoff, 6.0);
    }

    #[test]
    fn sessions_until_insights_never_goes_negative() {
        let t = AnalysisThresholds::default();
        assert_eq!(t.sessions_until_insights(0), 5);
        assert_eq!(t.sessions_until_insights(4), 1);
        assert_eq!(t.sessions_until_insights(5), 0);
        assert_eq!(t.sessions_until_insights(20), 0);
    }

    #[test]
    fn enough_sessions_boundary() {
        let t = AnalysisThresholds::default();
        assert!(!t.has_enough_sessions(4));
        assert!(t.has_enough_sessions(5));
    }

    #[test]
    fn default_thresholds_validate() {
        assert!(AnalysisThresholds::default().validate().is_ok());
    }

    #[test]
    fn validate_rejects_rate_above_one() {
        let t = AnalysisThresholds {
            blind_spot_threshold: 1.5,
            ..AnalysisThresholds::default()
        };
        assert!(t.validate().is_err());
    }

    #[test]
    fn validate_rejects_baseline_shorter_than_recent() {
        let t = AnalysisThresholds {
            recent_window_days: 14,
            baseline_window_days: 7,
            ..AnalysisThresholds::default()
        };
        assert!(t.validate().is_err());
    }

    #[test]
    fn partial_yaml_fills_defaults() {
        let t: AnalysisThresholds = serde_yaml::from_str("blind_spot_threshold: 0.5\n").unwrap();
        assert_eq!(t.blind_spot_threshold, 0.5);
        assert_eq!(t.minimum_sessions, 5);
        assert_eq!(t.pass_cutoff, 6.0);
    }
}
