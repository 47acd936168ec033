//! Derives normalized dimension scores from judged criterion outcomes.

use crate::domain::catalog::DimensionSpec;

use super::{DimensionScore, ScoreRecord, ScoreValue};

/// Turns one score record into per-dimension scores.
///
/// Each affected dimension starts at 10 and loses a fixed penalty per
/// violated member criterion, floored at 0. Criteria the oracle did not
/// judge contribute nothing either way.
#[derive(Debug, Clone)]
pub struct Grader {
    penalty_per_violation: f64,
}

impl Grader {
    /// Default penalty subtracted per violated criterion.
    pub const DEFAULT_PENALTY: f64 = 2.0;

    pub fn new(penalty_per_violation: f64) -> Self {
        Self {
            penalty_per_violation,
        }
    }

    pub fn penalty_per_violation(&self) -> f64 {
        self.penalty_per_violation
    }

    /// Scores one dimension against the record's judged outcomes.
    pub fn score_dimension(&self, record: &ScoreRecord, dimension: &DimensionSpec) -> ScoreValue {
        let violations = self.violation_count(record, dimension);
        ScoreValue::new(ScoreValue::MAX.value() - self.penalty_per_violation * f64::from(violations))
    }

    /// Derives one DimensionScore per given dimension.
    ///
    /// Callers pass the dimensions whose member criteria intersect the
    /// record's judged set; anything else would score a vacuous 10.
    pub fn grade(&self, record: &ScoreRecord, dimensions: &[&DimensionSpec]) -> Vec<DimensionScore> {
        dimensions
            .iter()
            .map(|dimension| {
                DimensionScore::new(
                    record.user_id().clone(),
                    *record.id(),
                    Some(record.drill_type().clone()),
                    dimension.key.clone(),
                    self.score_dimension(record, dimension),
                )
            })
            .collect()
    }

    fn violation_count(&self, record: &ScoreRecord, dimension: &DimensionSpec) -> u32 {
        dimension
            .criteria
            .iter()
            .filter(|member| {
                record
                    .outcome(&member.key)
                    .is_some_and(|value| value.violates(member.polarity))
            })
            .count() as u32
    }
}

impl Default for Grader {
    fn default() -> Self {
        Self::new(Self::DEFAULT_PENALTY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::catalog::{
        CriterionKey, CriterionValue, DimensionCriterion, DimensionKey, DrillPhase, DrillType,
        ModeKey, Polarity,
    };
    use crate::domain::foundation::{SessionId, UserId};
    use std::collections::BTreeMap;

    fn authority_dimension() -> DimensionSpec {
        DimensionSpec {
            key: DimensionKey::from("authority"),
            label: "Authority".to_string(),
            category: "presence".to_string(),
            description: "Speaking with conviction".to_string(),
            criteria: vec![
                DimensionCriterion {
                    key: CriterionKey::from("hedging"),
                    polarity: Polarity::Negative,
                },
                DimensionCriterion {
                    key: CriterionKey::from("apology"),
                    polarity: Polarity::Negative,
                },
                DimensionCriterion {
                    key: CriterionKey::from("direct_request"),
                    polarity: Polarity::Positive,
                },
            ],
            active: true,
        }
    }

    fn record_with(outcomes: &[(&str, CriterionValue)]) -> ScoreRecord {
        let outcomes: BTreeMap<_, _> = outcomes
            .iter()
            .map(|(key, value)| (CriterionKey::from(*key), *value))
            .collect();
        ScoreRecord::new(
            UserId::new("user-1").unwrap(),
            SessionId::new(),
            ModeKey::from("assertiveness"),
            DrillType::from("direct_ask"),
            DrillPhase::from("Opening Ask"),
            false,
            outcomes,
            "I want the Q3 budget approved by Friday.",
        )
    }

    #[test]
    fn clean_response_scores_ten() {
        let record = record_with(&[
            ("hedging", CriterionValue::Flag(false)),
            ("apology", CriterionValue::Flag(false)),
            ("direct_request", CriterionValue::Flag(true)),
        ]);

        let score = Grader::default().score_dimension(&record, &authority_dimension());
        assert_eq!(score.value(), 10.0);
    }

    #[test]
    fn each_violation_subtracts_the_penalty() {
        // One bad habit present, one required behavior missing.
        let record = record_with(&[
            ("hedging", CriterionValue::Flag(true)),
            ("apology", CriterionValue::Flag(false)),
            ("direct_request", CriterionValue::Flag(false)),
        ]);

        let score = Grader::default().score_dimension(&record, &authority_dimension());
        assert_eq!(score.value(), 6.0);
    }

    #[test]
    fn score_floors_at_zero() {
        let record = record_with(&[
            ("hedging", CriterionValue::Flag(true)),
            ("apology", CriterionValue::Flag(true)),
            ("direct_request", CriterionValue::Flag(false)),
        ]);

        let score = Grader::new(4.0).score_dimension(&record, &authority_dimension());
        assert_eq!(score.value(), 0.0);
    }

    #[test]
    fn absent_criteria_contribute_nothing() {
        // Only hedging was judged; apology and direct_request are absent.
        let record = record_with(&[("hedging", CriterionValue::Flag(false))]);

        let score = Grader::default().score_dimension(&record, &authority_dimension());
        assert_eq!(score.value(), 10.0);
    }

    #[test]
    fn count_criterion_is_one_violation_regardless_of_count() {
        let dimension = DimensionSpec {
            key: DimensionKey::from("clarity"),
            label: "Clarity".to_string(),
            category: "delivery".to_string(),
            description: "Getting to the point".to_string(),
            criteria: vec![DimensionCriterion {
                key: CriterionKey::from("filler_phrases"),
                polarity: Polarity::Negative,
            }],
            active: true,
        };
        let record = record_with(&[("filler_phrases", CriterionValue::Count(7))]);

        let score = Grader::default().score_dimension(&record, &dimension);
        assert_eq!(score.value(), 8.0);
    }

    #[test]
    fn grade_produces_one_score_per_dimension() {
        let authority = authority_dimension();
        let record = record_with(&[
            ("hedging", CriterionValue::Flag(true)),
            ("direct_request", CriterionValue::Flag(true)),
        ]);

        let scores = Grader::default().grade(&record, &[&authority]);

        assert_eq!(scores.len(), 1);
        assert_eq!(scores[0].dimension().as_str(), "authority");
        assert_eq!(scores[0].score().value(), 8.0);
        assert_eq!(scores[0].score_record_id(), record.id());
        assert_eq!(scores[0].drill_type(), Some(&DrillType::from("direct_ask")));
    }
}
