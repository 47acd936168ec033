//! Card assembly shared by the session command handlers.

use crate::domain::catalog::{DrillPhase, DrillSpec, InputKind};
use crate::domain::session::Card;

/// Feedback shown when the coaching oracle is unavailable. The session
/// must keep moving even without real feedback.
pub(crate) const DEGRADED_FEEDBACK: &str =
    "Your response has been recorded. Detailed feedback is unavailable right now; tap continue to keep going.";

/// Builds the scenario card for a drill, honoring its input kind.
pub(crate) fn scenario_card(drill: &DrillSpec) -> Card {
    match drill.input {
        InputKind::MultipleChoice => Card::MultipleChoice {
            text: drill.scenario.clone(),
            choices: drill.choices.clone(),
        },
        InputKind::Text => Card::Scenario {
            text: drill.scenario.clone(),
            word_limit: drill.word_limit,
            timer_seconds: drill.timer_seconds,
        },
    }
}

/// Builds the card shown on arrival at a drill: the one-time insight when
/// the user has never seen it, otherwise the scenario itself.
pub(crate) fn opening_card(drill: &DrillSpec, insight_seen: bool) -> (Card, DrillPhase) {
    let card = match &drill.insight {
        Some(text) if !insight_seen => Card::Insight {
            drill_key: drill.key.clone(),
            text: text.clone(),
        },
        _ => scenario_card(drill),
    };
    (card, drill.phase.clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_drill(insight: Option<&str>) -> DrillSpec {
        DrillSpec {
            key: "everyday-easy".to_string(),
            position: 0,
            drill_type: DrillType::from("Direct Request"),
            phase: DrillPhase::from("Drill 1"),
            dimensions: vec![],
            input: InputKind::Text,
            scenario: "A coworker asks you to cover a shift.".to_string(),
            insight: insight.map(|s| s.to_string()),
            choices: vec![],
            word_limit: Some(50),
            timer_seconds: None,
        }
    }

    use crate::domain::catalog::DrillType;

    #[test]
    fn scenario_card_carries_constraints_for_text_drills() {
        let drill = text_drill(None);
        match scenario_card(&drill) {
            Card::Scenario {
                word_limit,
                timer_seconds,
                ..
            } => {
                assert_eq!(word_limit, Some(50));
                assert_eq!(timer_seconds, None);
            }
            other => panic!("expected scenario card, got {:?}", other.kind()),
        }
    }

    #[test]
    fn scenario_card_builds_choice_card_for_choice_drills() {
        let mut drill = text_drill(None);
        drill.input = InputKind::MultipleChoice;
        drill.choices = vec!["Say yes".to_string(), "Decline directly".to_string()];
        match scenario_card(&drill) {
            Card::MultipleChoice { choices, .. } => assert_eq!(choices.len(), 2),
            other => panic!("expected multiple choice card, got {:?}", other.kind()),
        }
    }

    #[test]
    fn opening_card_prefers_unseen_insight() {
        let drill = text_drill(Some("Most people over-apologize."));
        let (card, _) = opening_card(&drill, false);
        match card {
            Card::Insight { drill_key, .. } => assert_eq!(drill_key, "everyday-easy"),
            other => panic!("expected insight card, got {:?}", other.kind()),
        }
    }

    #[test]
    fn opening_card_skips_seen_insight() {
        let drill = text_drill(Some("Most people over-apologize."));
        let (card, _) = opening_card(&drill, true);
        assert!(matches!(card, Card::Scenario { .. }));
    }

    #[test]
    fn opening_card_without_insight_shows_scenario() {
        let drill = text_drill(None);
        let (card, phase) = opening_card(&drill, false);
        assert!(matches!(card, Card::Scenario { .. }));
        assert_eq!(phase.as_str(), "Drill 1");
    }
}
