//! Typed cards presented to the user during a session.

use serde::{Deserialize, Serialize};

/// One card in the session flow.
///
/// The variant set is closed so the progression state machine can match
/// exhaustively on what a card demands from the user next.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Card {
    /// Presents a drill situation and expects a free-text answer.
    Scenario {
        text: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        word_limit: Option<u32>,
        #[serde(skip_serializing_if = "Option::is_none")]
        timer_seconds: Option<u32>,
    },

    /// Oracle follow-up asking for another free-text answer.
    Prompt { text: String },

    /// Expects a selection from fixed choices.
    MultipleChoice { text: String, choices: Vec<String> },

    /// Oracle feedback on the previous answer.
    Feedback { text: String },

    /// One-time teaching card shown before a drill's first encounter.
    Insight { drill_key: String, text: String },

    /// Closing reflection, never scored.
    Reflection { text: String },

    /// The user's level in this mode advanced.
    LevelUp { level: u32, message: String },

    /// The user is already at the mode's top level.
    LevelCap { level: u32, message: String },
}

impl Card {
    /// Returns the stable kind string used for storage and routing.
    pub fn kind(&self) -> &'static str {
        match self {
            Card::Scenario { .. } => "scenario",
            Card::Prompt { .. } => "prompt",
            Card::MultipleChoice { .. } => "multiple_choice",
            Card::Feedback { .. } => "feedback",
            Card::Insight { .. } => "insight",
            Card::Reflection { .. } => "reflection",
            Card::LevelUp { .. } => "level_up",
            Card::LevelCap { .. } => "level_cap",
        }
    }

    /// Returns true if this card expects an answer rather than a continue.
    pub fn expects_response(&self) -> bool {
        matches!(
            self,
            Card::Scenario { .. } | Card::Prompt { .. } | Card::MultipleChoice { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn response_cards_expect_a_response() {
        let scenario = Card::Scenario {
            text: "Ask for the project.".to_string(),
            word_limit: Some(60),
            timer_seconds: None,
        };
        let prompt = Card::Prompt {
            text: "Try that again without the softeners.".to_string(),
        };
        let choice = Card::MultipleChoice {
            text: "Pick one.".to_string(),
            choices: vec!["A".to_string(), "B".to_string()],
        };

        assert!(scenario.expects_response());
        assert!(prompt.expects_response());
        assert!(choice.expects_response());
    }

    #[test]
    fn informational_cards_expect_continue() {
        let cards = [
            Card::Feedback {
                text: "Direct and short. Good.".to_string(),
            },
            Card::Insight {
                drill_key: "ask_bigger".to_string(),
                text: "Name the thing and stop.".to_string(),
            },
            Card::Reflection {
                text: "What felt different this time?".to_string(),
            },
            Card::LevelUp {
                level: 2,
                message: "Level 2 unlocked.".to_string(),
            },
            Card::LevelCap {
                level: 5,
                message: "You are at the top level.".to_string(),
            },
        ];

        for card in cards {
            assert!(!card.expects_response(), "{} should not", card.kind());
        }
    }

    #[test]
    fn card_serializes_with_type_tag() {
        let card = Card::Feedback {
            text: "Good.".to_string(),
        };
        let json = serde_json::to_value(&card).unwrap();
        assert_eq!(json["type"], "feedback");
        assert_eq!(json["text"], "Good.");
    }

    #[test]
    fn scenario_omits_absent_limits() {
        let card = Card::Scenario {
            text: "Go.".to_string(),
            word_limit: None,
            timer_seconds: None,
        };
        let json = serde_json::to_string(&card).unwrap();
        assert!(!json.contains("word_limit"));
        assert!(!json.contains("timer_seconds"));
    }

    #[test]
    fn card_round_trips_through_json() {
        let card = Card::MultipleChoice {
            text: "Pick the response you would send.".to_string(),
            choices: vec!["No, but I can swap.".to_string(), "I guess...".to_string()],
        };
        let json = serde_json::to_string(&card).unwrap();
        let restored: Card = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, card);
    }
}
