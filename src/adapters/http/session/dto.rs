//! HTTP DTOs for session and progress endpoints.
//!
//! These types decouple the HTTP API from domain types, allowing independent evolution.

use serde::{Deserialize, Serialize};

use crate::application::handlers::session::{
    ContinueSessionResult, ProgressView, StartSessionResult, SubmitResponseResult,
};
use crate::domain::session::{Card, LevelChange, SessionStatus};

// ════════════════════════════════════════════════════════════════════════════
// Request DTOs
// ════════════════════════════════════════════════════════════════════════════

/// Request to start (or resume) a practice session.
#[derive(Debug, Clone, Deserialize)]
pub struct StartSessionRequest {
    pub mode: String,
}

/// Request body for answering the card a session is waiting on.
///
/// Exactly one of `text` or `choice` must be set; the handler rejects
/// anything else before it reaches the domain.
#[derive(Debug, Clone, Deserialize)]
pub struct RespondRequest {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub choice: Option<u32>,
}

// ════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════

/// Response for a started or resumed session.
#[derive(Debug, Clone, Serialize)]
pub struct StartSessionResponse {
    pub session_id: String,
    pub mode: String,
    pub level: u32,
    pub status: SessionStatus,
    pub awaiting: String,
    pub resumed: bool,
    pub card: Card,
}

impl From<StartSessionResult> for StartSessionResponse {
    fn from(result: StartSessionResult) -> Self {
        Self {
            session_id: result.session.id().to_string(),
            mode: result.session.mode().to_string(),
            level: result.level,
            status: result.session.status(),
            awaiting: result.session.awaiting().as_str().to_string(),
            resumed: result.resumed,
            card: result.card,
        }
    }
}

/// Response after the user answers a card.
#[derive(Debug, Clone, Serialize)]
pub struct RespondResponse {
    pub session_id: String,
    pub status: SessionStatus,
    pub awaiting: String,
    pub exchange_count: u32,
    pub cards: Vec<Card>,
}

impl From<SubmitResponseResult> for RespondResponse {
    fn from(result: SubmitResponseResult) -> Self {
        Self {
            session_id: result.session.id().to_string(),
            status: result.session.status(),
            awaiting: result.session.awaiting().as_str().to_string(),
            exchange_count: result.session.exchange_count(),
            cards: result.cards,
        }
    }
}

/// Response after acknowledging an informational card.
#[derive(Debug, Clone, Serialize)]
pub struct ContinueResponse {
    pub session_id: String,
    pub status: SessionStatus,
    pub awaiting: String,
    pub completed: bool,
    pub cards: Vec<Card>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level_change: Option<LevelChangeResponse>,
}

impl From<ContinueSessionResult> for ContinueResponse {
    fn from(result: ContinueSessionResult) -> Self {
        Self {
            session_id: result.session.id().to_string(),
            status: result.session.status(),
            awaiting: result.session.awaiting().as_str().to_string(),
            completed: result.session.status() == SessionStatus::Completed,
            cards: result.cards,
            level_change: result.level_change.map(Into::into),
        }
    }
}

/// A level boundary crossed while completing a session.
#[derive(Debug, Clone, Serialize)]
pub struct LevelChangeResponse {
    pub kind: String,
    pub level: u32,
}

impl From<LevelChange> for LevelChangeResponse {
    fn from(change: LevelChange) -> Self {
        match change {
            LevelChange::Advanced { new_level } => Self {
                kind: "advanced".to_string(),
                level: new_level,
            },
            LevelChange::Capped { level } => Self {
                kind: "capped".to_string(),
                level,
            },
        }
    }
}

/// A user's standing in one practice mode.
#[derive(Debug, Clone, Serialize)]
pub struct ProgressResponse {
    pub mode: String,
    pub level: u32,
    pub max_level: u32,
    pub exchanges_at_level: u32,
    pub next_level_threshold: Option<u32>,
    pub sessions_completed: u32,
    pub drills_completed: u32,
    pub exchanges_recorded: u32,
}

impl From<ProgressView> for ProgressResponse {
    fn from(view: ProgressView) -> Self {
        Self {
            mode: view.mode.to_string(),
            level: view.level,
            max_level: view.max_level,
            exchanges_at_level: view.exchanges_at_level,
            next_level_threshold: view.next_level_threshold,
            sessions_completed: view.sessions_completed,
            drills_completed: view.drills_completed,
            exchanges_recorded: view.exchanges_recorded,
        }
    }
}

/// Standard error response.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorResponse {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    /// Builder: attach structured details to the error.
    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new("BAD_REQUEST", message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{SessionId, UserId};
    use crate::domain::session::Session;

    fn started_result() -> StartSessionResult {
        let mut session = Session::start(
            SessionId::new(),
            UserId::new("user-123").unwrap(),
            "assertiveness".into(),
            2,
        );
        let card = Card::Scenario {
            text: "Ask for the project.".to_string(),
            word_limit: Some(60),
            timer_seconds: None,
        };
        session.present_card(&card).unwrap();
        StartSessionResult {
            session,
            card,
            level: 2,
            resumed: false,
        }
    }

    #[test]
    fn start_session_request_deserializes() {
        let json = r#"{"mode": "assertiveness"}"#;
        let req: StartSessionRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.mode, "assertiveness");
    }

    #[test]
    fn respond_request_accepts_text_only() {
        let json = r#"{"text": "I want the lead on this."}"#;
        let req: RespondRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.text.as_deref(), Some("I want the lead on this."));
        assert!(req.choice.is_none());
    }

    #[test]
    fn respond_request_accepts_choice_only() {
        let json = r#"{"choice": 1}"#;
        let req: RespondRequest = serde_json::from_str(json).unwrap();
        assert!(req.text.is_none());
        assert_eq!(req.choice, Some(1));
    }

    #[test]
    fn start_session_response_conversion() {
        let response: StartSessionResponse = started_result().into();
        assert_eq!(response.mode, "assertiveness");
        assert_eq!(response.level, 2);
        assert_eq!(response.status, SessionStatus::Active);
        assert_eq!(response.awaiting, "response");
        assert!(!response.resumed);
    }

    #[test]
    fn level_change_advanced_conversion() {
        let response: LevelChangeResponse = LevelChange::Advanced { new_level: 3 }.into();
        assert_eq!(response.kind, "advanced");
        assert_eq!(response.level, 3);
    }

    #[test]
    fn level_change_capped_conversion() {
        let response: LevelChangeResponse = LevelChange::Capped { level: 5 }.into();
        assert_eq!(response.kind, "capped");
        assert_eq!(response.level, 5);
    }

    #[test]
    fn error_response_serializes_without_empty_details() {
        let error = ErrorResponse::new("SESSION_NOT_FOUND", "Session not found");
        let json = serde_json::to_value(&error).unwrap();
        assert_eq!(json["code"], "SESSION_NOT_FOUND");
        assert!(json.get("details").is_none());
    }

    #[test]
    fn error_response_carries_details_when_set() {
        let error = ErrorResponse::new("LIMIT_REACHED", "Exchange budget exhausted")
            .with_details(serde_json::json!({ "used": 30, "budget": 30 }));
        let json = serde_json::to_value(&error).unwrap();
        assert_eq!(json["details"]["budget"], 30);
    }

    #[test]
    fn card_serializes_with_kind_tag() {
        let card = Card::Feedback {
            text: "Direct and short. Good.".to_string(),
        };
        let json = serde_json::to_value(&card).unwrap();
        assert_eq!(json["type"], "feedback");
    }
}
