//! Append-only exchange log entries.

use serde::{Deserialize, Serialize};

use super::Card;
use crate::domain::catalog::DrillPhase;
use crate::domain::foundation::{ExchangeId, SessionId, Timestamp, UserId};

/// Who produced a log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    System,
    User,
}

impl Role {
    /// Returns the stable string used for storage.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
        }
    }
}

/// A user's answer to a response card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum UserResponse {
    /// Free-text answer.
    Text { text: String },
    /// Selection from a multiple-choice card.
    Choice { index: u32, text: String },
}

impl UserResponse {
    /// Returns the response text (the chosen option's text for choices).
    pub fn text(&self) -> &str {
        match self {
            UserResponse::Text { text } => text,
            UserResponse::Choice { text, .. } => text,
        }
    }

    /// Whitespace-separated word count of the response text.
    pub fn word_count(&self) -> u32 {
        self.text().split_whitespace().count() as u32
    }
}

/// Payload of one exchange log entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ExchangePayload {
    Card(Card),
    Response(UserResponse),
}

/// One entry in a session's append-only message log.
///
/// `user_id` is denormalized from the session so cross-session queries
/// (daily exchange budgets, insight-seen checks) stay single-table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExchangeRecord {
    id: ExchangeId,
    session_id: SessionId,
    user_id: UserId,
    sequence: u32,
    role: Role,
    payload: ExchangePayload,
    drill_phase: Option<DrillPhase>,
    created_at: Timestamp,
}

impl ExchangeRecord {
    /// Creates a system entry carrying a card.
    pub fn card(
        session_id: SessionId,
        user_id: UserId,
        sequence: u32,
        card: Card,
        drill_phase: Option<DrillPhase>,
    ) -> Self {
        Self {
            id: ExchangeId::new(),
            session_id,
            user_id,
            sequence,
            role: Role::System,
            payload: ExchangePayload::Card(card),
            drill_phase,
            created_at: Timestamp::now(),
        }
    }

    /// Creates a user entry carrying an answer.
    ///
    /// The phase tag is copied from the card being answered so the scoring
    /// pipeline can resolve the rubric from the log alone.
    pub fn response(
        session_id: SessionId,
        user_id: UserId,
        sequence: u32,
        response: UserResponse,
        drill_phase: Option<DrillPhase>,
    ) -> Self {
        Self {
            id: ExchangeId::new(),
            session_id,
            user_id,
            sequence,
            role: Role::User,
            payload: ExchangePayload::Response(response),
            drill_phase,
            created_at: Timestamp::now(),
        }
    }

    /// Reconstitute a record from persistence.
    #[allow(clippy::too_many_arguments)]
    pub fn reconstitute(
        id: ExchangeId,
        session_id: SessionId,
        user_id: UserId,
        sequence: u32,
        role: Role,
        payload: ExchangePayload,
        drill_phase: Option<DrillPhase>,
        created_at: Timestamp,
    ) -> Self {
        Self {
            id,
            session_id,
            user_id,
            sequence,
            role,
            payload,
            drill_phase,
            created_at,
        }
    }

    pub fn id(&self) -> &ExchangeId {
        &self.id
    }

    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    pub fn sequence(&self) -> u32 {
        self.sequence
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn payload(&self) -> &ExchangePayload {
        &self.payload
    }

    pub fn drill_phase(&self) -> Option<&DrillPhase> {
        self.drill_phase.as_ref()
    }

    pub fn created_at(&self) -> &Timestamp {
        &self.created_at
    }

    /// Returns the card payload for system entries.
    pub fn as_card(&self) -> Option<&Card> {
        match &self.payload {
            ExchangePayload::Card(card) => Some(card),
            ExchangePayload::Response(_) => None,
        }
    }

    /// Returns the answer payload for user entries.
    pub fn as_response(&self) -> Option<&UserResponse> {
        match &self.payload {
            ExchangePayload::Response(response) => Some(response),
            ExchangePayload::Card(_) => None,
        }
    }
}
