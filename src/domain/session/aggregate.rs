//! Session aggregate entity.
//!
//! A session is one sitting of a practice mode: a card-by-card walk through
//! the mode's drills. The aggregate owns the progression state machine;
//! the exchange log and scoring side effects live behind ports.
//!
//! # States
//!
//! `Active { awaiting_response | awaiting_continue } → Completed`. While a
//! continue is pending the aggregate also remembers what that continue
//! should do: reveal the current drill's scenario (after an insight card)
//! or advance to the next drill (after feedback and other terminal cards).

use serde::{Deserialize, Serialize};

use super::Card;
use crate::domain::catalog::ModeKey;
use crate::domain::foundation::{DomainError, ErrorCode, SessionId, Timestamp, UserId};

/// Lifecycle status of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Active,
    Completed,
}

impl SessionStatus {
    pub fn is_active(&self) -> bool {
        matches!(self, SessionStatus::Active)
    }

    /// Returns the stable string used for storage.
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::Active => "active",
            SessionStatus::Completed => "completed",
        }
    }
}

/// What a pending continue action should do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContinueAction {
    /// Show the current drill's scenario (an insight card was just shown).
    RevealScenario,
    /// Move on to the next drill, or complete if none remain.
    AdvanceDrill,
}

/// What the session expects from the user next.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Awaiting {
    Response,
    Continue(ContinueAction),
}

impl Awaiting {
    /// Returns the stable string used for storage.
    pub fn as_str(&self) -> &'static str {
        match self {
            Awaiting::Response => "response",
            Awaiting::Continue(ContinueAction::RevealScenario) => "continue_reveal_scenario",
            Awaiting::Continue(ContinueAction::AdvanceDrill) => "continue_advance_drill",
        }
    }
}

/// Session aggregate - one sitting of a practice mode.
///
/// # Invariants
///
/// - `exchange_count` is monotonic non-decreasing while active
/// - `drill_index` only moves forward
/// - a session is completed exactly once; completed sessions reject all
///   mutations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Unique identifier for this session.
    id: SessionId,

    /// User running the session.
    user_id: UserId,

    /// Practice mode being run.
    mode: ModeKey,

    /// The user's level in this mode when the session started.
    level_at_start: u32,

    /// Number of accepted user responses so far.
    exchange_count: u32,

    /// Index of the current drill in the mode's script.
    drill_index: u32,

    /// Current lifecycle status.
    status: SessionStatus,

    /// What the session expects next (meaningful only while active).
    awaiting: Awaiting,

    /// When the session started.
    started_at: Timestamp,

    /// When the session completed.
    ended_at: Option<Timestamp>,
}

impl Session {
    /// Starts a new active session at drill 0.
    ///
    /// The first card has not been presented yet, so the session awaits a
    /// scenario reveal.
    pub fn start(id: SessionId, user_id: UserId, mode: ModeKey, level_at_start: u32) -> Self {
        Self {
            id,
            user_id,
            mode,
            level_at_start,
            exchange_count: 0,
            drill_index: 0,
            status: SessionStatus::Active,
            awaiting: Awaiting::Continue(ContinueAction::RevealScenario),
            started_at: Timestamp::now(),
            ended_at: None,
        }
    }

    /// Reconstitute a session from persistence (no validation, no events).
    #[allow(clippy::too_many_arguments)]
    pub fn reconstitute(
        id: SessionId,
        user_id: UserId,
        mode: ModeKey,
        level_at_start: u32,
        exchange_count: u32,
        drill_index: u32,
        status: SessionStatus,
        awaiting: Awaiting,
        started_at: Timestamp,
        ended_at: Option<Timestamp>,
    ) -> Self {
        Self {
            id,
            user_id,
            mode,
            level_at_start,
            exchange_count,
            drill_index,
            status,
            awaiting,
            started_at,
            ended_at,
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────────

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    pub fn mode(&self) -> &ModeKey {
        &self.mode
    }

    pub fn level_at_start(&self) -> u32 {
        self.level_at_start
    }

    pub fn exchange_count(&self) -> u32 {
        self.exchange_count
    }

    pub fn drill_index(&self) -> u32 {
        self.drill_index
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn awaiting(&self) -> Awaiting {
        self.awaiting
    }

    pub fn started_at(&self) -> &Timestamp {
        &self.started_at
    }

    pub fn ended_at(&self) -> Option<&Timestamp> {
        self.ended_at.as_ref()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Authorization
    // ─────────────────────────────────────────────────────────────────────────

    /// Checks if the given user owns this session.
    pub fn is_owner(&self, user_id: &UserId) -> bool {
        &self.user_id == user_id
    }

    /// Validates that the user can act on this session.
    ///
    /// # Errors
    ///
    /// - `Forbidden` if user is not the owner
    pub fn authorize(&self, user_id: &UserId) -> Result<(), DomainError> {
        if self.is_owner(user_id) {
            Ok(())
        } else {
            Err(DomainError::new(
                ErrorCode::Forbidden,
                "User is not authorized to access this session",
            ))
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // State machine
    // ─────────────────────────────────────────────────────────────────────────

    /// Records that a card was presented, moving the machine to whatever
    /// the card demands next.
    ///
    /// # Errors
    ///
    /// - `SessionCompleted` if the session is no longer active
    pub fn present_card(&mut self, card: &Card) -> Result<(), DomainError> {
        self.ensure_active()?;

        self.awaiting = if card.expects_response() {
            Awaiting::Response
        } else {
            match card {
                Card::Insight { .. } => Awaiting::Continue(ContinueAction::RevealScenario),
                _ => Awaiting::Continue(ContinueAction::AdvanceDrill),
            }
        };
        Ok(())
    }

    /// Accepts a user response, incrementing the exchange count.
    ///
    /// Returns the new exchange count.
    ///
    /// # Errors
    ///
    /// - `SessionCompleted` if the session is no longer active
    /// - `AwaitingContinue` if no response is expected right now
    pub fn accept_response(&mut self) -> Result<u32, DomainError> {
        self.ensure_active()?;

        if self.awaiting != Awaiting::Response {
            return Err(DomainError::new(
                ErrorCode::AwaitingContinue,
                "Session is not waiting for a response",
            ));
        }

        self.exchange_count += 1;
        Ok(self.exchange_count)
    }

    /// Returns the pending continue action without consuming it.
    ///
    /// # Errors
    ///
    /// - `SessionCompleted` if the session is no longer active
    /// - `AwaitingResponse` if an answer is pending instead
    pub fn pending_continue(&self) -> Result<ContinueAction, DomainError> {
        self.ensure_active()?;

        match self.awaiting {
            Awaiting::Continue(action) => Ok(action),
            Awaiting::Response => Err(DomainError::new(
                ErrorCode::AwaitingResponse,
                "Session is waiting for a response, not a continue",
            )),
        }
    }

    /// Advances to the next drill.
    ///
    /// Returns the new drill index.
    ///
    /// # Errors
    ///
    /// - `SessionCompleted` if the session is no longer active
    /// - `InvalidStateTransition` unless an advance is the pending action
    pub fn advance_drill(&mut self) -> Result<u32, DomainError> {
        self.ensure_active()?;

        if self.awaiting != Awaiting::Continue(ContinueAction::AdvanceDrill) {
            return Err(DomainError::new(
                ErrorCode::InvalidStateTransition,
                "Session has no drill advance pending",
            ));
        }

        self.drill_index += 1;
        Ok(self.drill_index)
    }

    /// Completes the session.
    ///
    /// # Errors
    ///
    /// - `SessionCompleted` if already completed
    pub fn complete(&mut self, ended_at: Timestamp) -> Result<(), DomainError> {
        self.ensure_active()?;

        self.status = SessionStatus::Completed;
        self.ended_at = Some(ended_at);
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Private helpers
    // ─────────────────────────────────────────────────────────────────────────

    fn ensure_active(&self) -> Result<(), DomainError> {
        if self.status.is_active() {
            Ok(())
        } else {
            Err(DomainError::new(
                ErrorCode::SessionCompleted,
                "Session is already completed",
            ))
        }
    }
}
