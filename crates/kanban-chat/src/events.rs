//! Chat session event types

use serde::{Deserialize, Serialize};

use crate::advisory::AdvisoryKind;
use crate::conversation::{ChatMessage, TurnId};

/// Events emitted while a session runs. Subscribers re-render from these.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChatEvent {
    /// History was loaded
    Hydrated { messages: usize },

    /// A turn started; `message` is the user's message
    TurnStart {
        turn_id: TurnId,
        index: usize,
        message: ChatMessage,
    },

    /// The in-flight assistant message grew; `message` holds the full text
    MessageUpdate {
        turn_id: TurnId,
        index: usize,
        message: ChatMessage,
    },

    /// The assistant message was sealed
    MessageEnd {
        turn_id: TurnId,
        index: usize,
        message: ChatMessage,
    },

    /// A fixed advisory was appended instead of a streamed reply
    Advisory {
        turn_id: TurnId,
        kind: AdvisoryKind,
        index: usize,
        message: ChatMessage,
    },

    /// The turn is over and the session accepts input again
    TurnEnd {
        turn_id: TurnId,
        outcome: TurnOutcome,
    },
}

impl ChatEvent {
    /// Check if this event ends a turn
    pub fn is_terminal(&self) -> bool {
        matches!(self, ChatEvent::TurnEnd { .. })
    }
}

/// How a turn ended
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TurnOutcome {
    /// Streamed a non-empty reply
    Completed { content: String },
    /// The stream ended without any text
    Empty,
    RateLimited,
    QuotaExhausted,
    /// Transport or decode failure
    Failed { reason: String },
    /// Aborted through the session handle
    Cancelled,
}

impl TurnOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, TurnOutcome::Completed { .. })
    }
}
