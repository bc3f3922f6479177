//! Folds text deltas into the turn's assistant message.

use crate::conversation::{Conversation, TurnId};
use crate::error::Result;

/// A message the reconciler has sealed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SealedMessage {
    /// Position in the conversation
    pub index: usize,
    /// Final text
    pub content: String,
}

/// Builds one assistant message from successive fragments.
///
/// The in-flight message always holds the full accumulated text, never a raw
/// delta. Sealing consumes the reconciler, so a sealed message cannot be
/// extended.
#[derive(Debug)]
pub struct Reconciler {
    turn_id: TurnId,
    accumulated: String,
    fragments: usize,
}

impl Reconciler {
    pub fn new(turn_id: TurnId) -> Self {
        Self {
            turn_id,
            accumulated: String::new(),
            fragments: 0,
        }
    }

    pub fn turn_id(&self) -> TurnId {
        self.turn_id
    }

    /// Text accumulated so far
    pub fn accumulated(&self) -> &str {
        &self.accumulated
    }

    /// Number of non-empty fragments applied
    pub fn fragments(&self) -> usize {
        self.fragments
    }

    /// Apply one fragment, returning the index of the updated message.
    ///
    /// Empty fragments are ignored and return `None`; the assistant message is
    /// only created by the first non-empty fragment.
    pub fn apply(&mut self, conversation: &mut Conversation, fragment: &str) -> Result<Option<usize>> {
        if fragment.is_empty() {
            return Ok(None);
        }
        conversation.open_assistant(self.turn_id)?;
        self.accumulated.push_str(fragment);
        self.fragments += 1;
        conversation
            .set_in_flight_content(self.turn_id, &self.accumulated)
            .map(Some)
    }

    /// Seal the message. Returns `None` when no fragment ever arrived, in
    /// which case no message exists and nothing should be persisted.
    pub fn seal(self, conversation: &mut Conversation) -> Option<SealedMessage> {
        let index = conversation.seal(self.turn_id);
        if self.accumulated.is_empty() {
            return None;
        }
        index.map(|index| SealedMessage {
            index,
            content: self.accumulated,
        })
    }
}
