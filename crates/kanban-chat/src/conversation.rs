//! Conversation state: ordered messages and the turn gate.

use kanban_ai::{Message, Role};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Error, Result};

/// Identifier generated for each user turn
pub type TurnId = Uuid;

/// Whether a message can still change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageState {
    /// Assistant message still being extended by deltas
    Streaming,
    /// Immutable
    Sealed,
}

/// A message held in the conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
    /// Turn that produced this message; `None` for hydrated history
    pub turn_id: Option<TurnId>,
    pub state: MessageState,
}

impl ChatMessage {
    /// Create an immutable message
    pub fn sealed(role: Role, content: impl Into<String>, turn_id: Option<TurnId>) -> Self {
        Self {
            role,
            content: content.into(),
            turn_id,
            state: MessageState::Sealed,
        }
    }

    /// Whether this is an assistant message still being extended
    pub fn is_in_flight(&self) -> bool {
        self.state == MessageState::Streaming
    }

    /// Wire form sent back to the endpoint
    pub fn to_wire(&self) -> Message {
        Message {
            role: self.role,
            content: self.content.clone(),
        }
    }
}

/// Turn gate for the conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TurnState {
    #[default]
    Idle,
    AwaitingResponse(TurnId),
}

/// Ordered messages for one user, plus the turn gate.
///
/// At most one assistant message is in flight at a time, and no user message
/// can be appended while a turn is awaiting its response.
#[derive(Debug, Default)]
pub struct Conversation {
    messages: Vec<ChatMessage>,
    state: TurnState,
}

impl Conversation {
    /// Create an empty conversation
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a conversation from persisted history, oldest first
    pub fn hydrate(persisted: impl IntoIterator<Item = Message>) -> Self {
        Self {
            messages: persisted
                .into_iter()
                .map(|m| ChatMessage::sealed(m.role, m.content, None))
                .collect(),
            state: TurnState::Idle,
        }
    }

    /// All messages in insertion order
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn last(&self) -> Option<&ChatMessage> {
        self.messages.last()
    }

    pub fn state(&self) -> TurnState {
        self.state
    }

    /// Whether a turn is awaiting its response
    pub fn is_loading(&self) -> bool {
        matches!(self.state, TurnState::AwaitingResponse(_))
    }

    /// Turn currently awaiting its response
    pub fn current_turn(&self) -> Option<TurnId> {
        match self.state {
            TurnState::AwaitingResponse(id) => Some(id),
            TurnState::Idle => None,
        }
    }

    /// Messages in wire form, oldest first
    pub fn wire_messages(&self) -> Vec<Message> {
        self.messages.iter().map(ChatMessage::to_wire).collect()
    }

    /// Append the user message for a new turn and close the gate.
    pub fn begin_turn(&mut self, user_text: impl Into<String>) -> Result<TurnId> {
        if self.is_loading() {
            return Err(Error::TurnInFlight);
        }
        let turn_id = Uuid::new_v4();
        self.messages
            .push(ChatMessage::sealed(Role::User, user_text, Some(turn_id)));
        self.state = TurnState::AwaitingResponse(turn_id);
        Ok(turn_id)
    }

    /// Index of the in-flight assistant message for a turn
    pub fn in_flight_index(&self, turn_id: TurnId) -> Option<usize> {
        self.messages
            .iter()
            .rposition(|m| m.turn_id == Some(turn_id) && m.is_in_flight())
    }

    /// Locate the turn's in-flight assistant message, appending one if the
    /// turn has none yet.
    pub(crate) fn open_assistant(&mut self, turn_id: TurnId) -> Result<usize> {
        self.ensure_current(turn_id)?;

        if let Some(index) = self.in_flight_index(turn_id) {
            return Ok(index);
        }
        if self.messages.iter().any(ChatMessage::is_in_flight) {
            return Err(Error::Other(
                "another assistant message is already in flight".to_string(),
            ));
        }

        self.messages.push(ChatMessage {
            role: Role::Assistant,
            content: String::new(),
            turn_id: Some(turn_id),
            state: MessageState::Streaming,
        });
        Ok(self.messages.len() - 1)
    }

    /// Replace the in-flight message's content with the full text so far.
    pub(crate) fn set_in_flight_content(&mut self, turn_id: TurnId, content: &str) -> Result<usize> {
        let index = self
            .in_flight_index(turn_id)
            .ok_or(Error::NotInFlight(turn_id))?;
        let message = &mut self.messages[index];
        message.content.clear();
        message.content.push_str(content);
        Ok(index)
    }

    /// Seal the turn's in-flight message, returning its index.
    pub(crate) fn seal(&mut self, turn_id: TurnId) -> Option<usize> {
        let index = self.in_flight_index(turn_id)?;
        self.messages[index].state = MessageState::Sealed;
        Some(index)
    }

    /// Append a fixed advisory as the turn's assistant reply.
    pub(crate) fn push_advisory(&mut self, turn_id: TurnId, text: &str) -> Result<usize> {
        self.ensure_current(turn_id)?;
        self.seal(turn_id);
        self.messages
            .push(ChatMessage::sealed(Role::Assistant, text, Some(turn_id)));
        Ok(self.messages.len() - 1)
    }

    /// Reopen the gate. Anything the turn left in flight is sealed.
    pub(crate) fn end_turn(&mut self, turn_id: TurnId) -> bool {
        if self.current_turn() != Some(turn_id) {
            return false;
        }
        self.seal(turn_id);
        self.state = TurnState::Idle;
        true
    }

    fn ensure_current(&self, turn_id: TurnId) -> Result<()> {
        if self.current_turn() == Some(turn_id) {
            Ok(())
        } else {
            Err(Error::NotInFlight(turn_id))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn in_flight_count(conversation: &Conversation) -> usize {
        conversation
            .messages()
            .iter()
            .filter(|m| m.is_in_flight())
            .count()
    }

    #[test]
    fn test_hydrate_keeps_order_and_seals() {
        let conversation = Conversation::hydrate(vec![
            Message::user("a"),
            Message::assistant("b"),
            Message::user("a"),
        ]);
        assert_eq!(conversation.len(), 3);
        assert!(!conversation.is_loading());
        assert!(conversation.messages().iter().all(|m| !m.is_in_flight()));
        assert_eq!(
            conversation.wire_messages(),
            vec![Message::user("a"), Message::assistant("b"), Message::user("a")]
        );
    }

    #[test]
    fn test_begin_turn_closes_gate() {
        let mut conversation = Conversation::new();
        let turn = conversation.begin_turn("hello").unwrap();
        assert_eq!(conversation.state(), TurnState::AwaitingResponse(turn));
        assert!(conversation.is_loading());
        assert!(matches!(
            conversation.begin_turn("again"),
            Err(Error::TurnInFlight)
        ));
        assert_eq!(conversation.len(), 1);

        assert!(conversation.end_turn(turn));
        assert!(!conversation.is_loading());
        conversation.begin_turn("again").unwrap();
        assert_eq!(conversation.len(), 2);
    }

    #[test]
    fn test_open_assistant_is_idempotent() {
        let mut conversation = Conversation::new();
        let turn = conversation.begin_turn("q").unwrap();
        let first = conversation.open_assistant(turn).unwrap();
        let second = conversation.open_assistant(turn).unwrap();
        assert_eq!(first, second);
        assert_eq!(conversation.len(), 2);
        assert_eq!(in_flight_count(&conversation), 1);
    }

    #[test]
    fn test_stale_turn_cannot_touch_conversation() {
        let mut conversation = Conversation::new();
        let old = conversation.begin_turn("one").unwrap();
        conversation.end_turn(old);
        let _current = conversation.begin_turn("two").unwrap();

        assert!(matches!(
            conversation.open_assistant(old),
            Err(Error::NotInFlight(id)) if id == old
        ));
        assert!(conversation.push_advisory(old, "nope").is_err());
        assert!(!conversation.end_turn(old));
        assert!(conversation.is_loading());
    }

    #[test]
    fn test_seal_and_end_turn() {
        let mut conversation = Conversation::new();
        let turn = conversation.begin_turn("q").unwrap();
        let index = conversation.open_assistant(turn).unwrap();
        conversation.set_in_flight_content(turn, "partial").unwrap();
        assert_eq!(conversation.seal(turn), Some(index));
        assert_eq!(conversation.messages()[index].state, MessageState::Sealed);
        assert!(matches!(
            conversation.set_in_flight_content(turn, "more"),
            Err(Error::NotInFlight(_))
        ));
        assert_eq!(conversation.messages()[index].content, "partial");
    }

    #[test]
    fn test_end_turn_seals_leftover_stream() {
        let mut conversation = Conversation::new();
        let turn = conversation.begin_turn("q").unwrap();
        conversation.open_assistant(turn).unwrap();
        assert_eq!(in_flight_count(&conversation), 1);
        conversation.end_turn(turn);
        assert_eq!(in_flight_count(&conversation), 0);
    }

    #[test]
    fn test_advisory_is_sealed_assistant_message() {
        let mut conversation = Conversation::new();
        let turn = conversation.begin_turn("q").unwrap();
        let index = conversation.push_advisory(turn, "Rate limited").unwrap();
        let message = &conversation.messages()[index];
        assert_eq!(message.role, Role::Assistant);
        assert_eq!(message.content, "Rate limited");
        assert_eq!(message.turn_id, Some(turn));
        assert!(!message.is_in_flight());
    }
}
