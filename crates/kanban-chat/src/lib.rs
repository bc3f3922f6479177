//! kanban-chat: Conversation state and the streaming turn controller
//!
//! This crate folds decoded text deltas into a conversation, one turn at a
//! time, and reports every state change to subscribers.

pub mod advisory;
pub mod conversation;
pub mod error;
pub mod events;
pub mod handle;
pub mod reconciler;
pub mod session;
pub mod store;
pub mod tasks;
pub mod transport;

pub use advisory::AdvisoryKind;
pub use conversation::{ChatMessage, Conversation, MessageState, TurnId, TurnState};
pub use error::{Error, Result};
pub use events::{ChatEvent, TurnOutcome};
pub use handle::ChatHandle;
pub use reconciler::{Reconciler, SealedMessage};
pub use session::{ChatConfig, ChatSession, DEFAULT_HISTORY_LIMIT};
pub use store::{MemoryStore, MessageStore};
pub use tasks::{ColumnStatus, Priority, Task, task_context};
pub use transport::{ChatTransport, HttpTransport};
