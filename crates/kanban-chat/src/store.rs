//! Persistence collaborator for chat messages

use async_trait::async_trait;
use kanban_ai::{Message, Role};
use parking_lot::Mutex;

use crate::error::Result;

/// Where finished messages are written and history is read from.
#[async_trait]
pub trait MessageStore: Send + Sync {
    /// Append one message
    async fn persist(&self, role: Role, content: &str) -> Result<()>;

    /// The first `limit` messages in creation order
    async fn load_history(&self, limit: usize) -> Result<Vec<Message>>;
}

/// Store that keeps messages in memory for the life of the process
#[derive(Debug, Default)]
pub struct MemoryStore {
    messages: Mutex<Vec<Message>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with existing messages
    pub fn with_messages(messages: Vec<Message>) -> Self {
        Self {
            messages: Mutex::new(messages),
        }
    }

    /// Snapshot of everything persisted so far
    pub fn messages(&self) -> Vec<Message> {
        self.messages.lock().clone()
    }
}

#[async_trait]
impl MessageStore for MemoryStore {
    async fn persist(&self, role: Role, content: &str) -> Result<()> {
        self.messages.lock().push(Message {
            role,
            content: content.to_string(),
        });
        Ok(())
    }

    async fn load_history(&self, limit: usize) -> Result<Vec<Message>> {
        let messages = self.messages.lock();
        Ok(messages.iter().take(limit).cloned().collect())
    }
}
