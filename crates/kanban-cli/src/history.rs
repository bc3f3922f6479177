//! Chat history persisted as one JSONL file per user

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use kanban_ai::{Message, Role};
use kanban_chat::{Error, MessageStore, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;

/// One line of the history file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub role: Role,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// Append-only message store backed by `<dir>/<user_id>.jsonl`
pub struct JsonlStore {
    path: PathBuf,
}

impl JsonlStore {
    /// Get the history directory under a data directory
    pub fn history_dir(data_dir: &Path) -> PathBuf {
        data_dir.join("history")
    }

    pub fn new(data_dir: &Path, user_id: &str) -> Self {
        Self {
            path: Self::history_dir(data_dir).join(format!("{}.jsonl", user_id)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_entries(&self) -> std::io::Result<Vec<HistoryEntry>> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(vec![]),
            Err(e) => return Err(e),
        };

        let mut entries = Vec::new();
        for (number, line) in content.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<HistoryEntry>(line) {
                Ok(entry) => entries.push(entry),
                Err(e) => tracing::warn!(
                    "Skipping unreadable history line {} in {}: {}",
                    number + 1,
                    self.path.display(),
                    e
                ),
            }
        }
        Ok(entries)
    }
}

fn persistence(e: impl std::fmt::Display) -> Error {
    Error::Persistence(e.to_string())
}

#[async_trait]
impl MessageStore for JsonlStore {
    async fn persist(&self, role: Role, content: &str) -> Result<()> {
        if let Some(dir) = self.path.parent() {
            tokio::fs::create_dir_all(dir).await.map_err(persistence)?;
        }

        let entry = HistoryEntry {
            role,
            content: content.to_string(),
            created_at: Utc::now(),
        };
        let mut line = serde_json::to_string(&entry).map_err(persistence)?;
        line.push('\n');

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(persistence)?;
        file.write_all(line.as_bytes()).await.map_err(persistence)?;
        file.flush().await.map_err(persistence)?;
        Ok(())
    }

    async fn load_history(&self, limit: usize) -> Result<Vec<Message>> {
        let mut entries = self.read_entries().await.map_err(persistence)?;
        entries.sort_by_key(|e| e.created_at);
        Ok(entries
            .into_iter()
            .take(limit)
            .map(|e| Message {
                role: e.role,
                content: e.content,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir() -> PathBuf {
        std::env::temp_dir().join(format!("kanban-history-{}", uuid::Uuid::new_v4()))
    }

    #[tokio::test]
    async fn test_missing_file_is_empty_history() {
        let dir = temp_dir();
        let store = JsonlStore::new(&dir, "nobody");
        assert!(store.load_history(50).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_persist_and_load_in_order() {
        let dir = temp_dir();
        let store = JsonlStore::new(&dir, "alice");
        store.persist(Role::User, "hi").await.unwrap();
        store.persist(Role::Assistant, "Hello").await.unwrap();
        store.persist(Role::User, "hi").await.unwrap();

        let history = store.load_history(50).await.unwrap();
        assert_eq!(
            history,
            vec![Message::user("hi"), Message::assistant("Hello"), Message::user("hi")]
        );
        assert_eq!(store.load_history(1).await.unwrap(), vec![Message::user("hi")]);
        std::fs::remove_dir_all(dir).ok();
    }

    #[tokio::test]
    async fn test_limit_keeps_earliest_entries() {
        let dir = temp_dir();
        let store = JsonlStore::new(&dir, "alice");
        let start = Utc::now();
        // Written out of order; load sorts by creation time
        let mut raw = String::new();
        for i in (0..60).rev() {
            let entry = HistoryEntry {
                role: Role::User,
                content: i.to_string(),
                created_at: start + chrono::Duration::seconds(i),
            };
            raw.push_str(&serde_json::to_string(&entry).unwrap());
            raw.push('\n');
        }
        tokio::fs::create_dir_all(store.path().parent().unwrap()).await.unwrap();
        tokio::fs::write(store.path(), raw).await.unwrap();

        let history = store.load_history(50).await.unwrap();
        assert_eq!(history.len(), 50);
        assert_eq!(history.first(), Some(&Message::user("0")));
        assert_eq!(history.last(), Some(&Message::user("49")));
        std::fs::remove_dir_all(dir).ok();
    }

    #[tokio::test]
    async fn test_users_are_separate() {
        let dir = temp_dir();
        JsonlStore::new(&dir, "a").persist(Role::User, "from a").await.unwrap();
        let b = JsonlStore::new(&dir, "b");
        assert!(b.load_history(50).await.unwrap().is_empty());
        std::fs::remove_dir_all(dir).ok();
    }

    #[tokio::test]
    async fn test_unreadable_lines_are_skipped() {
        let dir = temp_dir();
        let store = JsonlStore::new(&dir, "alice");
        store.persist(Role::User, "kept").await.unwrap();
        let mut raw = tokio::fs::read_to_string(store.path()).await.unwrap();
        raw.push_str("{not json\n\n");
        tokio::fs::write(store.path(), raw).await.unwrap();

        assert_eq!(store.load_history(50).await.unwrap(), vec![Message::user("kept")]);
        std::fs::remove_dir_all(dir).ok();
    }
}
