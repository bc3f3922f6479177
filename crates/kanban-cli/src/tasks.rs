//! Task board storage: one JSON file per user

use chrono::{NaiveDate, Utc};
use kanban_chat::{ColumnStatus, Priority, Task};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum TaskError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("No task matches '{0}'")]
    NotFound(String),

    #[error("'{0}' matches more than one task")]
    Ambiguous(String),

    #[error("Task title is empty")]
    EmptyTitle,
}

pub type Result<T> = std::result::Result<T, TaskError>;

/// Fields for a new task; anything unset takes the board default.
#[derive(Debug, Clone, Default)]
pub struct NewTask {
    pub title: String,
    pub description: String,
    pub priority: Priority,
    pub column_status: ColumnStatus,
    pub category: String,
    pub due_date: Option<NaiveDate>,
}

impl NewTask {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }
}

/// Partial edit of an existing task
#[derive(Debug, Clone, Default)]
pub struct TaskUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<Priority>,
    pub category: Option<String>,
    pub due_date: Option<Option<NaiveDate>>,
}

/// A user's tasks, written back to disk after every change
pub struct TaskStore {
    path: PathBuf,
    user_id: String,
    tasks: Vec<Task>,
}

impl TaskStore {
    /// Get the tasks directory under a data directory
    pub fn tasks_dir(data_dir: &Path) -> PathBuf {
        data_dir.join("tasks")
    }

    /// Open the user's board, starting empty if no file exists yet
    pub fn open(data_dir: &Path, user_id: &str) -> Result<Self> {
        let path = Self::tasks_dir(data_dir).join(format!("{}.json", user_id));
        let tasks = if path.exists() {
            serde_json::from_str(&fs::read_to_string(&path)?)?
        } else {
            vec![]
        };
        Ok(Self {
            path,
            user_id: user_id.to_string(),
            tasks,
        })
    }

    /// Tasks ordered by column, then position
    pub fn list(&self) -> Vec<&Task> {
        let mut tasks: Vec<&Task> = self.tasks.iter().collect();
        tasks.sort_by_key(|t| (column_rank(t.column_status), t.position));
        tasks
    }

    /// Tasks in one column, ordered by position
    pub fn column(&self, column: ColumnStatus) -> Vec<&Task> {
        self.list()
            .into_iter()
            .filter(|t| t.column_status == column)
            .collect()
    }

    /// Snapshot ordered by position alone, as sent to the assistant.
    /// Ties keep insertion order.
    pub fn snapshot(&self) -> Vec<Task> {
        let mut tasks = self.tasks.clone();
        tasks.sort_by_key(|t| t.position);
        tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Add a task at the end of its column
    pub fn add(&mut self, new: NewTask) -> Result<Task> {
        let title = new.title.trim().to_string();
        if title.is_empty() {
            return Err(TaskError::EmptyTitle);
        }

        let now = Utc::now();
        let task = Task {
            id: Uuid::new_v4(),
            user_id: self.user_id.clone(),
            column_status: new.column_status,
            title,
            description: new.description,
            priority: new.priority,
            category: new.category,
            due_date: new.due_date,
            position: self.count_in(new.column_status),
            created_at: now,
            updated_at: now,
        };
        self.tasks.push(task.clone());
        self.save()?;
        Ok(task)
    }

    pub fn update(&mut self, id: Uuid, update: TaskUpdate) -> Result<Task> {
        let task = self
            .tasks
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| TaskError::NotFound(id.to_string()))?;

        if let Some(title) = update.title {
            let title = title.trim().to_string();
            if title.is_empty() {
                return Err(TaskError::EmptyTitle);
            }
            task.title = title;
        }
        if let Some(description) = update.description {
            task.description = description;
        }
        if let Some(priority) = update.priority {
            task.priority = priority;
        }
        if let Some(category) = update.category {
            task.category = category;
        }
        if let Some(due_date) = update.due_date {
            task.due_date = due_date;
        }
        task.updated_at = Utc::now();

        let task = task.clone();
        self.save()?;
        Ok(task)
    }

    /// Move a task to the end of another column
    pub fn move_to(&mut self, id: Uuid, column: ColumnStatus) -> Result<Task> {
        let position = self.count_in(column);
        let task = self
            .tasks
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| TaskError::NotFound(id.to_string()))?;
        if task.column_status == column {
            return Ok(task.clone());
        }

        task.column_status = column;
        task.position = position;
        task.updated_at = Utc::now();

        let task = task.clone();
        self.save()?;
        Ok(task)
    }

    pub fn delete(&mut self, id: Uuid) -> Result<Task> {
        let index = self
            .tasks
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| TaskError::NotFound(id.to_string()))?;
        let task = self.tasks.remove(index);
        self.save()?;
        Ok(task)
    }

    /// Find a task by id prefix or exact title (case-insensitive)
    pub fn resolve(&self, key: &str) -> Result<Uuid> {
        let key = key.trim();
        if key.is_empty() {
            return Err(TaskError::NotFound(key.to_string()));
        }
        let lowered = key.to_lowercase();

        let mut matches: Vec<Uuid> = self
            .tasks
            .iter()
            .filter(|t| t.id.to_string().starts_with(&lowered))
            .map(|t| t.id)
            .collect();
        if matches.is_empty() {
            matches = self
                .tasks
                .iter()
                .filter(|t| t.title.to_lowercase() == lowered)
                .map(|t| t.id)
                .collect();
        }

        match matches.as_slice() {
            [id] => Ok(*id),
            [] => Err(TaskError::NotFound(key.to_string())),
            _ => Err(TaskError::Ambiguous(key.to_string())),
        }
    }

    fn count_in(&self, column: ColumnStatus) -> u32 {
        self.tasks
            .iter()
            .filter(|t| t.column_status == column)
            .count() as u32
    }

    fn save(&self) -> Result<()> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir)?;
        }
        fs::write(&self.path, serde_json::to_string_pretty(&self.tasks)?)?;
        Ok(())
    }
}

fn column_rank(column: ColumnStatus) -> usize {
    ColumnStatus::ALL
        .iter()
        .position(|c| *c == column)
        .unwrap_or(ColumnStatus::ALL.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir() -> PathBuf {
        std::env::temp_dir().join(format!("kanban-tasks-{}", uuid::Uuid::new_v4()))
    }

    #[test]
    fn test_add_defaults() {
        let dir = temp_dir();
        let mut store = TaskStore::open(&dir, "alice").unwrap();
        let task = store.add(NewTask::titled("  Write docs ")).unwrap();
        assert_eq!(task.title, "Write docs");
        assert_eq!(task.priority, Priority::Medium);
        assert_eq!(task.column_status, ColumnStatus::Todo);
        assert_eq!(task.position, 0);
        assert_eq!(task.user_id, "alice");

        let second = store.add(NewTask::titled("Review PR")).unwrap();
        assert_eq!(second.position, 1);
        assert!(matches!(store.add(NewTask::titled("  ")), Err(TaskError::EmptyTitle)));
        std::fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn test_reopen_reads_saved_tasks() {
        let dir = temp_dir();
        let mut store = TaskStore::open(&dir, "alice").unwrap();
        let task = store.add(NewTask::titled("Persist me")).unwrap();

        let reopened = TaskStore::open(&dir, "alice").unwrap();
        assert_eq!(reopened.snapshot(), vec![task]);
        assert!(TaskStore::open(&dir, "bob").unwrap().is_empty());
        std::fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn test_move_appends_to_target_column() {
        let dir = temp_dir();
        let mut store = TaskStore::open(&dir, "alice").unwrap();
        let a = store.add(NewTask::titled("A")).unwrap();
        store
            .add(NewTask {
                column_status: ColumnStatus::Done,
                ..NewTask::titled("B")
            })
            .unwrap();

        let moved = store.move_to(a.id, ColumnStatus::Done).unwrap();
        assert_eq!(moved.column_status, ColumnStatus::Done);
        assert_eq!(moved.position, 1);
        let titles: Vec<&str> = store
            .column(ColumnStatus::Done)
            .iter()
            .map(|t| t.title.as_str())
            .collect();
        assert_eq!(titles, vec!["B", "A"]);
        assert!(store.column(ColumnStatus::Todo).is_empty());
        std::fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn test_list_orders_by_column_then_position() {
        let dir = temp_dir();
        let mut store = TaskStore::open(&dir, "alice").unwrap();
        store
            .add(NewTask {
                column_status: ColumnStatus::Review,
                ..NewTask::titled("R")
            })
            .unwrap();
        store.add(NewTask::titled("T1")).unwrap();
        store.add(NewTask::titled("T2")).unwrap();

        let titles: Vec<&str> = store.list().iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["T1", "T2", "R"]);
        std::fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn test_snapshot_orders_by_position_only() {
        let dir = temp_dir();
        let mut store = TaskStore::open(&dir, "alice").unwrap();
        store.add(NewTask::titled("T1")).unwrap();
        store.add(NewTask::titled("T2")).unwrap();
        store
            .add(NewTask {
                column_status: ColumnStatus::Done,
                ..NewTask::titled("D")
            })
            .unwrap();

        let titles: Vec<String> = store.snapshot().into_iter().map(|t| t.title).collect();
        assert_eq!(titles, vec!["T1", "D", "T2"]);
        assert_eq!(
            kanban_chat::task_context(&store.snapshot()),
            "- [todo] \"T1\" (medium)\n- [done] \"D\" (medium)\n- [todo] \"T2\" (medium)"
        );
        std::fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn test_update_and_delete() {
        let dir = temp_dir();
        let mut store = TaskStore::open(&dir, "alice").unwrap();
        let task = store.add(NewTask::titled("Draft")).unwrap();

        let updated = store
            .update(
                task.id,
                TaskUpdate {
                    priority: Some(Priority::High),
                    due_date: Some(NaiveDate::from_ymd_opt(2025, 1, 31)),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(updated.priority, Priority::High);
        assert_eq!(updated.due_date, NaiveDate::from_ymd_opt(2025, 1, 31));
        assert_eq!(updated.title, "Draft");

        store.delete(task.id).unwrap();
        assert!(store.is_empty());
        assert!(matches!(store.delete(task.id), Err(TaskError::NotFound(_))));
        std::fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn test_resolve_by_prefix_or_title() {
        let dir = temp_dir();
        let mut store = TaskStore::open(&dir, "alice").unwrap();
        let task = store.add(NewTask::titled("Ship it")).unwrap();
        store.add(NewTask::titled("Other")).unwrap();

        let prefix = &task.id.to_string()[..8];
        assert_eq!(store.resolve(prefix).unwrap(), task.id);
        assert_eq!(store.resolve("ship IT").unwrap(), task.id);
        assert!(matches!(store.resolve("missing"), Err(TaskError::NotFound(_))));
        assert!(matches!(store.resolve(""), Err(TaskError::NotFound(_))));
        std::fs::remove_dir_all(dir).ok();
    }
}
