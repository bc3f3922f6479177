//! Task board model and the text snapshot handed to the assistant.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Board column a task sits in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnStatus {
    #[default]
    Todo,
    InProgress,
    Review,
    Done,
}

impl ColumnStatus {
    /// The four fixed columns, left to right
    pub const ALL: [ColumnStatus; 4] = [
        ColumnStatus::Todo,
        ColumnStatus::InProgress,
        ColumnStatus::Review,
        ColumnStatus::Done,
    ];

    /// Stored name
    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnStatus::Todo => "todo",
            ColumnStatus::InProgress => "in_progress",
            ColumnStatus::Review => "review",
            ColumnStatus::Done => "done",
        }
    }

    /// Column heading
    pub fn title(&self) -> &'static str {
        match self {
            ColumnStatus::Todo => "To-Do",
            ColumnStatus::InProgress => "In Progress",
            ColumnStatus::Review => "Review",
            ColumnStatus::Done => "Done",
        }
    }

    /// Parse a column name, accepting stored names and headings
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().replace(['-', ' '], "_").as_str() {
            "todo" | "to_do" => Some(ColumnStatus::Todo),
            "in_progress" | "doing" => Some(ColumnStatus::InProgress),
            "review" => Some(ColumnStatus::Review),
            "done" => Some(ColumnStatus::Done),
            _ => None,
        }
    }
}

/// Task priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "low" => Some(Priority::Low),
            "medium" | "med" => Some(Priority::Medium),
            "high" => Some(Priority::High),
            _ => None,
        }
    }
}

/// A task card
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: Uuid,
    pub user_id: String,
    pub column_status: ColumnStatus,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub priority: Priority,
    #[serde(default)]
    pub category: String,
    pub due_date: Option<NaiveDate>,
    /// Order within the column
    pub position: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One line per task, in the given order:
///
/// ```text
/// - [todo] "Write docs" (medium)
/// ```
pub fn task_context(tasks: &[Task]) -> String {
    tasks
        .iter()
        .map(|t| {
            format!(
                "- [{}] \"{}\" ({})",
                t.column_status.as_str(),
                t.title,
                t.priority.as_str()
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(title: &str, column_status: ColumnStatus, priority: Priority) -> Task {
        let now = Utc::now();
        Task {
            id: Uuid::new_v4(),
            user_id: "u1".into(),
            column_status,
            title: title.into(),
            description: String::new(),
            priority,
            category: String::new(),
            due_date: None,
            position: 0,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_task_context_format() {
        let tasks = vec![
            task("Write docs", ColumnStatus::Todo, Priority::Low),
            task("Ship it", ColumnStatus::InProgress, Priority::High),
        ];
        assert_eq!(
            task_context(&tasks),
            "- [todo] \"Write docs\" (low)\n- [in_progress] \"Ship it\" (high)"
        );
        assert_eq!(task_context(&[]), "");
    }

    #[test]
    fn test_column_parse() {
        assert_eq!(ColumnStatus::parse("To-Do"), Some(ColumnStatus::Todo));
        assert_eq!(ColumnStatus::parse("in progress"), Some(ColumnStatus::InProgress));
        assert_eq!(ColumnStatus::parse("in_progress"), Some(ColumnStatus::InProgress));
        assert_eq!(ColumnStatus::parse("REVIEW"), Some(ColumnStatus::Review));
        assert_eq!(ColumnStatus::parse("archive"), None);
        for column in ColumnStatus::ALL {
            assert_eq!(ColumnStatus::parse(column.as_str()), Some(column));
            assert_eq!(ColumnStatus::parse(column.title()), Some(column));
        }
    }

    #[test]
    fn test_task_serde_names() {
        let t = task("A", ColumnStatus::InProgress, Priority::Medium);
        let json = serde_json::to_value(&t).unwrap();
        assert_eq!(json["column_status"], "in_progress");
        assert_eq!(json["priority"], "medium");
    }
}
