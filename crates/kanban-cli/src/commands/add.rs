//! /add command - create a task

use super::CommandResult;
use super::tasks::format_task;
use crate::tasks::{NewTask, TaskStore};
use chrono::NaiveDate;
use kanban_chat::{ColumnStatus, Priority};

pub struct AddCommand;

impl AddCommand {
    pub fn execute(args: &str, tasks: &mut TaskStore) -> CommandResult {
        let new = match parse_args(args) {
            Ok(new) => new,
            Err(msg) => return CommandResult::Message(msg),
        };
        match tasks.add(new) {
            Ok(task) => CommandResult::Message(format!(
                "Added to {}:\n{}",
                task.column_status.title(),
                format_task(&task)
            )),
            Err(e) => CommandResult::Message(format!("Could not add task: {}", e)),
        }
    }
}

/// Split `key:value` options from the title words
fn parse_args(args: &str) -> Result<NewTask, String> {
    let mut new = NewTask::default();
    let mut title = Vec::new();

    for word in args.split_whitespace() {
        match word.split_once(':') {
            Some(("priority" | "p", value)) => {
                new.priority = Priority::parse(value)
                    .ok_or_else(|| format!("Unknown priority: '{}' (low, medium, high)", value))?;
            }
            Some(("column" | "c", value)) => {
                new.column_status = ColumnStatus::parse(value).ok_or_else(|| {
                    format!("Unknown column: '{}' (todo, in_progress, review, done)", value)
                })?;
            }
            Some(("due", value)) => {
                new.due_date = Some(
                    NaiveDate::parse_from_str(value, "%Y-%m-%d")
                        .map_err(|_| format!("Invalid due date: '{}' (YYYY-MM-DD)", value))?,
                );
            }
            Some(("category" | "cat", value)) => new.category = value.to_string(),
            _ => title.push(word),
        }
    }

    if title.is_empty() {
        return Err("Usage: /add <title> [priority:..] [column:..] [due:..] [category:..]".to_string());
    }
    new.title = title.join(" ");
    Ok(new)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_title_and_options() {
        let new = parse_args("Fix login bug priority:high column:in_progress due:2025-02-01 cat:auth")
            .unwrap();
        assert_eq!(new.title, "Fix login bug");
        assert_eq!(new.priority, Priority::High);
        assert_eq!(new.column_status, ColumnStatus::InProgress);
        assert_eq!(new.due_date, NaiveDate::from_ymd_opt(2025, 2, 1));
        assert_eq!(new.category, "auth");
    }

    #[test]
    fn test_parse_defaults() {
        let new = parse_args("Just a title").unwrap();
        assert_eq!(new.priority, Priority::Medium);
        assert_eq!(new.column_status, ColumnStatus::Todo);
        assert_eq!(new.due_date, None);
    }

    #[test]
    fn test_parse_errors() {
        assert!(parse_args("").is_err());
        assert!(parse_args("priority:high").is_err());
        assert!(parse_args("Task priority:urgent").is_err());
        assert!(parse_args("Task due:tomorrow").is_err());
    }
}
