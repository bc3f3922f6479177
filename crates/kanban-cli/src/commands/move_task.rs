//! /move command - move a task to another column

use super::CommandResult;
use crate::tasks::TaskStore;
use kanban_chat::ColumnStatus;

pub struct MoveCommand;

impl MoveCommand {
    pub fn execute(args: &str, tasks: &mut TaskStore) -> CommandResult {
        // The column is the last word; everything before it names the task.
        let Some((key, column)) = args.trim().rsplit_once(char::is_whitespace) else {
            return CommandResult::Message("Usage: /move <task> <column>".to_string());
        };
        let Some(column) = ColumnStatus::parse(column) else {
            return CommandResult::Message(format!(
                "Unknown column: '{}' (todo, in_progress, review, done)",
                column
            ));
        };

        let result = tasks
            .resolve(key)
            .and_then(|id| tasks.move_to(id, column));
        match result {
            Ok(task) => CommandResult::Message(format!(
                "Moved \"{}\" to {}",
                task.title,
                task.column_status.title()
            )),
            Err(e) => CommandResult::Message(e.to_string()),
        }
    }
}
