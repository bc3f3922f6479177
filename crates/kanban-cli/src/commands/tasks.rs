//! /tasks command - show the board column by column

use super::CommandResult;
use crate::tasks::TaskStore;
use kanban_chat::{ColumnStatus, Task};

pub struct TasksCommand;

impl TasksCommand {
    pub fn execute(tasks: &TaskStore) -> CommandResult {
        if tasks.is_empty() {
            return CommandResult::Message("The board is empty. Add a task with /add.".to_string());
        }

        let mut output = String::new();
        for column in ColumnStatus::ALL {
            let cards = tasks.column(column);
            output.push_str(&format!("{} ({})\n", column.title(), cards.len()));
            for task in cards {
                output.push_str(&format_task(task));
                output.push('\n');
            }
            output.push('\n');
        }
        CommandResult::Message(output.trim_end().to_string())
    }
}

pub(crate) fn format_task(task: &Task) -> String {
    let mut line = format!(
        "  {}  {} [{}]",
        &task.id.to_string()[..8],
        task.title,
        task.priority.as_str()
    );
    if !task.category.is_empty() {
        line.push_str(&format!(" #{}", task.category));
    }
    if let Some(due) = task.due_date {
        line.push_str(&format!(" due {}", due));
    }
    line
}
