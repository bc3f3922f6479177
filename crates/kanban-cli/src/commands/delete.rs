//! /delete command

use super::CommandResult;
use crate::tasks::TaskStore;

pub struct DeleteCommand;

impl DeleteCommand {
    pub fn execute(args: &str, tasks: &mut TaskStore) -> CommandResult {
        if args.trim().is_empty() {
            return CommandResult::Message("Usage: /delete <task>".to_string());
        }
        match tasks.resolve(args).and_then(|id| tasks.delete(id)) {
            Ok(task) => CommandResult::Message(format!("Deleted \"{}\"", task.title)),
            Err(e) => CommandResult::Message(e.to_string()),
        }
    }
}
