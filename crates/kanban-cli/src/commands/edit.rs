//! /edit command - change a task's title, description, priority, due date or category

use super::CommandResult;
use super::tasks::format_task;
use crate::tasks::{TaskStore, TaskUpdate};
use chrono::NaiveDate;
use kanban_chat::Priority;

pub struct EditCommand;

impl EditCommand {
    pub fn execute(args: &str, tasks: &mut TaskStore) -> CommandResult {
        let (key, update) = match parse_args(args) {
            Ok(parsed) => parsed,
            Err(msg) => return CommandResult::Message(msg),
        };
        match tasks.resolve(&key).and_then(|id| tasks.update(id, update)) {
            Ok(task) => CommandResult::Message(format!("Updated:\n{}", format_task(&task))),
            Err(e) => CommandResult::Message(e.to_string()),
        }
    }
}

/// Multi-word option values
#[derive(Clone, Copy)]
enum TextField {
    Title,
    Description,
}

/// Words without a `key:` prefix name the task, unless they follow `title:`
/// or `desc:`, which take every word up to the next option.
fn parse_args(args: &str) -> Result<(String, TaskUpdate), String> {
    let mut update = TaskUpdate::default();
    let mut key = Vec::new();
    let mut title: Option<Vec<&str>> = None;
    let mut description: Option<Vec<&str>> = None;
    let mut open: Option<TextField> = None;
    let mut changed = false;

    for word in args.split_whitespace() {
        match word.split_once(':') {
            Some(("title", value)) => {
                title = Some(vec![value]);
                open = Some(TextField::Title);
            }
            Some(("desc" | "description", value)) => {
                description = Some(vec![value]);
                open = Some(TextField::Description);
            }
            Some(("priority" | "p", value)) => {
                update.priority = Some(
                    Priority::parse(value)
                        .ok_or_else(|| format!("Unknown priority: '{}' (low, medium, high)", value))?,
                );
                open = None;
                changed = true;
            }
            Some(("due", "none")) => {
                update.due_date = Some(None);
                open = None;
                changed = true;
            }
            Some(("due", value)) => {
                let date = NaiveDate::parse_from_str(value, "%Y-%m-%d")
                    .map_err(|_| format!("Invalid due date: '{}' (YYYY-MM-DD or none)", value))?;
                update.due_date = Some(Some(date));
                open = None;
                changed = true;
            }
            Some(("category" | "cat", value)) => {
                update.category = Some(value.to_string());
                open = None;
                changed = true;
            }
            _ => match (open, title.as_mut(), description.as_mut()) {
                (Some(TextField::Title), Some(words), _) => words.push(word),
                (Some(TextField::Description), _, Some(words)) => words.push(word),
                _ => key.push(word),
            },
        }
    }

    if let Some(words) = title {
        update.title = Some(join_words(&words));
        changed = true;
    }
    if let Some(words) = description {
        update.description = Some(join_words(&words));
        changed = true;
    }

    if key.is_empty() || !changed {
        return Err(
            "Usage: /edit <task> [title:..] [desc:..] [priority:..] [due:..|due:none] [category:..]"
                .to_string(),
        );
    }
    Ok((key.join(" "), update))
}

fn join_words(words: &[&str]) -> String {
    words
        .iter()
        .filter(|w| !w.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join(" ")
}
