//! Slash commands for interactive mode

mod add;
mod delete;
mod edit;
mod history;
mod move_task;
mod tasks;

pub use add::AddCommand;
pub use delete::DeleteCommand;
pub use edit::EditCommand;
pub use history::HistoryCommand;
pub use move_task::MoveCommand;
pub use tasks::TasksCommand;

use crate::tasks::TaskStore;
use kanban_chat::ChatSession;

/// Result of executing a slash command
#[derive(Debug, PartialEq, Eq)]
pub enum CommandResult {
    /// Show a message to the user (not sent to the assistant)
    Message(String),
    /// Exit the application
    Exit,
    /// Unknown command
    Unknown(String),
}

/// Parse and execute a slash command
pub fn execute_command(
    input: &str,
    tasks: &mut TaskStore,
    session: &ChatSession,
) -> Option<CommandResult> {
    let input = input.trim();

    let rest = input.strip_prefix('/')?;
    let (command, args) = match rest.split_once(char::is_whitespace) {
        Some((command, args)) => (command.to_lowercase(), args.trim()),
        None => (rest.to_lowercase(), ""),
    };

    Some(match command.as_str() {
        "help" | "h" | "?" => CommandResult::Message(help_message()),

        "quit" | "exit" | "q" => CommandResult::Exit,

        "tasks" | "t" | "board" => TasksCommand::execute(tasks),

        "add" | "a" => AddCommand::execute(args, tasks),

        "move" | "mv" => MoveCommand::execute(args, tasks),

        "edit" | "e" => EditCommand::execute(args, tasks),

        "delete" | "del" | "rm" => DeleteCommand::execute(args, tasks),

        "history" => HistoryCommand::execute(args, session),

        _ => CommandResult::Unknown(command),
    })
}

fn help_message() -> String {
    r#"Available commands:
  /help, /h, /?                 Show this help message
  /tasks, /t                    Show the board
  /add, /a <title> [opts]       Add a task
                                  opts: priority:<low|medium|high>
                                        column:<todo|in_progress|review|done>
                                        due:<YYYY-MM-DD> category:<name>
  /edit, /e <task> [opts]       Change a task
                                  opts: title:<text> desc:<text>
                                        priority:, due: (or due:none), category:
  /move, /mv <task> <column>    Move a task to another column
  /delete, /rm <task>           Delete a task
  /history [n]                  Show the last n chat messages
  /quit, /q                     Exit

Tasks are matched by id prefix or exact title.
Anything else is sent to the assistant along with the board."#
        .to_string()
}
