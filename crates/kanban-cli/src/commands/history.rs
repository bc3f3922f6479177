//! /history command - show recent chat messages

use super::CommandResult;
use kanban_ai::Role;
use kanban_chat::ChatSession;

const DEFAULT_COUNT: usize = 10;

pub struct HistoryCommand;

impl HistoryCommand {
    pub fn execute(args: &str, session: &ChatSession) -> CommandResult {
        let count = if args.is_empty() {
            DEFAULT_COUNT
        } else {
            match args.parse::<usize>() {
                Ok(n) => n,
                Err(_) => return CommandResult::Message(format!("Not a number: '{}'", args)),
            }
        };

        let messages = session.messages();
        if messages.is_empty() {
            return CommandResult::Message("No messages yet.".to_string());
        }

        let start = messages.len().saturating_sub(count);
        let mut output = format!("Messages {}-{} of {}\n", start + 1, messages.len(), messages.len());
        output.push_str(&"-".repeat(40));
        for message in &messages[start..] {
            let who = match message.role {
                Role::User => "you",
                Role::Assistant => "assistant",
            };
            output.push_str(&format!("\n{:>9}: {}", who, message.content));
        }
        CommandResult::Message(output)
    }
}
