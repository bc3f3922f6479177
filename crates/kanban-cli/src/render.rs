//! Prints chat events to a terminal as they arrive

use kanban_chat::ChatEvent;
use std::io::{self, Write};

/// Writes only the new suffix of the streaming message on each update.
pub struct StreamPrinter<W: Write> {
    out: W,
    printed: usize,
}

impl<W: Write> StreamPrinter<W> {
    pub fn new(out: W) -> Self {
        Self { out, printed: 0 }
    }

    pub fn render(&mut self, event: &ChatEvent) -> io::Result<()> {
        match event {
            ChatEvent::MessageUpdate { message, .. } => {
                if let Some(new_text) = message.content.get(self.printed..) {
                    write!(self.out, "{}", new_text)?;
                    self.out.flush()?;
                }
                self.printed = message.content.len();
            }
            ChatEvent::MessageEnd { .. } => {
                writeln!(self.out)?;
                self.printed = 0;
            }
            ChatEvent::Advisory { message, .. } => {
                writeln!(self.out, "[{}]", message.content)?;
            }
            ChatEvent::TurnEnd { .. } => {
                if self.printed > 0 {
                    writeln!(self.out)?;
                    self.printed = 0;
                }
                self.out.flush()?;
            }
            _ => {}
        }
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kanban_ai::Role;
    use kanban_chat::{AdvisoryKind, ChatMessage, MessageState, TurnOutcome};
    use uuid::Uuid;

    fn streaming(content: &str) -> ChatMessage {
        ChatMessage {
            role: Role::Assistant,
            content: content.to_string(),
            turn_id: None,
            state: MessageState::Streaming,
        }
    }

    #[test]
    fn test_prints_only_new_text() {
        let turn_id = Uuid::new_v4();
        let mut printer = StreamPrinter::new(Vec::new());
        for text in ["Hel", "Hello", "Hello, wörld"] {
            printer
                .render(&ChatEvent::MessageUpdate {
                    turn_id,
                    index: 1,
                    message: streaming(text),
                })
                .unwrap();
        }
        printer
            .render(&ChatEvent::MessageEnd {
                turn_id,
                index: 1,
                message: streaming("Hello, wörld"),
            })
            .unwrap();
        printer
            .render(&ChatEvent::TurnEnd {
                turn_id,
                outcome: TurnOutcome::Completed {
                    content: "Hello, wörld".into(),
                },
            })
            .unwrap();
        assert_eq!(String::from_utf8(printer.into_inner()).unwrap(), "Hello, wörld\n");
    }

    #[test]
    fn test_advisory_is_bracketed() {
        let turn_id = Uuid::new_v4();
        let mut printer = StreamPrinter::new(Vec::new());
        printer
            .render(&ChatEvent::Advisory {
                turn_id,
                kind: AdvisoryKind::RateLimited,
                index: 1,
                message: ChatMessage::sealed(Role::Assistant, AdvisoryKind::RateLimited.text(), None),
            })
            .unwrap();
        assert_eq!(
            String::from_utf8(printer.into_inner()).unwrap(),
            format!("[{}]\n", AdvisoryKind::RateLimited.text())
        );
    }
}
