//! Event-stream line classification
//!
//! Each decoded line is one of: a comment or keep-alive, an unknown line kind,
//! a `data: ` record carrying a JSON payload, or the `[DONE]` sentinel.

use serde_json::Value;

/// Prefix that marks a data record
pub const DATA_PREFIX: &str = "data: ";

/// Payload that signals normal end of stream
pub const DONE_SENTINEL: &str = "[DONE]";

/// An event extracted from a data record
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    /// Incremental text fragment
    Delta(String),
    /// The sentinel was seen; nothing after it is parsed
    Done,
}

/// Result of parsing one line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseOutcome {
    /// The line produced an event
    Parsed(StreamEvent),
    /// Comment, blank keep-alive, unknown line kind, or a record with no
    /// visible text
    Ignored,
    /// The payload is not valid JSON yet. The caller should re-buffer the line
    /// and retry once more bytes have arrived.
    NeedMoreData,
}

/// Classifies decoded lines and extracts `choices[0].delta.content`.
#[derive(Debug, Default)]
pub struct EventParser {
    finished: bool,
}

impl EventParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the sentinel has been seen
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Parse one decoded line.
    ///
    /// Once the sentinel has been seen every further line is ignored.
    pub fn parse_line(&mut self, line: &str) -> ParseOutcome {
        if self.finished {
            return ParseOutcome::Ignored;
        }
        if line.starts_with(':') || line.trim().is_empty() {
            return ParseOutcome::Ignored;
        }
        let Some(payload) = line.strip_prefix(DATA_PREFIX) else {
            return ParseOutcome::Ignored;
        };

        let payload = payload.trim();
        if payload == DONE_SENTINEL {
            self.finished = true;
            return ParseOutcome::Parsed(StreamEvent::Done);
        }

        match serde_json::from_str::<Value>(payload) {
            Ok(value) => match extract_delta(&value) {
                Some(text) if !text.is_empty() => {
                    ParseOutcome::Parsed(StreamEvent::Delta(text.to_string()))
                }
                _ => ParseOutcome::Ignored,
            },
            Err(e) => {
                tracing::trace!("Data payload not parseable yet ({}): {}", e, payload);
                ParseOutcome::NeedMoreData
            }
        }
    }
}

/// Navigate `choices[0].delta.content`, tolerating any missing step.
fn extract_delta(value: &Value) -> Option<&str> {
    value
        .get("choices")
        .and_then(|choices| choices.get(0))
        .and_then(|choice| choice.get("delta"))
        .and_then(|delta| delta.get("content"))
        .and_then(Value::as_str)
}
