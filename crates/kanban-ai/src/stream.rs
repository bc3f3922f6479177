//! Incremental delta decoding over chunked byte streams

use crate::decoder::FrameDecoder;
use crate::error::Result;
use crate::parser::{EventParser, ParseOutcome, StreamEvent};
use async_stream::stream;
use futures::StreamExt;
use std::pin::Pin;
use tokio_stream::Stream;

/// Raw response body chunks, in arrival order
pub type ChunkStream = Pin<Box<dyn Stream<Item = Result<Vec<u8>>> + Send>>;

/// Decoded stream events
pub type DeltaStream = Pin<Box<dyn Stream<Item = Result<StreamEvent>> + Send>>;

/// Default number of times a malformed data line is parsed before it is
/// dropped.
pub const DEFAULT_MAX_PARSE_ATTEMPTS: u32 = 3;

#[derive(Debug)]
struct Stalled {
    line: String,
    attempts: u32,
}

/// Frame decoder and event parser glued together.
///
/// A data line whose payload fails to parse is pushed back onto the frame
/// buffer and the rest of the chunk is left for the next [`feed`](Self::feed).
/// The same line is retried up to `max_parse_attempts` times in total; after
/// that it is dropped with a warning so one bad record cannot stall the stream.
#[derive(Debug)]
pub struct DeltaDecoder {
    frames: FrameDecoder,
    parser: EventParser,
    max_parse_attempts: u32,
    stalled: Option<Stalled>,
    dropped_lines: usize,
}

impl Default for DeltaDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl DeltaDecoder {
    pub fn new() -> Self {
        Self::with_max_parse_attempts(DEFAULT_MAX_PARSE_ATTEMPTS)
    }

    /// Create a decoder with a custom retry bound (clamped to at least 1).
    pub fn with_max_parse_attempts(max_parse_attempts: u32) -> Self {
        Self {
            frames: FrameDecoder::new(),
            parser: EventParser::new(),
            max_parse_attempts: max_parse_attempts.max(1),
            stalled: None,
            dropped_lines: 0,
        }
    }

    /// Feed one chunk and drain the events it completes.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<StreamEvent> {
        if self.parser.is_finished() {
            return Vec::new();
        }
        self.frames.push(chunk);
        self.drain(false)
    }

    /// Signal end of input.
    ///
    /// Complete lines still buffered are parsed one last time; a line that
    /// still fails is dropped, and an unterminated remainder is discarded.
    pub fn finish(&mut self) -> Vec<StreamEvent> {
        let events = if self.parser.is_finished() {
            Vec::new()
        } else {
            self.drain(true)
        };
        let dropped = self.frames.discard_remainder();
        if dropped > 0 {
            tracing::debug!("Discarding {} bytes of unterminated trailing data", dropped);
        }
        events
    }

    /// Whether the `[DONE]` sentinel has been seen
    pub fn is_done(&self) -> bool {
        self.parser.is_finished()
    }

    /// Number of malformed data lines given up on so far
    pub fn dropped_lines(&self) -> usize {
        self.dropped_lines
    }

    fn drain(&mut self, closing: bool) -> Vec<StreamEvent> {
        let mut events = Vec::new();

        while let Some(line) = self.frames.next_line() {
            match self.parser.parse_line(&line) {
                ParseOutcome::Parsed(event) => {
                    self.stalled = None;
                    let done = event == StreamEvent::Done;
                    events.push(event);
                    if done {
                        self.frames.discard_remainder();
                        break;
                    }
                }
                ParseOutcome::Ignored => {
                    self.stalled = None;
                }
                ParseOutcome::NeedMoreData => {
                    let attempts = match &self.stalled {
                        Some(stalled) if stalled.line == line => stalled.attempts + 1,
                        _ => 1,
                    };

                    if closing || attempts >= self.max_parse_attempts {
                        tracing::warn!(
                            "Dropping malformed data line after {} attempt(s): {}",
                            attempts,
                            line
                        );
                        self.stalled = None;
                        self.dropped_lines += 1;
                        continue;
                    }

                    self.frames.push_front(&line);
                    self.stalled = Some(Stalled { line, attempts });
                    break;
                }
            }
        }

        events
    }
}

/// Decode a chunk stream into stream events.
///
/// The returned stream ends after `Done`, after the first chunk error (which
/// is yielded), or when the underlying chunks run out.
pub fn decode_stream(mut chunks: ChunkStream, max_parse_attempts: u32) -> DeltaStream {
    Box::pin(stream! {
        let mut decoder = DeltaDecoder::with_max_parse_attempts(max_parse_attempts);

        while let Some(chunk) = chunks.next().await {
            match chunk {
                Ok(bytes) => {
                    for event in decoder.feed(&bytes) {
                        yield Ok(event);
                    }
                    if decoder.is_done() {
                        return;
                    }
                }
                Err(e) => {
                    yield Err(e);
                    return;
                }
            }
        }

        for event in decoder.finish() {
            yield Ok(event);
        }
    })
}
