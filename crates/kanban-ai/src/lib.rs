//! kanban-ai: wire layer for the task board's chat assistant
//!
//! Turns a chunked, line-delimited event-stream response into text deltas:
//! [`decoder`] frames lines, [`parser`] classifies them, [`stream`] glues the
//! two together over an async byte stream, and [`client`] opens the request.

pub mod client;
pub mod decoder;
pub mod error;
pub mod parser;
pub mod stream;
pub mod types;

pub use client::{ChatClient, StatusClass, TransportOutcome, classify_status};
pub use decoder::FrameDecoder;
pub use error::{Error, Result};
pub use parser::{EventParser, ParseOutcome, StreamEvent};
pub use stream::{ChunkStream, DEFAULT_MAX_PARSE_ATTEMPTS, DeltaDecoder, DeltaStream, decode_stream};
pub use types::*;
