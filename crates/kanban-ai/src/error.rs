//! Error types for kanban-ai

use thiserror::Error;

/// Result type alias using kanban-ai Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while talking to the chat endpoint
#[derive(Error, Debug)]
pub enum Error {
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Endpoint answered 429
    #[error("Rate limited")]
    RateLimited,

    /// Endpoint answered 402
    #[error("Usage quota exhausted")]
    QuotaExhausted,

    /// Endpoint answered with any other non-success status
    #[error("Unexpected status {status}: {body}")]
    Status { status: u16, body: String },

    /// Successful status but nothing to stream
    #[error("Response has no body")]
    MissingBody,

    /// The byte stream failed after it was opened
    #[error("Stream error: {0}")]
    Stream(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl Error {
    /// Create a status error from a code and a response body
    pub fn status(status: u16, body: impl Into<String>) -> Self {
        Self::Status {
            status,
            body: body.into(),
        }
    }

    /// Whether this error maps to a dedicated, user-facing advisory rather
    /// than the generic failure message.
    pub fn is_advisory(&self) -> bool {
        matches!(self, Error::RateLimited | Error::QuotaExhausted)
    }

    /// HTTP status code carried by this error, if any
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Error::RateLimited => Some(429),
            Error::QuotaExhausted => Some(402),
            Error::Status { status, .. } => Some(*status),
            Error::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
