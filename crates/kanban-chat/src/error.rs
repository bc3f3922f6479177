//! Error types for kanban-chat

use thiserror::Error;

/// Result type alias using kanban-chat Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors returned by conversation and session operations.
///
/// Transport and decode failures never surface here: they end the turn with
/// an advisory message instead. These are precondition violations only, plus
/// the store's own errors.
#[derive(Error, Debug)]
pub enum Error {
    /// An error from the wire layer
    #[error(transparent)]
    Ai(#[from] kanban_ai::Error),

    /// A turn is already awaiting its response
    #[error("A response is still streaming")]
    TurnInFlight,

    /// History was already loaded, or a turn was already submitted
    #[error("Conversation already hydrated")]
    AlreadyHydrated,

    /// Nothing to send after trimming
    #[error("Message is empty")]
    EmptyInput,

    /// The in-flight message for a turn could not be located or was sealed
    #[error("No in-flight message for turn {0}")]
    NotInFlight(uuid::Uuid),

    /// Reading or writing the message store failed
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// A generic error
    #[error("{0}")]
    Other(String),
}
