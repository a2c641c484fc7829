//! Error types for the soundtouch-stream crate.

use std::time::Duration;

/// Errors raised by the push connection and the response parser.
#[derive(Debug, thiserror::Error)]
pub enum StreamError {
    /// The websocket could not be opened or failed while open
    #[error("Connection error: {0}")]
    Connection(String),

    /// The connection was already closed when a frame was sent
    #[error("Connection closed")]
    ChannelClosed,

    /// An inbound message could not be read as XML
    #[error("Malformed message: {0}")]
    MalformedMessage(String),

    /// The device address does not form a valid websocket url
    #[error("Invalid url: {0}")]
    InvalidUrl(String),

    /// Nothing was received within the configured period
    #[error("Timed out after {0:?}")]
    Timeout(Duration),
}

impl From<tokio_tungstenite::tungstenite::Error> for StreamError {
    fn from(error: tokio_tungstenite::tungstenite::Error) -> Self {
        StreamError::Connection(error.to_string())
    }
}

/// Convenience type alias for Results using StreamError.
pub type Result<T> = std::result::Result<T, StreamError>;
