use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SdkError {
    #[error("State management error: {0}")]
    StateError(#[from] soundtouch_state::StateError),

    #[error("API error: {0}")]
    ApiError(#[from] soundtouch_api::ApiError),

    #[error("Connection error: {0}")]
    StreamError(#[from] soundtouch_stream::StreamError),

    #[error("Device not found: {0}")]
    DeviceNotFound(String),

    #[error("Invalid command: {0}")]
    InvalidCommand(String),

    #[error("Failed to read config {path}: {source}")]
    ConfigIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config: {0}")]
    InvalidConfig(#[from] serde_json::Error),

    #[error("No configuration directory available on this platform")]
    NoConfigDir,
}

pub type Result<T> = std::result::Result<T, SdkError>;
