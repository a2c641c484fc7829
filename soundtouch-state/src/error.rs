//! Error types for soundtouch-state

use std::fmt;

use soundtouch_api::DeviceId;

/// Result type for soundtouch-state operations
pub type Result<T> = std::result::Result<T, StateError>;

/// Errors that can occur while managing device state
#[derive(Debug)]
pub enum StateError {
    /// Error from soundtouch-api
    Api(soundtouch_api::ApiError),

    /// Error from the push connection
    Stream(soundtouch_stream::StreamError),

    /// No registered device matches the identity or name
    DeviceNotFound(String),

    /// A device with this identity is already registered
    AlreadyRegistered(DeviceId),

    /// The device is already a member of this zone
    AlreadyZoneMember(DeviceId),

    /// The device is not a member of this zone
    NotZoneMember(DeviceId),

    /// A command parameter was rejected
    InvalidParameter(String),

    /// The device was disposed and accepts no more commands
    Disposed(DeviceId),
}

impl fmt::Display for StateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StateError::Api(err) => write!(f, "API error: {}", err),
            StateError::Stream(err) => write!(f, "Stream error: {}", err),
            StateError::DeviceNotFound(target) => write!(f, "Device not found: {}", target),
            StateError::AlreadyRegistered(id) => write!(f, "Device already registered: {}", id),
            StateError::AlreadyZoneMember(id) => write!(f, "Device {} is already a zone member", id),
            StateError::NotZoneMember(id) => write!(f, "Device {} is not a zone member", id),
            StateError::InvalidParameter(msg) => write!(f, "Invalid parameter: {}", msg),
            StateError::Disposed(id) => write!(f, "Device {} has been disposed", id),
        }
    }
}

impl std::error::Error for StateError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StateError::Api(err) => Some(err),
            StateError::Stream(err) => Some(err),
            _ => None,
        }
    }
}

impl From<soundtouch_api::ApiError> for StateError {
    fn from(err: soundtouch_api::ApiError) -> Self {
        StateError::Api(err)
    }
}

impl From<soundtouch_stream::StreamError> for StateError {
    fn from(err: soundtouch_stream::StreamError) -> Self {
        StateError::Stream(err)
    }
}
