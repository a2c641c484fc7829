use thiserror::Error;

/// Errors raised while building requests for a SoundTouch device
///
/// The encoder never performs I/O, so every variant describes a value that
/// cannot be represented on the wire.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Invalid parameter value
    ///
    /// Returned when a command parameter is outside the range the device
    /// accepts, such as a volume above 100 or a preset slot outside 1..=6.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Unknown remote key name
    #[error("Unknown remote key: {0}")]
    UnknownKey(String),
}

impl ApiError {
    /// Create an out-of-range error for a named parameter
    pub fn out_of_range(parameter: &str, value: impl std::fmt::Display, min: i64, max: i64) -> Self {
        Self::InvalidParameter(format!(
            "Parameter '{}' value {} is out of range [{}, {}]",
            parameter, value, min, max
        ))
    }
}

/// Type alias for results that can return an ApiError
pub type Result<T> = std::result::Result<T, ApiError>;
