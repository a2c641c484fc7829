//! Configuration types for the soundtouch-stream crate
//!
//! This module defines the settings used when opening the push connection
//! to a device.

use serde::Deserialize;
use std::time::Duration;

/// Configuration for device push connections
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ConnectionConfig {
    /// Websocket port on the device
    /// Default: 8080
    pub port: u16,

    /// Websocket sub-protocol requested in the handshake
    /// Default: "gabbo"
    pub protocol: String,

    /// Idle period after which a silent connection is treated as failed
    /// Default: 300 seconds
    #[serde(rename = "read_timeout_secs", with = "secs")]
    pub read_timeout: Duration,

    /// Maximum time allowed for the websocket handshake
    /// Default: 10 seconds
    #[serde(rename = "connect_timeout_secs", with = "secs")]
    pub connect_timeout: Duration,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            protocol: "gabbo".to_string(),
            read_timeout: Duration::from_secs(300), // 5 minutes
            connect_timeout: Duration::from_secs(10),
        }
    }
}

impl ConnectionConfig {
    /// Create a new ConnectionConfig with default values
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_protocol(mut self, protocol: impl Into<String>) -> Self {
        self.protocol = protocol.into();
        self
    }

    pub fn with_read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = timeout;
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Websocket url for a device host
    pub fn url_for(&self, host: &str) -> String {
        format!("ws://{}:{}/", host, self.port)
    }
}

mod secs {
    use serde::{Deserialize, Deserializer};
    use std::time::Duration;

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        u64::deserialize(deserializer).map(Duration::from_secs)
    }
}
