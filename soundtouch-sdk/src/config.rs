//! JSON device list
//!
//! ```json
//! {
//!   "connection": { "port": 8080, "read_timeout_secs": 300 },
//!   "devices": [
//!     { "mac": "A0F6FD12ABCD", "host": "192.168.1.20", "name": "Kitchen" },
//!     { "mac": "B1B1B1B1B1B1", "host": "192.168.1.21" }
//!   ]
//! }
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use soundtouch_state::DeviceConfig;
use soundtouch_stream::ConnectionConfig;
use tracing::debug;

use crate::error::{Result, SdkError};

/// Overrides the directory holding the device list
pub const CONFIG_DIR_ENV: &str = "SOUNDTOUCH_CONFIG_DIR";

const CONFIG_SUBDIR: &str = "soundtouch";
const CONFIG_FILE: &str = "devices.json";

/// Connection settings plus the devices to manage
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SystemConfig {
    #[serde(default)]
    pub connection: ConnectionConfig,
    #[serde(default)]
    pub devices: Vec<DeviceConfig>,
}

impl SystemConfig {
    pub fn new(devices: Vec<DeviceConfig>) -> Self {
        Self {
            connection: ConnectionConfig::default(),
            devices,
        }
    }

    pub fn with_connection(mut self, connection: ConnectionConfig) -> Self {
        self.connection = connection;
        self
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!(path = %path.display(), "Loading device configuration");
        let json = std::fs::read_to_string(path).map_err(|source| SdkError::ConfigIo {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    /// Load from [`default_path`]
    pub fn load_default() -> Result<Self> {
        Self::from_file(default_path()?)
    }

    /// Device list as pretty JSON; connection settings are left out
    pub fn devices_to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&DeviceList {
            devices: &self.devices,
        })?)
    }
}

/// Directory holding the device list
///
/// `SOUNDTOUCH_CONFIG_DIR` wins over the platform config directory.
pub fn config_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var(CONFIG_DIR_ENV) {
        return Ok(PathBuf::from(dir));
    }
    dirs::config_dir()
        .map(|dir| dir.join(CONFIG_SUBDIR))
        .ok_or(SdkError::NoConfigDir)
}

pub fn default_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE))
}

#[derive(Debug, Serialize)]
struct DeviceList<'a> {
    devices: &'a [DeviceConfig],
}
