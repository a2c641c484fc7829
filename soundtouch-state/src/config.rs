//! Per-device configuration

use serde::{Deserialize, Serialize};
use soundtouch_api::DeviceId;

/// How to reach one device and what to call it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceConfig {
    /// MAC address, used as the device identity
    pub mac: DeviceId,
    /// Host name or IP address of the device
    pub host: String,
    /// Display name; the device reported name is used when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl DeviceConfig {
    pub fn new(mac: impl AsRef<str>, host: impl Into<String>) -> Self {
        Self {
            mac: DeviceId::new(mac),
            host: host.into(),
            name: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Name shown before the device reports its own
    pub fn initial_display_name(&self) -> String {
        self.name
            .clone()
            .unwrap_or_else(|| self.mac.as_str().to_string())
    }
}
