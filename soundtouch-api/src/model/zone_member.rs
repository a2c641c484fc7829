//! Zone member type

use serde::{Deserialize, Serialize};

use super::DeviceId;

/// A device participating in a zone, as listed by the zone master
///
/// Holds only the member's identity and address. The live device, if any,
/// is found by looking the mac up in a registry; the member itself never
/// owns a reference to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneMember {
    mac: Option<DeviceId>,
    ip_address: String,
}

impl ZoneMember {
    /// Create a member whose identity is known
    pub fn new(mac: DeviceId, ip_address: impl Into<String>) -> Self {
        Self {
            mac: Some(mac),
            ip_address: ip_address.into(),
        }
    }

    /// Create a member from its address only; the mac arrives later
    pub fn from_address(ip_address: impl Into<String>) -> Self {
        Self {
            mac: None,
            ip_address: ip_address.into(),
        }
    }

    pub fn mac(&self) -> Option<&DeviceId> {
        self.mac.as_ref()
    }

    pub fn set_mac(&mut self, mac: DeviceId) {
        self.mac = Some(mac);
    }

    pub fn ip_address(&self) -> &str {
        &self.ip_address
    }

    /// Check if this member refers to the given device
    pub fn is(&self, id: &DeviceId) -> bool {
        self.mac.as_ref() == Some(id)
    }
}
