//! Device registry
//!
//! Maps device identities to the devices currently managed by one system.
//! Zone masters and members are stored as identities and resolved here on
//! demand, so removing a device never leaves a dangling reference: the next
//! lookup simply comes back empty.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use soundtouch_api::DeviceId;
use tracing::debug;

use crate::error::{Result, StateError};

/// A device as seen by other devices through the registry
#[derive(Debug)]
pub struct RegisteredDevice {
    id: DeviceId,
    host: String,
    display_name: RwLock<String>,
}

impl RegisteredDevice {
    pub fn new(id: DeviceId, host: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            id,
            host: host.into(),
            display_name: RwLock::new(display_name.into()),
        }
    }

    pub fn id(&self) -> &DeviceId {
        &self.id
    }

    /// Network address used for zone topology pushes
    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn display_name(&self) -> String {
        self.display_name.read().clone()
    }

    pub fn set_display_name(&self, name: impl Into<String>) {
        *self.display_name.write() = name.into();
    }
}

/// Shared lookup table from identity to registered device
///
/// Cloning is cheap; clones share the same table.
#[derive(Debug, Clone, Default)]
pub struct DeviceRegistry {
    devices: Arc<RwLock<HashMap<DeviceId, Arc<RegisteredDevice>>>>,
}

impl DeviceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a device; an identity can only be registered once
    pub fn register(&self, device: RegisteredDevice) -> Result<Arc<RegisteredDevice>> {
        let mut devices = self.devices.write();
        if devices.contains_key(device.id()) {
            return Err(StateError::AlreadyRegistered(device.id().clone()));
        }
        let device = Arc::new(device);
        debug!(id = %device.id(), host = device.host(), "Registered device");
        devices.insert(device.id().clone(), Arc::clone(&device));
        Ok(device)
    }

    pub fn unregister(&self, id: &DeviceId) -> Option<Arc<RegisteredDevice>> {
        let removed = self.devices.write().remove(id);
        if removed.is_some() {
            debug!(%id, "Unregistered device");
        }
        removed
    }

    pub fn lookup(&self, id: &DeviceId) -> Option<Arc<RegisteredDevice>> {
        self.devices.read().get(id).cloned()
    }

    /// Find a device by display name, ignoring case
    pub fn lookup_by_name(&self, name: &str) -> Option<Arc<RegisteredDevice>> {
        let wanted = name.trim();
        self.devices
            .read()
            .values()
            .find(|device| device.display_name().eq_ignore_ascii_case(wanted))
            .cloned()
    }

    /// Find a device by identity first, then by display name
    pub fn resolve(&self, identifier: &str) -> Option<Arc<RegisteredDevice>> {
        self.lookup(&DeviceId::new(identifier))
            .or_else(|| self.lookup_by_name(identifier))
    }

    /// Display name of a device, if it is registered
    pub fn display_name(&self, id: &DeviceId) -> Option<String> {
        self.lookup(id).map(|device| device.display_name())
    }

    pub fn ids(&self) -> Vec<DeviceId> {
        self.devices.read().keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.devices.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.read().is_empty()
    }
}
