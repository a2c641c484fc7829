//! SoundTouchSystem - Main entry point for the SDK
//!
//! Owns the device registry shared by every device, the connector used to
//! reach them, and the device handles themselves.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use soundtouch_state::{DeviceConfig, DeviceEvent, DeviceId, DeviceRegistry, SoundTouchDevice};
use soundtouch_stream::{Connector, WebSocketConnector};
use tokio::sync::broadcast;
use tracing::{info, warn};

use crate::command::ControlCommand;
use crate::config::SystemConfig;
use crate::error::{Result, SdkError};

/// Buffered system-wide events before slow subscribers lose the oldest
const EVENT_CAPACITY: usize = 1024;

/// Main system entry point
///
/// SoundTouchSystem is fully synchronous - no async/await required.
///
/// # Example
///
/// ```rust,no_run
/// use soundtouch_sdk::{SoundTouchSystem, SystemConfig};
///
/// fn main() -> Result<(), soundtouch_sdk::SdkError> {
///     let system = SoundTouchSystem::from_config(SystemConfig::load_default()?)?;
///
///     let kitchen = system
///         .device_by_name("Kitchen")
///         .ok_or_else(|| soundtouch_sdk::SdkError::DeviceNotFound("Kitchen".to_string()))?;
///     kitchen.set_volume(20)?;
///     kitchen.zone_add("Living Room")?;
///     println!("{}", kitchen.zone_summary());
///
///     let mut events = system.subscribe();
///     while let Ok(event) = events.blocking_recv() {
///         println!("{}: {:?}", event.device_id, event.change);
///     }
///     Ok(())
/// }
/// ```
pub struct SoundTouchSystem {
    registry: DeviceRegistry,
    connector: Arc<dyn Connector>,
    devices: RwLock<HashMap<DeviceId, Arc<SoundTouchDevice>>>,
    events: broadcast::Sender<DeviceEvent>,
}

impl SoundTouchSystem {
    /// Connect to every configured device over websockets
    pub fn from_config(config: SystemConfig) -> Result<Self> {
        let connector = Arc::new(WebSocketConnector::new(config.connection.clone())?);
        let system = Self::with_connector(connector);
        for device in config.devices {
            system.add_device(device)?;
        }
        Ok(system)
    }

    /// An empty system reaching devices through `connector`
    pub fn with_connector(connector: Arc<dyn Connector>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            registry: DeviceRegistry::new(),
            connector,
            devices: RwLock::new(HashMap::new()),
            events,
        }
    }

    /// Register a device and open its connection
    ///
    /// A failed connection attempt leaves the device registered and offline;
    /// the next command reconnects.
    pub fn add_device(&self, config: DeviceConfig) -> Result<Arc<SoundTouchDevice>> {
        let device = Arc::new(SoundTouchDevice::with_events(
            config,
            self.registry.clone(),
            Arc::clone(&self.connector),
            self.events.clone(),
        )?);
        if let Err(err) = device.open() {
            warn!(device = %device.id(), error = %err, "Initial connection failed");
        }
        info!(device = %device.id(), name = %device.display_name(), "Added device");
        self.devices
            .write()
            .insert(device.id().clone(), Arc::clone(&device));
        Ok(device)
    }

    /// Dispose a device and forget it
    pub fn remove_device(&self, id: &DeviceId) -> Result<()> {
        let device = self
            .devices
            .write()
            .remove(id)
            .ok_or_else(|| SdkError::DeviceNotFound(id.to_string()))?;
        device.dispose();
        info!(device = %id, "Removed device");
        Ok(())
    }

    pub fn device(&self, id: &DeviceId) -> Option<Arc<SoundTouchDevice>> {
        self.devices.read().get(id).cloned()
    }

    /// Find a device by display name, ignoring case
    pub fn device_by_name(&self, name: &str) -> Option<Arc<SoundTouchDevice>> {
        let entry = self.registry.lookup_by_name(name)?;
        self.device(entry.id())
    }

    /// Find a device by identity or display name
    pub fn resolve(&self, identifier: &str) -> Option<Arc<SoundTouchDevice>> {
        let entry = self.registry.resolve(identifier)?;
        self.device(entry.id())
    }

    pub fn devices(&self) -> Vec<Arc<SoundTouchDevice>> {
        self.devices.read().values().cloned().collect()
    }

    pub fn device_names(&self) -> Vec<String> {
        self.devices
            .read()
            .values()
            .map(|device| device.display_name())
            .collect()
    }

    pub fn registry(&self) -> &DeviceRegistry {
        &self.registry
    }

    /// Receive changes of every device from now on
    pub fn subscribe(&self) -> broadcast::Receiver<DeviceEvent> {
        self.events.subscribe()
    }

    /// Run a command on the device named by `identifier`
    pub fn execute(&self, identifier: &str, command: &ControlCommand) -> Result<()> {
        let device = self
            .resolve(identifier)
            .ok_or_else(|| SdkError::DeviceNotFound(identifier.to_string()))?;
        info!(device = %device.id(), %command, "Executing command");
        command.execute(&device)
    }

    /// Parse and run a free-text command
    pub fn execute_text(&self, identifier: &str, command: &str) -> Result<()> {
        self.execute(identifier, &ControlCommand::parse(command)?)
    }
}

impl Drop for SoundTouchSystem {
    fn drop(&mut self) {
        for device in self.devices.get_mut().values() {
            device.dispose();
        }
    }
}
