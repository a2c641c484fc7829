//! # SoundTouch SDK
//!
//! Keeps a live model of Bose SoundTouch devices over their websocket push
//! API and controls them, including multi-room zones:
//!
//! ```rust,no_run
//! use soundtouch_sdk::{DeviceConfig, SoundTouchSystem, SystemConfig};
//!
//! fn main() -> Result<(), soundtouch_sdk::SdkError> {
//!     let system = SoundTouchSystem::from_config(SystemConfig::new(vec![
//!         DeviceConfig::new("A0F6FD12ABCD", "192.168.1.20").with_name("Kitchen"),
//!         DeviceConfig::new("B1B1B1B1B1B1", "192.168.1.21").with_name("Living Room"),
//!     ]))?;
//!
//!     system.execute_text("Kitchen", "preset 2")?;
//!     system.execute_text("Kitchen", "zone add Living Room")?;
//!
//!     for device in system.devices() {
//!         println!("{}: {} {}", device.display_name(), device.operation_mode(), device.zone_summary());
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! soundtouch-sdk (system, config, text commands)
//!     ↓
//! soundtouch-state (device model, registry, zones)
//!     ↓
//! soundtouch-stream (websocket connection, response state machine)
//!     ↓
//! soundtouch-api (content model, request encoding)
//! ```

pub mod command;
pub mod config;
mod error;
mod system;

pub use command::ControlCommand;
pub use config::SystemConfig;
pub use error::{Result, SdkError};
pub use system::SoundTouchSystem;

// Re-export commonly used types from the lower layers
pub use soundtouch_state::{
    init_logging, init_logging_from_env, Connectivity, ContentItem, DeviceChange, DeviceConfig,
    DeviceEvent, DeviceId, LoggingMode, NowPlaying, OperationMode, Preset, RadioStation,
    RemoteKey, SoundTouchDevice, ZoneMember, ZoneState,
};
pub use soundtouch_stream::ConnectionConfig;
