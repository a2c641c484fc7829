//! SoundTouch device state
//!
//! Keeps a local model of each SoundTouch device in sync with the push
//! messages it sends, and coordinates zones (multi-room groups) across
//! devices through an explicitly shared [`DeviceRegistry`].
//!
//! # Architecture
//!
//! ```text
//! Connector → parse_message → DeviceModel::apply → DeviceChange subscribers
//!                                  │
//!                          ZoneCoordinator ──→ DeviceRegistry (other devices)
//! ```
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use soundtouch_state::{DeviceConfig, DeviceRegistry, SoundTouchDevice};
//! use soundtouch_stream::{ConnectionConfig, WebSocketConnector};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let registry = DeviceRegistry::new();
//! let connector = Arc::new(WebSocketConnector::new(ConnectionConfig::default())?);
//!
//! let kitchen = SoundTouchDevice::new(
//!     DeviceConfig::new("A0F6FD12ABCD", "192.168.1.20").with_name("Kitchen"),
//!     registry.clone(),
//!     connector,
//! )?;
//! kitchen.open()?;
//!
//! let mut changes = kitchen.subscribe();
//! kitchen.set_volume(25)?;
//! println!("{:?}", changes.blocking_recv()?);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod device;
pub mod error;
pub mod logging;
pub mod model;
pub mod operation_mode;
pub mod registry;
pub mod zone;

pub use config::DeviceConfig;
pub use device::SoundTouchDevice;
pub use error::{Result, StateError};
pub use logging::{init_logging, init_logging_from_env, LoggingError, LoggingMode};
pub use model::{DeviceChange, DeviceEvent, DeviceModel, NowPlaying, Outcome};
pub use operation_mode::resolve_operation_mode;
pub use registry::{DeviceRegistry, RegisteredDevice};
pub use zone::{zone_summary, ZoneCoordinator};

// Re-exported so callers need only this crate for the common types
pub use soundtouch_api::{
    Connectivity, ContentItem, DeviceId, OperationMode, Preset, RadioStation, RemoteKey, Source,
    ZoneMember, ZoneState,
};
