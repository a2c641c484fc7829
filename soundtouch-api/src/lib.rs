//! Content model and request encoding for SoundTouch devices
//!
//! This crate holds the value types shared by every layer of the workspace
//! (content items, presets, zone members, operation modes, remote keys) and
//! the [`RequestEncoder`] that turns commands into outbound protocol frames.
//! It performs no I/O.
//!
//! # Request encoding
//!
//! ```rust
//! use soundtouch_api::{DeviceId, Query, RemoteKey, KeyState, RequestEncoder};
//!
//! let encoder = RequestEncoder::new(DeviceId::new("A0F6FD12ABCD"));
//!
//! let info = encoder.query(Query::Info);
//! assert_eq!(info.request_id(), 0);
//!
//! let press = encoder.key(RemoteKey::Play, KeyState::Press);
//! assert!(press.as_str().contains(r#"mainNode="keyPress""#));
//! ```

pub mod error;
pub mod model;
pub mod request;

pub use error::{ApiError, Result};
pub use model::{
    Connectivity, ContentItem, ContentItemBuilder, DeviceId, OperationMode, Preset, RadioStation,
    RemoteKey, Source, ZoneMember, ZoneState,
};
pub use request::{Frame, KeyState, Query, RequestEncoder};
