//! Model types for SoundTouch device state

mod content_item;
mod device_id;
mod operation_mode;
mod preset;
mod remote_key;
mod zone_member;

pub use content_item::{ContentItem, ContentItemBuilder, Source};
pub use device_id::DeviceId;
pub use operation_mode::{Connectivity, OperationMode, RadioStation, ZoneState};
pub use preset::Preset;
pub use remote_key::RemoteKey;
pub use zone_member::ZoneMember;
