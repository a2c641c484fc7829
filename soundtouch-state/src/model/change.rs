//! Change notification types

use serde::{Deserialize, Serialize};
use soundtouch_api::{Connectivity, ContentItem, DeviceId, OperationMode, RadioStation};
use soundtouch_stream::NowPlayingField;

/// A change to a device's observable state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DeviceChange {
    /// Connection state changed
    ConnectivityChanged {
        connectivity: Connectivity,
        /// Why the device went offline; empty otherwise
        reason: String,
    },

    OperationModeChanged {
        old_mode: OperationMode,
        new_mode: OperationMode,
    },

    RadioStationChanged { station: RadioStation },

    PowerChanged { powered: bool },

    VolumeChanged { old_volume: u8, new_volume: u8 },

    MuteChanged { muted: bool },

    /// The `source` reported with now playing changed
    NowPlayingSourceChanged { source: String },

    /// All now playing details were reset
    NowPlayingCleared,

    NowPlayingFieldChanged {
        field: NowPlayingField,
        value: String,
    },

    /// Current content item was replaced or cleared
    ContentItemChanged { item: Option<ContentItem> },

    /// A preset slot was stored
    PresetChanged { position: i32 },

    ZoneSummaryChanged { summary: String },

    DeviceNameChanged { name: String },

    DeviceTypeChanged { device_type: String },
}

/// A change tagged with the device it belongs to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceEvent {
    pub device_id: DeviceId,
    pub change: DeviceChange,
}

impl DeviceEvent {
    pub fn new(device_id: DeviceId, change: DeviceChange) -> Self {
        Self { device_id, change }
    }
}
