//! Operation mode, radio station, connectivity and zone state enums

use serde::{Deserialize, Serialize};
use std::fmt;

use super::Source;

/// Coarse playback state of a device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OperationMode {
    Offline,
    Standby,
    InternetRadio,
    Bluetooth,
    Aux,
    Other,
}

impl OperationMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationMode::Offline => "OFFLINE",
            OperationMode::Standby => "STANDBY",
            OperationMode::InternetRadio => "INTERNET_RADIO",
            OperationMode::Bluetooth => "BLUETOOTH",
            OperationMode::Aux => "AUX",
            OperationMode::Other => "OTHER",
        }
    }

    /// Stable numeric form, for consumers that only take numbers
    pub fn ordinal(&self) -> u8 {
        match self {
            OperationMode::Offline => 0,
            OperationMode::Standby => 1,
            OperationMode::InternetRadio => 2,
            OperationMode::Bluetooth => 3,
            OperationMode::Aux => 4,
            OperationMode::Other => 5,
        }
    }

    /// Whether the device counts as powered on in this mode
    pub fn is_powered(&self) -> bool {
        !matches!(self, OperationMode::Standby | OperationMode::Offline)
    }
}

impl From<Source> for OperationMode {
    fn from(source: Source) -> Self {
        match source {
            Source::Standby => OperationMode::Standby,
            Source::InternetRadio => OperationMode::InternetRadio,
            Source::Bluetooth => OperationMode::Bluetooth,
            Source::Aux => OperationMode::Aux,
            Source::Other => OperationMode::Other,
        }
    }
}

impl fmt::Display for OperationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Radio station derived from the preset matching the current content item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum RadioStation {
    #[default]
    Unknown,
    /// Station stored on the given preset slot (1..=6)
    Preset(u8),
}

impl fmt::Display for RadioStation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RadioStation::Unknown => f.write_str("UNKNOWN"),
            RadioStation::Preset(n) => write!(f, "PRESET{}", n),
        }
    }
}

/// State of the push connection to a device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Connectivity {
    Offline,
    Connecting,
    Online,
}

/// Role of a device within a multi-room zone
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ZoneState {
    #[default]
    None,
    Master,
    Member,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_maps_one_to_one() {
        assert_eq!(OperationMode::from(Source::Standby), OperationMode::Standby);
        assert_eq!(OperationMode::from(Source::InternetRadio), OperationMode::InternetRadio);
        assert_eq!(OperationMode::from(Source::Bluetooth), OperationMode::Bluetooth);
        assert_eq!(OperationMode::from(Source::Aux), OperationMode::Aux);
        assert_eq!(OperationMode::from(Source::Other), OperationMode::Other);
    }

    #[test]
    fn test_power_follows_mode() {
        assert!(!OperationMode::Standby.is_powered());
        assert!(!OperationMode::Offline.is_powered());
        assert!(OperationMode::InternetRadio.is_powered());
        assert!(OperationMode::Other.is_powered());
    }

    #[test]
    fn test_radio_station_display() {
        assert_eq!(RadioStation::Unknown.to_string(), "UNKNOWN");
        assert_eq!(RadioStation::Preset(2).to_string(), "PRESET2");
    }
}
