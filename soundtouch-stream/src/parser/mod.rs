//! Response state machine for the SoundTouch push stream
//!
//! Every inbound websocket message is an independent XML document: either a
//! `<msg>` envelope answering an earlier request or an unsolicited
//! `<updates>` notification. The parser walks the document as a stream of
//! open/text/close events and tracks where it is with an explicit state
//! stack. Transitions come from a [`TransitionTable`]; the
//! [`ResponseHandler`] applies entry, text and exit effects and produces a
//! list of [`ModelUpdate`] values. It never touches a device model itself.
//!
//! ```rust
//! use soundtouch_api::DeviceId;
//! use soundtouch_stream::parser::{parse_message, ModelUpdate};
//!
//! let own_id = DeviceId::new("A0F6FD12ABCD");
//! let xml = r#"<updates deviceID="A0F6FD12ABCD"><volumeUpdated>
//!     <volume><targetvolume>30</targetvolume><actualvolume>30</actualvolume>
//!     <muteenabled>false</muteenabled></volume>
//! </volumeUpdated></updates>"#;
//!
//! let updates = parse_message(&own_id, xml).unwrap();
//! assert_eq!(updates, vec![ModelUpdate::Volume(30), ModelUpdate::Mute(false)]);
//! ```

mod handler;
mod reader;
mod table;

pub use handler::ResponseHandler;
pub use reader::parse_message;
pub use table::{IdentityCheck, Transition, TransitionTable};

use serde::{Deserialize, Serialize};
use soundtouch_api::{ContentItem, DeviceId, Preset, Query};

/// Nested context the parser is currently inside
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParserState {
    Init,
    Msg,
    MsgHeader,
    MsgBody,
    Updates,
    Info,
    InfoName,
    InfoType,
    Volume,
    VolumeActual,
    VolumeMuteEnabled,
    Presets,
    Preset,
    NowPlaying,
    NowPlayingAlbum,
    NowPlayingArt,
    NowPlayingArtist,
    NowPlayingDescription,
    NowPlayingPlayStatus,
    NowPlayingStationLocation,
    NowPlayingStationName,
    NowPlayingTrack,
    ContentItem,
    ContentItemItemName,
    Zone,
    ZoneMember,
    ZoneUpdated,
    /// Absorbing state: the element and its whole subtree are ignored
    Unprocessed,
    /// Like [`ParserState::Unprocessed`], but text inside is unexpected
    UnprocessedNoTextExpected,
}

impl ParserState {
    /// Whether every element opened in this state is ignored
    pub fn is_absorbing(&self) -> bool {
        matches!(
            self,
            ParserState::Unprocessed | ParserState::UnprocessedNoTextExpected
        )
    }

    /// Now-playing detail field written by text in this state
    fn now_playing_field(&self) -> Option<NowPlayingField> {
        match self {
            ParserState::NowPlayingAlbum => Some(NowPlayingField::Album),
            ParserState::NowPlayingArt => Some(NowPlayingField::Art),
            ParserState::NowPlayingArtist => Some(NowPlayingField::Artist),
            ParserState::NowPlayingDescription => Some(NowPlayingField::Description),
            ParserState::NowPlayingPlayStatus => Some(NowPlayingField::PlayStatus),
            ParserState::NowPlayingStationLocation => Some(NowPlayingField::StationLocation),
            ParserState::NowPlayingStationName => Some(NowPlayingField::StationName),
            ParserState::NowPlayingTrack => Some(NowPlayingField::Track),
            _ => None,
        }
    }
}

/// Text fields reported inside a `nowPlaying` element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NowPlayingField {
    Album,
    Art,
    Artist,
    Description,
    PlayStatus,
    StationLocation,
    StationName,
    Track,
}

impl NowPlayingField {
    pub const ALL: [NowPlayingField; 8] = [
        NowPlayingField::Album,
        NowPlayingField::Art,
        NowPlayingField::Artist,
        NowPlayingField::Description,
        NowPlayingField::PlayStatus,
        NowPlayingField::StationLocation,
        NowPlayingField::StationName,
        NowPlayingField::Track,
    ];
}

/// A single mutation of a device model, produced by the parser
#[derive(Debug, Clone, PartialEq)]
pub enum ModelUpdate {
    DeviceName(String),
    DeviceType(String),
    /// `source` attribute of a `nowPlaying` element
    NowPlayingSource(String),
    NowPlayingField(NowPlayingField, String),
    /// Finished content item of a `nowPlaying` element
    NowPlayingItem(ContentItem),
    /// A presets list started; the old preset set is discarded
    PresetsCleared,
    PresetStored(Preset),
    Volume(u8),
    Mute(bool),
    /// A zone element opened; `None` when the master attribute is empty or missing
    ZoneStarted { master: Option<DeviceId> },
    /// A member element opened; its mac follows as text
    ZoneMemberStarted { ip_address: String },
    ZoneMemberMac(DeviceId),
    /// A zone element closed
    ZonesChanged,
    /// The device should be asked for this resource
    FollowUp(Query),
}

/// Attributes of an opened element, in document order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attributes(Vec<(String, String)>);

impl Attributes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.push((name.into(), value.into()));
    }

    /// Value of the first attribute with this exact name
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Attributes {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }
}
