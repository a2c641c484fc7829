//! Transition table for the response state machine

use std::collections::HashMap;
use std::sync::LazyLock;

use super::ParserState;

/// How an element's `deviceID` attribute is validated on entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentityCheck {
    /// The element carries no identity
    None,
    /// The attribute must be present and name this device
    Required,
    /// The attribute may be absent, but if present must name this device
    IfPresent,
}

/// Target of a single (state, element) transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub target: ParserState,
    pub identity: IdentityCheck,
}

static STANDARD: LazyLock<TransitionTable> = LazyLock::new(TransitionTable::build_standard);

/// Map from (current state, element name) to the next state
///
/// Element names match exactly and case-sensitively. A missing entry means
/// the element is not understood in that context.
#[derive(Debug, Clone, Default)]
pub struct TransitionTable {
    entries: HashMap<ParserState, HashMap<&'static str, Transition>>,
}

impl TransitionTable {
    /// An empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// The table for the SoundTouch websocket protocol
    pub fn standard() -> &'static TransitionTable {
        &STANDARD
    }

    pub fn insert(
        &mut self,
        from: ParserState,
        element: &'static str,
        target: ParserState,
        identity: IdentityCheck,
    ) {
        self.entries
            .entry(from)
            .or_default()
            .insert(element, Transition { target, identity });
    }

    pub fn lookup(&self, from: ParserState, element: &str) -> Option<Transition> {
        self.entries.get(&from)?.get(element).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn build_standard() -> Self {
        use IdentityCheck as Id;
        use ParserState::*;

        let mut table = Self::new();
        let mut add = |from, element, target, identity| table.insert(from, element, target, identity);

        // Top level
        add(Init, "msg", Msg, Id::None);
        add(Init, "updates", Updates, Id::Required);
        add(Init, "SoundTouchSdkInfo", UnprocessedNoTextExpected, Id::None);
        add(Init, "userActivityUpdate", UnprocessedNoTextExpected, Id::None);

        // Reply envelope
        add(Msg, "header", MsgHeader, Id::Required);
        add(Msg, "body", MsgBody, Id::None);
        add(MsgHeader, "request", UnprocessedNoTextExpected, Id::None);

        // Reply payloads, also re-entered from update notifications
        add(MsgBody, "info", Info, Id::Required);
        add(MsgBody, "volume", Volume, Id::IfPresent);
        add(MsgBody, "presets", Presets, Id::IfPresent);
        add(MsgBody, "nowPlaying", NowPlaying, Id::Required);
        add(MsgBody, "zone", Zone, Id::IfPresent);
        // Key replies only confirm our own key presses
        for ignored in ["key", "bass", "bassCapabilities", "sources", "group", "status", "errors"] {
            add(MsgBody, ignored, Unprocessed, Id::None);
        }

        // Update notifications
        add(Updates, "nowPlayingUpdated", MsgBody, Id::None);
        add(Updates, "volumeUpdated", MsgBody, Id::None);
        add(Updates, "presetsUpdated", MsgBody, Id::None);
        add(Updates, "zoneUpdated", ZoneUpdated, Id::None);
        add(Updates, "connectionStateUpdated", UnprocessedNoTextExpected, Id::None);
        for ignored in [
            "clockDisplayUpdated",
            "clockTimeUpdated",
            "infoUpdated",
            "recentsUpdated",
            "nowSelectionUpdated",
            "bassUpdated",
            "sourcesUpdated",
            "groupUpdated",
        ] {
            add(Updates, ignored, Unprocessed, Id::None);
        }
        add(ZoneUpdated, "zone", Unprocessed, Id::None);

        // Device info
        add(Info, "name", InfoName, Id::None);
        add(Info, "type", InfoType, Id::None);
        for ignored in [
            "components",
            "margeAccountUUID",
            "margeURL",
            "networkInfo",
            "moduleType",
            "variant",
            "variantMode",
            "countryCode",
            "regionCode",
        ] {
            add(Info, ignored, Unprocessed, Id::None);
        }

        // Volume
        add(Volume, "actualvolume", VolumeActual, Id::None);
        add(Volume, "muteenabled", VolumeMuteEnabled, Id::None);
        add(Volume, "targetvolume", Unprocessed, Id::None);

        // Presets
        add(Presets, "preset", Preset, Id::None);
        add(Preset, "ContentItem", ContentItem, Id::None);

        // Now playing
        add(NowPlaying, "ContentItem", ContentItem, Id::None);
        add(NowPlaying, "album", NowPlayingAlbum, Id::None);
        add(NowPlaying, "art", NowPlayingArt, Id::None);
        add(NowPlaying, "artist", NowPlayingArtist, Id::None);
        add(NowPlaying, "description", NowPlayingDescription, Id::None);
        add(NowPlaying, "playStatus", NowPlayingPlayStatus, Id::None);
        add(NowPlaying, "stationLocation", NowPlayingStationLocation, Id::None);
        add(NowPlaying, "stationName", NowPlayingStationName, Id::None);
        add(NowPlaying, "track", NowPlayingTrack, Id::None);
        for ignored in [
            "time",
            "genre",
            "streamType",
            "skipEnabled",
            "skipPreviousEnabled",
            "favoriteEnabled",
            "isFavorite",
            "rateEnabled",
            "rating",
            "shuffleSetting",
            "repeatSetting",
            "connectionStatusInfo",
        ] {
            add(NowPlaying, ignored, Unprocessed, Id::None);
        }

        // Content items
        add(ContentItem, "itemName", ContentItemItemName, Id::None);
        add(ContentItem, "containerArt", Unprocessed, Id::None);

        // Zones
        add(Zone, "member", ZoneMember, Id::None);

        table
    }
}
