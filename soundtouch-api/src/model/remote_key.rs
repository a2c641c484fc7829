//! Remote control key codes

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ApiError;

/// A key on the SoundTouch remote, as accepted by the `key` endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RemoteKey {
    Play,
    Pause,
    Stop,
    PrevTrack,
    NextTrack,
    ThumbsUp,
    ThumbsDown,
    Bookmark,
    Power,
    Mute,
    VolumeUp,
    VolumeDown,
    Preset1,
    Preset2,
    Preset3,
    Preset4,
    Preset5,
    Preset6,
    AuxInput,
    ShuffleOff,
    ShuffleOn,
    RepeatOff,
    RepeatOne,
    RepeatAll,
    PlayPause,
    AddFavorite,
    RemoveFavorite,
}

impl RemoteKey {
    /// All keys, in wire order
    pub const ALL: [RemoteKey; 27] = [
        RemoteKey::Play,
        RemoteKey::Pause,
        RemoteKey::Stop,
        RemoteKey::PrevTrack,
        RemoteKey::NextTrack,
        RemoteKey::ThumbsUp,
        RemoteKey::ThumbsDown,
        RemoteKey::Bookmark,
        RemoteKey::Power,
        RemoteKey::Mute,
        RemoteKey::VolumeUp,
        RemoteKey::VolumeDown,
        RemoteKey::Preset1,
        RemoteKey::Preset2,
        RemoteKey::Preset3,
        RemoteKey::Preset4,
        RemoteKey::Preset5,
        RemoteKey::Preset6,
        RemoteKey::AuxInput,
        RemoteKey::ShuffleOff,
        RemoteKey::ShuffleOn,
        RemoteKey::RepeatOff,
        RemoteKey::RepeatOne,
        RemoteKey::RepeatAll,
        RemoteKey::PlayPause,
        RemoteKey::AddFavorite,
        RemoteKey::RemoveFavorite,
    ];

    /// Wire name of the key
    pub fn as_str(&self) -> &'static str {
        match self {
            RemoteKey::Play => "PLAY",
            RemoteKey::Pause => "PAUSE",
            RemoteKey::Stop => "STOP",
            RemoteKey::PrevTrack => "PREV_TRACK",
            RemoteKey::NextTrack => "NEXT_TRACK",
            RemoteKey::ThumbsUp => "THUMBS_UP",
            RemoteKey::ThumbsDown => "THUMBS_DOWN",
            RemoteKey::Bookmark => "BOOKMARK",
            RemoteKey::Power => "POWER",
            RemoteKey::Mute => "MUTE",
            RemoteKey::VolumeUp => "VOLUME_UP",
            RemoteKey::VolumeDown => "VOLUME_DOWN",
            RemoteKey::Preset1 => "PRESET_1",
            RemoteKey::Preset2 => "PRESET_2",
            RemoteKey::Preset3 => "PRESET_3",
            RemoteKey::Preset4 => "PRESET_4",
            RemoteKey::Preset5 => "PRESET_5",
            RemoteKey::Preset6 => "PRESET_6",
            RemoteKey::AuxInput => "AUX_INPUT",
            RemoteKey::ShuffleOff => "SHUFFLE_OFF",
            RemoteKey::ShuffleOn => "SHUFFLE_ON",
            RemoteKey::RepeatOff => "REPEAT_OFF",
            RemoteKey::RepeatOne => "REPEAT_ONE",
            RemoteKey::RepeatAll => "REPEAT_ALL",
            RemoteKey::PlayPause => "PLAY_PAUSE",
            RemoteKey::AddFavorite => "ADD_FAVORITE",
            RemoteKey::RemoveFavorite => "REMOVE_FAVORITE",
        }
    }

    /// Preset key for a slot in 1..=6
    pub fn preset(slot: u8) -> crate::Result<Self> {
        match slot {
            1 => Ok(RemoteKey::Preset1),
            2 => Ok(RemoteKey::Preset2),
            3 => Ok(RemoteKey::Preset3),
            4 => Ok(RemoteKey::Preset4),
            5 => Ok(RemoteKey::Preset5),
            6 => Ok(RemoteKey::Preset6),
            other => Err(ApiError::out_of_range("preset", other, 1, 6)),
        }
    }
}

impl fmt::Display for RemoteKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RemoteKey {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        RemoteKey::ALL
            .iter()
            .copied()
            .find(|key| key.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| ApiError::UnknownKey(s.to_string()))
    }
}
