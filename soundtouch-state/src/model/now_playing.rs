//! Now playing details

use serde::{Deserialize, Serialize};
use soundtouch_stream::NowPlayingField;

/// Text details reported alongside the current content item
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NowPlaying {
    pub album: Option<String>,
    pub art: Option<String>,
    pub artist: Option<String>,
    pub description: Option<String>,
    pub play_status: Option<String>,
    pub station_location: Option<String>,
    pub station_name: Option<String>,
    pub track: Option<String>,
}

impl NowPlaying {
    pub fn get(&self, field: NowPlayingField) -> Option<&str> {
        self.slot(field).as_deref()
    }

    /// Store a field value, returning whether it changed
    pub fn set(&mut self, field: NowPlayingField, value: impl Into<String>) -> bool {
        let value = value.into();
        let slot = self.slot_mut(field);
        if slot.as_deref() == Some(value.as_str()) {
            return false;
        }
        *slot = Some(value);
        true
    }

    /// Forget every field, returning whether anything was set
    pub fn clear(&mut self) -> bool {
        let had_values = !self.is_empty();
        *self = Self::default();
        had_values
    }

    pub fn is_empty(&self) -> bool {
        NowPlayingField::ALL
            .iter()
            .all(|field| self.slot(*field).is_none())
    }

    fn slot(&self, field: NowPlayingField) -> &Option<String> {
        match field {
            NowPlayingField::Album => &self.album,
            NowPlayingField::Art => &self.art,
            NowPlayingField::Artist => &self.artist,
            NowPlayingField::Description => &self.description,
            NowPlayingField::PlayStatus => &self.play_status,
            NowPlayingField::StationLocation => &self.station_location,
            NowPlayingField::StationName => &self.station_name,
            NowPlayingField::Track => &self.track,
        }
    }

    fn slot_mut(&mut self, field: NowPlayingField) -> &mut Option<String> {
        match field {
            NowPlayingField::Album => &mut self.album,
            NowPlayingField::Art => &mut self.art,
            NowPlayingField::Artist => &mut self.artist,
            NowPlayingField::Description => &mut self.description,
            NowPlayingField::PlayStatus => &mut self.play_status,
            NowPlayingField::StationLocation => &mut self.station_location,
            NowPlayingField::StationName => &mut self.station_name,
            NowPlayingField::Track => &mut self.track,
        }
    }
}
