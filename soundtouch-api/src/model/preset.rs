//! Preset type

use serde::{Deserialize, Serialize};

use super::{ContentItem, RadioStation};

/// A user-assigned shortcut slot mapping to a content item
///
/// Position validity is range-checked on its own: a preset with an
/// out-of-range position can still be stored, it just never matches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preset {
    position: i32,
    content_item: Option<ContentItem>,
}

impl Preset {
    /// Lowest valid preset position
    pub const MIN_POSITION: i32 = 1;
    /// Highest valid preset position
    pub const MAX_POSITION: i32 = 6;

    /// Create an empty preset at the given position
    pub fn new(position: i32) -> Self {
        Self {
            position,
            content_item: None,
        }
    }

    /// Create a preset already holding a content item
    pub fn with_content_item(position: i32, content_item: ContentItem) -> Self {
        Self {
            position,
            content_item: Some(content_item),
        }
    }

    pub fn position(&self) -> i32 {
        self.position
    }

    pub fn content_item(&self) -> Option<&ContentItem> {
        self.content_item.as_ref()
    }

    pub fn set_content_item(&mut self, content_item: ContentItem) {
        self.content_item = Some(content_item);
    }

    /// Check whether the position is within 1..=6
    pub fn is_valid(&self) -> bool {
        (Self::MIN_POSITION..=Self::MAX_POSITION).contains(&self.position)
    }

    /// Radio station this preset maps to, `None` for invalid positions
    pub fn radio_station(&self) -> Option<RadioStation> {
        if self.is_valid() {
            Some(RadioStation::Preset(self.position as u8))
        } else {
            None
        }
    }
}
