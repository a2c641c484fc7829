//! Content item types

use serde::{Deserialize, Serialize};
use std::fmt;

/// Source type reported in a content item's `source` attribute
///
/// Doubles as the operation mode hint: when the current content item does
/// not match any preset, the device's operation mode follows this value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Source {
    InternetRadio,
    Standby,
    Aux,
    Bluetooth,
    Other,
}

impl Source {
    /// Map a wire `source` attribute to a Source
    ///
    /// Returns `None` for names this binding does not know; callers decide
    /// whether to log before falling back to [`Source::Other`].
    pub fn from_attribute(value: &str) -> Option<Self> {
        match value {
            "INTERNET_RADIO" => Some(Source::InternetRadio),
            "STANDBY" => Some(Source::Standby),
            "AUX" => Some(Source::Aux),
            "BLUETOOTH" => Some(Source::Bluetooth),
            _ => None,
        }
    }

    /// Wire name of this source
    pub fn as_str(&self) -> &'static str {
        match self {
            Source::InternetRadio => "INTERNET_RADIO",
            Source::Standby => "STANDBY",
            Source::Aux => "AUX",
            Source::Bluetooth => "BLUETOOTH",
            Source::Other => "OTHER",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity of what is, or could be, playing on a device
///
/// Two content items are equal iff all four fields match. Content items are
/// never mutated in place; a new one replaces the old on every update.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentItem {
    source: Source,
    location: String,
    source_account: String,
    item_name: String,
}

impl ContentItem {
    /// Create a content item from all of its parts
    pub fn new(
        source: Source,
        location: impl Into<String>,
        source_account: impl Into<String>,
        item_name: impl Into<String>,
    ) -> Self {
        Self {
            source,
            location: location.into(),
            source_account: source_account.into(),
            item_name: item_name.into(),
        }
    }

    /// Start building a content item for the given source
    pub fn builder(source: Source) -> ContentItemBuilder {
        ContentItemBuilder::new(source)
    }

    pub fn source(&self) -> Source {
        self.source
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn source_account(&self) -> &str {
        &self.source_account
    }

    /// Item name, empty when the device did not report one
    pub fn item_name(&self) -> &str {
        &self.item_name
    }
}

/// Incremental builder used while a content item element is being parsed
#[derive(Debug, Clone, PartialEq)]
pub struct ContentItemBuilder {
    source: Source,
    location: String,
    source_account: String,
    item_name: Option<String>,
}

impl ContentItemBuilder {
    pub fn new(source: Source) -> Self {
        Self {
            source,
            location: String::new(),
            source_account: String::new(),
            item_name: None,
        }
    }

    pub fn location(mut self, location: impl Into<String>) -> Self {
        self.location = location.into();
        self
    }

    pub fn source_account(mut self, account: impl Into<String>) -> Self {
        self.source_account = account.into();
        self
    }

    pub fn item_name(mut self, name: impl Into<String>) -> Self {
        self.item_name = Some(name.into());
        self
    }

    /// Set the item name in place, for text that arrives after the element opened
    pub fn set_item_name(&mut self, name: impl Into<String>) {
        self.item_name = Some(name.into());
    }

    /// Finalize the item; a missing name becomes the empty string
    pub fn build(self) -> ContentItem {
        ContentItem {
            source: self.source,
            location: self.location,
            source_account: self.source_account,
            item_name: self.item_name.unwrap_or_default(),
        }
    }
}
