//! Push-style handler driving the response state machine

use soundtouch_api::{ContentItemBuilder, DeviceId, Preset, Query, Source};
use tracing::{debug, warn};

use super::table::{IdentityCheck, TransitionTable};
use super::{Attributes, ModelUpdate, ParserState};

/// Follow-up queries issued once a device info reply has been read
const INFO_FOLLOW_UPS: [Query; 4] = [Query::Volume, Query::Presets, Query::NowPlaying, Query::Zone];

/// State machine for one inbound message
///
/// Feed it element open, text and element close events in document order,
/// then call [`ResponseHandler::finish`] to take the produced updates.
pub struct ResponseHandler<'a> {
    own_id: &'a DeviceId,
    table: &'a TransitionTable,
    state: ParserState,
    stack: Vec<ParserState>,
    content_item: Option<ContentItemBuilder>,
    preset: Option<Preset>,
    muted: bool,
    header_valid: bool,
    updates: Vec<ModelUpdate>,
}

impl<'a> ResponseHandler<'a> {
    /// Handler using the standard transition table
    pub fn new(own_id: &'a DeviceId) -> Self {
        Self::with_table(own_id, TransitionTable::standard())
    }

    pub fn with_table(own_id: &'a DeviceId, table: &'a TransitionTable) -> Self {
        Self {
            own_id,
            table,
            state: ParserState::Init,
            stack: Vec::new(),
            content_item: None,
            preset: None,
            muted: false,
            header_valid: false,
            updates: Vec::new(),
        }
    }

    /// Current parser state
    pub fn state(&self) -> ParserState {
        self.state
    }

    /// Number of elements currently open
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    pub fn start_element(&mut self, name: &str, attrs: &Attributes) {
        self.stack.push(self.state);

        if self.state.is_absorbing() {
            self.state = ParserState::Unprocessed;
            return;
        }

        let Some(transition) = self.table.lookup(self.state, name) else {
            warn!(element = name, state = ?self.state, "Unrecognized element, ignoring subtree");
            self.state = ParserState::Unprocessed;
            return;
        };

        if !self.identity_matches(name, transition.identity, attrs) {
            self.state = ParserState::Unprocessed;
            return;
        }

        if name == "body" && self.state == ParserState::Msg && !self.header_valid {
            debug!("Skipping message body without a valid header");
            self.state = ParserState::Unprocessed;
            return;
        }

        debug!(element = name, from = ?self.state, to = ?transition.target, "Element opened");
        self.state = transition.target;
        self.enter(attrs);
    }

    pub fn characters(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        if let Some(field) = self.state.now_playing_field() {
            self.updates
                .push(ModelUpdate::NowPlayingField(field, text.to_string()));
            return;
        }
        match self.state {
            ParserState::InfoName => self.updates.push(ModelUpdate::DeviceName(text.to_string())),
            ParserState::InfoType => self.updates.push(ModelUpdate::DeviceType(text.to_string())),
            ParserState::ContentItemItemName => {
                if let Some(builder) = self.content_item.as_mut() {
                    builder.set_item_name(text);
                }
            }
            ParserState::VolumeActual => match text.trim().parse::<u8>() {
                Ok(volume) if volume <= 100 => self.updates.push(ModelUpdate::Volume(volume)),
                _ => warn!(value = text, "Ignoring invalid volume"),
            },
            ParserState::VolumeMuteEnabled => {
                self.muted = text.trim().eq_ignore_ascii_case("true")
            }
            ParserState::ZoneMember => self
                .updates
                .push(ModelUpdate::ZoneMemberMac(DeviceId::new(text))),
            ParserState::Unprocessed => {}
            other => warn!(state = ?other, text, "Unexpected text"),
        }
    }

    pub fn end_element(&mut self) {
        let exited = self.state;
        let Some(resumed) = self.stack.pop() else {
            warn!("Element closed with no open element");
            return;
        };
        self.state = resumed;
        self.exit(exited, resumed);
    }

    /// Take the updates produced so far
    pub fn finish(self) -> Vec<ModelUpdate> {
        self.updates
    }

    fn identity_matches(&self, element: &str, check: IdentityCheck, attrs: &Attributes) -> bool {
        let reported = attrs.get("deviceID");
        let matches = match (check, reported) {
            (IdentityCheck::None, _) => true,
            (IdentityCheck::Required, None) => false,
            (IdentityCheck::Required, Some(id)) | (IdentityCheck::IfPresent, Some(id)) => {
                self.own_id.matches(id)
            }
            (IdentityCheck::IfPresent, None) => true,
        };
        if !matches {
            warn!(
                element,
                expected = %self.own_id,
                reported = reported.unwrap_or("<none>"),
                "Device identity mismatch, ignoring subtree"
            );
        }
        matches
    }

    fn enter(&mut self, attrs: &Attributes) {
        match self.state {
            ParserState::MsgHeader => self.header_valid = true,
            ParserState::ContentItem => {
                let raw_source = attrs.get("source").unwrap_or_default();
                let source = Source::from_attribute(raw_source).unwrap_or_else(|| {
                    warn!(source = raw_source, "Unknown content item source, using OTHER");
                    Source::Other
                });
                self.content_item = Some(
                    ContentItemBuilder::new(source)
                        .location(attrs.get("location").unwrap_or_default())
                        .source_account(attrs.get("sourceAccount").unwrap_or_default()),
                );
            }
            ParserState::Presets => self.updates.push(ModelUpdate::PresetsCleared),
            ParserState::Preset => match attrs.get("id").map(|id| id.trim().parse::<i32>()) {
                Some(Ok(position)) => self.preset = Some(Preset::new(position)),
                _ => {
                    warn!(id = attrs.get("id"), "Preset without a usable id, ignoring");
                    self.preset = None;
                    self.state = ParserState::Unprocessed;
                }
            },
            ParserState::Volume => self.muted = false,
            ParserState::NowPlaying => {
                if let Some(source) = attrs.get("source") {
                    self.updates
                        .push(ModelUpdate::NowPlayingSource(source.to_string()));
                }
            }
            ParserState::Zone => {
                let master = attrs
                    .get("master")
                    .map(str::trim)
                    .filter(|master| !master.is_empty())
                    .map(DeviceId::new);
                self.updates.push(ModelUpdate::ZoneStarted { master });
            }
            ParserState::ZoneMember => {
                let ip_address = attrs.get("ipaddress").unwrap_or_default().to_string();
                self.updates
                    .push(ModelUpdate::ZoneMemberStarted { ip_address });
            }
            _ => {}
        }
    }

    fn exit(&mut self, exited: ParserState, resumed: ParserState) {
        match (exited, resumed) {
            (ParserState::Info, _) => {
                for query in INFO_FOLLOW_UPS {
                    self.updates.push(ModelUpdate::FollowUp(query));
                }
            }
            (ParserState::ContentItem, ParserState::NowPlaying) => {
                if let Some(builder) = self.content_item.take() {
                    self.updates.push(ModelUpdate::NowPlayingItem(builder.build()));
                }
            }
            (ParserState::ContentItem, ParserState::Preset) => {
                if let (Some(builder), Some(preset)) =
                    (self.content_item.take(), self.preset.as_mut())
                {
                    preset.set_content_item(builder.build());
                }
            }
            (ParserState::Preset, ParserState::Presets) => {
                if let Some(preset) = self.preset.take() {
                    self.updates.push(ModelUpdate::PresetStored(preset));
                }
            }
            (ParserState::Volume, _) => self.updates.push(ModelUpdate::Mute(self.muted)),
            (ParserState::ZoneUpdated, _) => {
                self.updates.push(ModelUpdate::FollowUp(Query::Zone))
            }
            (ParserState::Zone, _) => self.updates.push(ModelUpdate::ZonesChanged),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::NowPlayingField;
    use rstest::rstest;
    use soundtouch_api::ContentItem;

    const OWN: &str = "A0F6FD12ABCD";

    fn attrs(pairs: &[(&str, &str)]) -> Attributes {
        pairs.iter().copied().collect()
    }

    #[test]
    fn test_unknown_element_is_absorbed() {
        let own = DeviceId::new(OWN);
        let mut handler = ResponseHandler::new(&own);
        handler.start_element("futureThing", &Attributes::new());
        assert_eq!(handler.state(), ParserState::Unprocessed);

        handler.start_element("msg", &Attributes::new());
        assert_eq!(handler.state(), ParserState::Unprocessed);
        handler.characters("ignored");
        handler.end_element();
        handler.end_element();

        assert_eq!(handler.state(), ParserState::Init);
        assert_eq!(handler.depth(), 0);
        assert!(handler.finish().is_empty());
    }

    #[test]
    fn test_required_identity_missing() {
        let own = DeviceId::new(OWN);
        let mut handler = ResponseHandler::new(&own);
        handler.start_element("updates", &Attributes::new());
        assert_eq!(handler.state(), ParserState::Unprocessed);
    }

    #[test]
    fn test_optional_identity_absent_is_accepted() {
        let own = DeviceId::new(OWN);
        let mut handler = ResponseHandler::new(&own);
        handler.start_element("updates", &attrs(&[("deviceID", OWN)]));
        handler.start_element("volumeUpdated", &Attributes::new());
        handler.start_element("volume", &Attributes::new());
        assert_eq!(handler.state(), ParserState::Volume);
    }

    #[test]
    fn test_optional_identity_mismatch_is_rejected() {
        let own = DeviceId::new(OWN);
        let mut handler = ResponseHandler::new(&own);
        handler.start_element("updates", &attrs(&[("deviceID", OWN)]));
        handler.start_element("volumeUpdated", &Attributes::new());
        handler.start_element("volume", &attrs(&[("deviceID", "FFFFFFFFFFFF")]));
        assert_eq!(handler.state(), ParserState::Unprocessed);
        handler.end_element();
        assert!(handler.finish().is_empty());
    }

    #[test]
    fn test_body_requires_valid_header() {
        let own = DeviceId::new(OWN);
        let mut handler = ResponseHandler::new(&own);
        handler.start_element("msg", &Attributes::new());
        handler.start_element("header", &attrs(&[("deviceID", "FFFFFFFFFFFF")]));
        handler.end_element();
        handler.start_element("body", &Attributes::new());
        assert_eq!(handler.state(), ParserState::Unprocessed);
    }

    #[test]
    fn test_now_playing_item_emitted_on_content_item_close() {
        let own = DeviceId::new(OWN);
        let mut handler = ResponseHandler::new(&own);
        handler.start_element("updates", &attrs(&[("deviceID", OWN)]));
        handler.start_element("nowPlayingUpdated", &Attributes::new());
        handler.start_element(
            "nowPlaying",
            &attrs(&[("deviceID", OWN), ("source", "INTERNET_RADIO")]),
        );
        handler.start_element(
            "ContentItem",
            &attrs(&[("source", "INTERNET_RADIO"), ("location", "L1")]),
        );
        handler.start_element("itemName", &Attributes::new());
        handler.characters("Jazz24");
        handler.end_element();
        handler.end_element();
        handler.start_element("track", &Attributes::new());
        handler.characters("So What");
        handler.end_element();

        let updates = handler.finish();
        assert_eq!(
            updates,
            vec![
                ModelUpdate::NowPlayingSource("INTERNET_RADIO".to_string()),
                ModelUpdate::NowPlayingItem(ContentItem::new(
                    Source::InternetRadio,
                    "L1",
                    "",
                    "Jazz24"
                )),
                ModelUpdate::NowPlayingField(NowPlayingField::Track, "So What".to_string()),
            ]
        );
    }

    #[test]
    fn test_unparsable_preset_id_absorbs_subtree() {
        let own = DeviceId::new(OWN);
        let mut handler = ResponseHandler::new(&own);
        handler.start_element("msg", &Attributes::new());
        handler.start_element("header", &attrs(&[("deviceID", OWN)]));
        handler.end_element();
        handler.start_element("body", &Attributes::new());
        handler.start_element("presets", &Attributes::new());
        handler.start_element("preset", &attrs(&[("id", "x")]));
        assert_eq!(handler.state(), ParserState::Unprocessed);
        handler.start_element("ContentItem", &attrs(&[("source", "AUX")]));
        handler.end_element();
        handler.end_element();
        handler.end_element();

        assert_eq!(handler.finish(), vec![ModelUpdate::PresetsCleared]);
    }

    #[test]
    fn test_invalid_volume_is_skipped() {
        let own = DeviceId::new(OWN);
        let mut handler = ResponseHandler::new(&own);
        handler.start_element("updates", &attrs(&[("deviceID", OWN)]));
        handler.start_element("volumeUpdated", &Attributes::new());
        handler.start_element("volume", &Attributes::new());
        handler.start_element("actualvolume", &Attributes::new());
        handler.characters("loud");
        handler.end_element();
        handler.start_element("muteenabled", &Attributes::new());
        handler.characters("true");
        handler.end_element();
        handler.end_element();

        assert_eq!(handler.finish(), vec![ModelUpdate::Mute(true)]);
    }

    #[rstest]
    #[case("true", true)]
    #[case("TRUE", true)]
    #[case("True", true)]
    #[case("false", false)]
    #[case("yes", false)]
    fn test_mute_flag_ignores_case(#[case] text: &str, #[case] muted: bool) {
        let own = DeviceId::new(OWN);
        let mut handler = ResponseHandler::new(&own);
        handler.start_element("updates", &attrs(&[("deviceID", OWN)]));
        handler.start_element("volumeUpdated", &Attributes::new());
        handler.start_element("volume", &Attributes::new());
        handler.start_element("muteenabled", &Attributes::new());
        handler.characters(text);
        handler.end_element();
        handler.end_element();

        assert_eq!(handler.finish(), vec![ModelUpdate::Mute(muted)]);
    }

        #[test]
    fn test_unbalanced_close_is_ignored() {
        let own = DeviceId::new(OWN);
        let mut handler = ResponseHandler::new(&own);
        handler.end_element();
        assert_eq!(handler.state(), ParserState::Init);
    }
}
