//! Property-based tests for the response state machine

use proptest::prelude::*;

use soundtouch_api::DeviceId;
use soundtouch_stream::{parse_message, ModelUpdate};

const OWN: &str = "A0F6FD12ABCD";

// ============================================================================
// Test Helpers
// ============================================================================

/// Device ids that never equal our own, in any case
fn foreign_id_strategy() -> impl Strategy<Value = String> {
    "[0-9A-Fa-f]{12}".prop_filter("must differ from own id", |id| !id.eq_ignore_ascii_case(OWN))
}

/// Element names unlikely to be in the transition table
fn unknown_name_strategy() -> impl Strategy<Value = String> {
    "x[a-zA-Z]{1,10}"
}

fn mutates_content(update: &ModelUpdate) -> bool {
    matches!(
        update,
        ModelUpdate::NowPlayingItem(_)
            | ModelUpdate::NowPlayingSource(_)
            | ModelUpdate::PresetsCleared
            | ModelUpdate::PresetStored(_)
            | ModelUpdate::ZoneStarted { .. }
            | ModelUpdate::ZoneMemberStarted { .. }
            | ModelUpdate::ZoneMemberMac(_)
            | ModelUpdate::ZonesChanged
    )
}

fn now_playing_body(now_playing_id: &str) -> String {
    format!(
        r#"<nowPlaying deviceID="{}" source="INTERNET_RADIO"><ContentItem source="INTERNET_RADIO" location="L1" sourceAccount=""><itemName>Jazz24</itemName></ContentItem></nowPlaying>"#,
        now_playing_id
    )
}

fn presets_and_zone_body() -> &'static str {
    r#"<presets><preset id="2"><ContentItem source="INTERNET_RADIO" location="L1"><itemName>Jazz24</itemName></ContentItem></preset></presets><zone master="A0F6FD12ABCD"><member ipaddress="10.0.0.2">B1B1B1B1B1B1</member></zone>"#
}

// ============================================================================
// Identity mismatch
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// A foreign id on the updates envelope discards everything inside it
    #[test]
    fn prop_foreign_updates_envelope_is_ignored(foreign in foreign_id_strategy()) {
        let xml = format!(
            r#"<updates deviceID="{}"><nowPlayingUpdated>{}</nowPlayingUpdated></updates>"#,
            foreign,
            now_playing_body(OWN)
        );
        let updates = parse_message(&DeviceId::new(OWN), &xml).unwrap();
        prop_assert!(updates.is_empty());
    }

    /// A foreign id on a reply header discards the whole body
    #[test]
    fn prop_foreign_reply_header_is_ignored(foreign in foreign_id_strategy()) {
        let xml = format!(
            r#"<msg><header deviceID="{}" url="presets" method="GET"><request requestID="1"><info type="new"/></request></header><body>{}</body></msg>"#,
            foreign,
            presets_and_zone_body()
        );
        let updates = parse_message(&DeviceId::new(OWN), &xml).unwrap();
        prop_assert!(!updates.iter().any(mutates_content));
    }

    /// A foreign id on the now playing element keeps the current item
    #[test]
    fn prop_foreign_now_playing_is_ignored(foreign in foreign_id_strategy()) {
        let xml = format!(
            r#"<updates deviceID="{}"><nowPlayingUpdated>{}</nowPlayingUpdated></updates>"#,
            OWN,
            now_playing_body(&foreign)
        );
        let updates = parse_message(&DeviceId::new(OWN), &xml).unwrap();
        prop_assert!(!updates.iter().any(mutates_content));
    }
}

// ============================================================================
// Unknown elements
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Unknown elements at any depth are skipped without losing known data
    #[test]
    fn prop_unknown_elements_are_skipped(
        name in unknown_name_strategy(),
        text in "[a-zA-Z0-9 ]{0,20}",
        depth in 0usize..4,
    ) {
        let mut unknown = text.clone();
        for _ in 0..=depth {
            unknown = format!("<{0} attr=\"1\">{1}</{0}>", name, unknown);
        }
        let xml = format!(
            r#"<updates deviceID="{own}">{u}<volumeUpdated>{u}<volume>{u}<actualvolume>42</actualvolume>{u}</volume></volumeUpdated></updates>"#,
            own = OWN,
            u = unknown
        );

        let updates = parse_message(&DeviceId::new(OWN), &xml).unwrap();
        prop_assert_eq!(updates, vec![ModelUpdate::Volume(42), ModelUpdate::Mute(false)]);
    }

    /// Arbitrary well-formed documents never fail to parse
    #[test]
    fn prop_unknown_top_level_never_raises(
        name in unknown_name_strategy(),
        child in unknown_name_strategy(),
        text in "[a-zA-Z0-9 ]{0,20}",
    ) {
        let xml = format!("<{0}><{1}>{2}</{1}><{1}/></{0}>", name, child, text);
        let updates = parse_message(&DeviceId::new(OWN), &xml).unwrap();
        prop_assert!(updates.is_empty());
    }
}
