//! Property-based tests for the content model and request encoder

use proptest::prelude::*;

use soundtouch_api::{
    ApiError, ContentItem, DeviceId, KeyState, Query, RemoteKey, RequestEncoder, Source,
};

// ============================================================================
// Test Helpers
// ============================================================================

/// Strategy for generating MAC-style device ids
fn device_id_strategy() -> impl Strategy<Value = String> {
    "[0-9A-F]{12}"
}

fn source_strategy() -> impl Strategy<Value = Source> {
    prop_oneof![
        Just(Source::InternetRadio),
        Just(Source::Standby),
        Just(Source::Aux),
        Just(Source::Bluetooth),
        Just(Source::Other),
    ]
}

fn content_item_strategy() -> impl Strategy<Value = ContentItem> {
    (source_strategy(), "[a-z0-9/]{0,12}", "[a-z]{0,6}", "[A-Za-z ]{0,10}")
        .prop_map(|(source, location, account, name)| ContentItem::new(source, location, account, name))
}

// ============================================================================
// Content item equality
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Two content items are equal exactly when all four fields match
    #[test]
    fn prop_content_item_equality_is_field_wise(
        a in content_item_strategy(),
        b in content_item_strategy(),
    ) {
        let fields_match = a.source() == b.source()
            && a.location() == b.location()
            && a.source_account() == b.source_account()
            && a.item_name() == b.item_name();
        prop_assert_eq!(a == b, fields_match);
        prop_assert_eq!(a.clone(), a);
    }

    /// Device ids compare equal regardless of case or surrounding whitespace
    #[test]
    fn prop_device_id_normalizes_case(raw in device_id_strategy()) {
        let lower = format!("  {}\t", raw.to_lowercase());
        prop_assert_eq!(DeviceId::new(&lower), DeviceId::new(&raw));
        prop_assert!(DeviceId::new(&raw).matches(&lower));
    }
}

// ============================================================================
// Request encoder
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Volumes in range encode, volumes above 100 are rejected
    #[test]
    fn prop_volume_range(level in any::<u8>()) {
        let encoder = RequestEncoder::new(DeviceId::new("A0F6FD12ABCD"));
        match encoder.volume(level) {
            Ok(frame) => {
                prop_assert!(level <= 100);
                let expected = format!(">{}</volume>", level);
                prop_assert!(frame.as_str().contains(&expected));
            }
            Err(ApiError::InvalidParameter(_)) => prop_assert!(level > 100),
            Err(other) => prop_assert!(false, "unexpected error {:?}", other),
        }
    }

    /// Request ids strictly increase between resets
    #[test]
    fn prop_request_ids_strictly_increase(count in 1usize..50) {
        let encoder = RequestEncoder::new(DeviceId::new("A0F6FD12ABCD"));
        let mut last = None;
        for i in 0..count {
            let frame = if i % 2 == 0 {
                encoder.query(Query::NowPlaying)
            } else {
                encoder.key(RemoteKey::Play, KeyState::Press)
            };
            if let Some(previous) = last {
                prop_assert!(frame.request_id() > previous);
            }
            last = Some(frame.request_id());
        }
        encoder.reset();
        prop_assert_eq!(encoder.query(Query::Info).request_id(), 0);
    }

    /// Every frame carries the encoder's device id
    #[test]
    fn prop_frames_carry_device_id(raw in device_id_strategy()) {
        let encoder = RequestEncoder::new(DeviceId::new(&raw));
        let frame = encoder.query(Query::Presets);
        let expected = format!(r#"deviceID="{}""#, raw);
        prop_assert!(frame.as_str().contains(&expected));
    }
}
