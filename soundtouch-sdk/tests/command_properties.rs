//! Property-based tests for free-text command parsing

use proptest::prelude::*;
use soundtouch_sdk::{ControlCommand, SdkError};

/// Randomly upper-case characters of a keyword
fn any_case(keyword: &'static str) -> impl Strategy<Value = String> {
    prop::collection::vec(any::<bool>(), keyword.len()).prop_map(move |upper| {
        keyword
            .chars()
            .zip(upper)
            .map(|(c, up)| if up { c.to_ascii_uppercase() } else { c })
            .collect()
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn prop_volume_in_range_parses(level in 0u8..=100, keyword in any_case("volume")) {
        let command = ControlCommand::parse(&format!("{} {}", keyword, level)).unwrap();
        prop_assert_eq!(command, ControlCommand::Volume(level));
    }

    #[test]
    fn prop_volume_out_of_range_rejected(level in 101u32..100_000) {
        let result = ControlCommand::parse(&format!("volume {}", level));
        prop_assert!(matches!(result, Err(SdkError::InvalidCommand(_))));
    }

    #[test]
    fn prop_preset_slots(slot in 0u8..20, keyword in any_case("preset"), spaced in any::<bool>()) {
        let input = if spaced {
            format!("{} {}", keyword, slot)
        } else {
            format!("{}{}", keyword, slot)
        };
        let result = ControlCommand::parse(&input);
        if (1..=6).contains(&slot) {
            prop_assert_eq!(result.unwrap(), ControlCommand::Preset(slot));
        } else {
            prop_assert!(result.is_err());
        }
    }

    /// Device arguments keep their case and inner spacing
    #[test]
    fn prop_zone_target_preserved(target in "[A-Za-z0-9][A-Za-z0-9 ]{0,15}[A-Za-z0-9]", keyword in any_case("add")) {
        let command = ControlCommand::parse(&format!("zone {} {}", keyword, target)).unwrap();
        prop_assert_eq!(command, ControlCommand::ZoneAdd(target));
    }
}
