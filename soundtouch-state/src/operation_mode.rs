//! Operation mode resolution

use std::collections::BTreeMap;

use soundtouch_api::{Connectivity, ContentItem, OperationMode, Preset, RadioStation};

/// Derive the operation mode and radio station of a device
///
/// A device that is not online is `Other`. An online device with nothing
/// selected is in standby. Otherwise the current content item is matched
/// against every valid preset in ascending position order; the last match
/// wins and means internet radio on that preset's station. Without a match
/// the mode follows the item's source.
pub fn resolve_operation_mode(
    connectivity: Connectivity,
    current_item: Option<&ContentItem>,
    presets: &BTreeMap<i32, Preset>,
) -> (OperationMode, RadioStation) {
    if connectivity != Connectivity::Online {
        return (OperationMode::Other, RadioStation::Unknown);
    }

    let Some(item) = current_item else {
        return (OperationMode::Standby, RadioStation::Unknown);
    };

    let mut resolved = None;
    for preset in presets.values() {
        if preset.content_item() != Some(item) {
            continue;
        }
        if let Some(station) = preset.radio_station() {
            resolved = Some((OperationMode::InternetRadio, station));
        }
    }

    resolved.unwrap_or_else(|| (OperationMode::from(item.source()), RadioStation::Unknown))
}
