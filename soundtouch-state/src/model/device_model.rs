//! Per-device mutable state

use std::collections::BTreeMap;

use soundtouch_api::{
    Connectivity, ContentItem, DeviceId, OperationMode, Preset, Query, RadioStation, ZoneMember,
    ZoneState,
};
use soundtouch_stream::ModelUpdate;
use tracing::{debug, warn};

use super::{DeviceChange, NowPlaying};
use crate::operation_mode::resolve_operation_mode;
use crate::registry::DeviceRegistry;
use crate::zone::zone_summary;

/// Everything one model mutation produced
///
/// Collected while the model lock is held and acted on after release.
#[derive(Debug, Default)]
pub struct Outcome {
    pub changes: Vec<DeviceChange>,
    pub queries: Vec<Query>,
}

impl Outcome {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, change: DeviceChange) {
        self.changes.push(change);
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty() && self.queries.is_empty()
    }
}

/// Local copy of one device's state
#[derive(Debug, Clone)]
pub struct DeviceModel {
    id: DeviceId,
    device_name: Option<String>,
    device_type: Option<String>,
    connectivity: Connectivity,
    status_reason: String,
    operation_mode: OperationMode,
    radio_station: RadioStation,
    powered: Option<bool>,
    volume: u8,
    muted: bool,
    current_source: Option<String>,
    current_content_item: Option<ContentItem>,
    now_playing: NowPlaying,
    presets: BTreeMap<i32, Preset>,
    zone_state: ZoneState,
    zone_master: Option<DeviceId>,
    zone_members: Vec<ZoneMember>,
    zone_summary: String,
}

impl DeviceModel {
    pub fn new(id: DeviceId) -> Self {
        Self {
            id,
            device_name: None,
            device_type: None,
            connectivity: Connectivity::Offline,
            status_reason: String::new(),
            operation_mode: OperationMode::Offline,
            radio_station: RadioStation::Unknown,
            powered: None,
            volume: 0,
            muted: false,
            current_source: None,
            current_content_item: None,
            now_playing: NowPlaying::default(),
            presets: BTreeMap::new(),
            zone_state: ZoneState::None,
            zone_master: None,
            zone_members: Vec::new(),
            zone_summary: String::new(),
        }
    }

    pub fn id(&self) -> &DeviceId {
        &self.id
    }

    pub fn device_name(&self) -> Option<&str> {
        self.device_name.as_deref()
    }

    pub fn device_type(&self) -> Option<&str> {
        self.device_type.as_deref()
    }

    pub fn connectivity(&self) -> Connectivity {
        self.connectivity
    }

    pub fn status_reason(&self) -> &str {
        &self.status_reason
    }

    pub fn operation_mode(&self) -> OperationMode {
        self.operation_mode
    }

    pub fn radio_station(&self) -> RadioStation {
        self.radio_station
    }

    /// Last power state reported to listeners
    pub fn is_powered(&self) -> bool {
        self.powered.unwrap_or(false)
    }

    pub fn volume(&self) -> u8 {
        self.volume
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    pub fn current_source(&self) -> Option<&str> {
        self.current_source.as_deref()
    }

    pub fn current_content_item(&self) -> Option<&ContentItem> {
        self.current_content_item.as_ref()
    }

    pub fn now_playing(&self) -> &NowPlaying {
        &self.now_playing
    }

    pub fn presets(&self) -> &BTreeMap<i32, Preset> {
        &self.presets
    }

    pub fn preset(&self, position: i32) -> Option<&Preset> {
        self.presets.get(&position)
    }

    pub fn zone_state(&self) -> ZoneState {
        self.zone_state
    }

    /// Identity of the zone master, only while this device is a member
    pub fn zone_master(&self) -> Option<&DeviceId> {
        self.zone_master.as_ref()
    }

    pub fn zone_members(&self) -> &[ZoneMember] {
        &self.zone_members
    }

    pub fn zone_summary(&self) -> &str {
        &self.zone_summary
    }

    /// Apply one parsed update
    pub fn apply(&mut self, update: ModelUpdate, registry: &DeviceRegistry, out: &mut Outcome) {
        match update {
            ModelUpdate::DeviceName(name) => {
                if self.device_name.as_deref() != Some(name.as_str()) {
                    self.device_name = Some(name.clone());
                    out.push(DeviceChange::DeviceNameChanged { name });
                }
            }
            ModelUpdate::DeviceType(device_type) => {
                if self.device_type.as_deref() != Some(device_type.as_str()) {
                    self.device_type = Some(device_type.clone());
                    out.push(DeviceChange::DeviceTypeChanged { device_type });
                }
            }
            ModelUpdate::NowPlayingSource(source) => {
                if self.current_source.as_deref() != Some(source.as_str()) {
                    debug!(device = %self.id, %source, "Now playing source changed");
                    self.current_source = Some(source.clone());
                    out.push(DeviceChange::NowPlayingSourceChanged { source });
                    if self.now_playing.clear() {
                        out.push(DeviceChange::NowPlayingCleared);
                    }
                }
            }
            ModelUpdate::NowPlayingField(field, value) => {
                if self.now_playing.set(field, value.clone()) {
                    out.push(DeviceChange::NowPlayingFieldChanged { field, value });
                }
            }
            ModelUpdate::NowPlayingItem(item) => {
                if self.current_content_item.as_ref() != Some(&item) {
                    self.current_content_item = Some(item.clone());
                    out.push(DeviceChange::ContentItemChanged { item: Some(item) });
                }
                self.recompute_operation_mode(out);
            }
            ModelUpdate::PresetsCleared => {
                self.presets.clear();
            }
            ModelUpdate::PresetStored(preset) => {
                let position = preset.position();
                self.presets.insert(position, preset);
                out.push(DeviceChange::PresetChanged { position });
                self.recompute_operation_mode(out);
            }
            ModelUpdate::Volume(volume) => self.set_volume(volume, out),
            ModelUpdate::Mute(muted) => {
                if self.muted != muted {
                    self.muted = muted;
                    out.push(DeviceChange::MuteChanged { muted });
                }
            }
            ModelUpdate::ZoneStarted { master } => self.start_zone(master, registry),
            ModelUpdate::ZoneMemberStarted { ip_address } => {
                self.zone_members.push(ZoneMember::from_address(ip_address));
            }
            ModelUpdate::ZoneMemberMac(mac) => {
                if registry.lookup(&mac).is_none() {
                    warn!(device = %self.id, member = %mac, "Zone member is not a registered device");
                }
                match self.zone_members.last_mut() {
                    Some(member) => member.set_mac(mac),
                    None => warn!(device = %self.id, member = %mac, "Zone member address without member"),
                }
            }
            ModelUpdate::ZonesChanged => self.zones_changed(registry, out),
            ModelUpdate::FollowUp(query) => out.queries.push(query),
        }
    }

    fn set_volume(&mut self, volume: u8, out: &mut Outcome) {
        if self.volume != volume {
            let old_volume = self.volume;
            self.volume = volume;
            out.push(DeviceChange::VolumeChanged {
                old_volume,
                new_volume: volume,
            });
        }
    }

    fn start_zone(&mut self, master: Option<DeviceId>, registry: &DeviceRegistry) {
        self.zone_members.clear();
        match master {
            None => {
                self.zone_state = ZoneState::None;
                self.zone_master = None;
            }
            Some(master) if master == self.id => {
                self.zone_state = ZoneState::Master;
                self.zone_master = None;
            }
            Some(master) => {
                if registry.lookup(&master).is_none() {
                    warn!(device = %self.id, %master, "Zone master is not a registered device");
                }
                self.zone_state = ZoneState::Member;
                self.zone_master = Some(master);
            }
        }
    }

    /// Settle zone state after a zone element closed
    pub fn zones_changed(&mut self, registry: &DeviceRegistry, out: &mut Outcome) {
        if self.zone_state == ZoneState::None || self.zone_members.is_empty() {
            self.reset_zone();
        }
        self.refresh_zone_summary(registry, out);
    }

    pub(crate) fn reset_zone(&mut self) {
        self.zone_state = ZoneState::None;
        self.zone_master = None;
        self.zone_members.clear();
    }

    pub(crate) fn zone_members_mut(&mut self) -> &mut Vec<ZoneMember> {
        &mut self.zone_members
    }

    pub(crate) fn set_zone_state(&mut self, state: ZoneState) {
        self.zone_state = state;
        if state != ZoneState::Member {
            self.zone_master = None;
        }
    }

    /// Recompute the zone summary, notifying only on change
    pub fn refresh_zone_summary(&mut self, registry: &DeviceRegistry, out: &mut Outcome) {
        let summary = zone_summary(self, registry);
        if summary != self.zone_summary {
            self.zone_summary = summary.clone();
            out.push(DeviceChange::ZoneSummaryChanged { summary });
        }
    }

    /// Derive operation mode, radio station and power again
    ///
    /// Only values that differ from the last reported ones are notified.
    pub fn recompute_operation_mode(&mut self, out: &mut Outcome) {
        let (mode, station) = resolve_operation_mode(
            self.connectivity,
            self.current_content_item.as_ref(),
            &self.presets,
        );

        if mode != self.operation_mode {
            debug!(device = %self.id, old = %self.operation_mode, new = %mode, "Operation mode changed");
            out.push(DeviceChange::OperationModeChanged {
                old_mode: self.operation_mode,
                new_mode: mode,
            });
            self.operation_mode = mode;
        }

        if station != self.radio_station {
            self.radio_station = station;
            out.push(DeviceChange::RadioStationChanged { station });
        }

        let powered = self.connectivity == Connectivity::Online && mode.is_powered();
        if self.powered != Some(powered) {
            self.powered = Some(powered);
            out.push(DeviceChange::PowerChanged { powered });
        }
    }

    /// A new connection attempt started; zone state is rebuilt from scratch
    pub fn set_connecting(&mut self, registry: &DeviceRegistry, out: &mut Outcome) {
        self.reset_zone();
        self.refresh_zone_summary(registry, out);
        self.set_connectivity(Connectivity::Connecting, String::new(), out);
        self.recompute_operation_mode(out);
    }

    pub fn set_online(&mut self, out: &mut Outcome) {
        self.set_connectivity(Connectivity::Online, String::new(), out);
        self.recompute_operation_mode(out);
    }

    /// The connection closed or failed
    pub fn set_offline(&mut self, reason: impl Into<String>, out: &mut Outcome) {
        self.set_connectivity(Connectivity::Offline, reason.into(), out);
        if self.current_content_item.take().is_some() {
            out.push(DeviceChange::ContentItemChanged { item: None });
        }
        self.recompute_operation_mode(out);
    }

    fn set_connectivity(&mut self, connectivity: Connectivity, reason: String, out: &mut Outcome) {
        if self.connectivity == connectivity && self.status_reason == reason {
            return;
        }
        self.connectivity = connectivity;
        self.status_reason = reason.clone();
        out.push(DeviceChange::ConnectivityChanged {
            connectivity,
            reason,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::RegisteredDevice;
    use soundtouch_api::Source;
    use soundtouch_stream::NowPlayingField;

    const OWN: &str = "A0F6FD12ABCD";

    fn online_model() -> DeviceModel {
        let mut model = DeviceModel::new(DeviceId::new(OWN));
        model.set_online(&mut Outcome::new());
        model
    }

    fn jazz() -> ContentItem {
        ContentItem::new(Source::InternetRadio, "L1", "", "Jazz24")
    }

    fn apply_all(model: &mut DeviceModel, registry: &DeviceRegistry, updates: Vec<ModelUpdate>) -> Outcome {
        let mut out = Outcome::new();
        for update in updates {
            model.apply(update, registry, &mut out);
        }
        out
    }

    #[test]
    fn test_initial_state() {
        let model = DeviceModel::new(DeviceId::new(OWN));
        assert_eq!(model.connectivity(), Connectivity::Offline);
        assert_eq!(model.operation_mode(), OperationMode::Offline);
        assert_eq!(model.zone_state(), ZoneState::None);
        assert!(model.zone_members().is_empty());
        assert!(!model.is_powered());
    }

    #[test]
    fn test_online_without_item_is_standby() {
        let mut model = DeviceModel::new(DeviceId::new(OWN));
        let mut out = Outcome::new();
        model.set_online(&mut out);
        assert_eq!(model.operation_mode(), OperationMode::Standby);
        assert!(out.changes.contains(&DeviceChange::OperationModeChanged {
            old_mode: OperationMode::Offline,
            new_mode: OperationMode::Standby,
        }));
        assert!(out.changes.contains(&DeviceChange::PowerChanged { powered: false }));
    }

    #[test]
    fn test_recompute_is_idempotent() {
        let mut model = online_model();
        let registry = DeviceRegistry::new();
        apply_all(&mut model, &registry, vec![ModelUpdate::NowPlayingItem(jazz())]);

        let mut out = Outcome::new();
        model.recompute_operation_mode(&mut out);
        model.recompute_operation_mode(&mut out);
        assert!(out.changes.is_empty());
    }

    #[test]
    fn test_volume_notifies_only_on_change() {
        let mut model = online_model();
        let registry = DeviceRegistry::new();
        let out = apply_all(
            &mut model,
            &registry,
            vec![ModelUpdate::Volume(30), ModelUpdate::Volume(30), ModelUpdate::Mute(false)],
        );
        assert_eq!(
            out.changes,
            vec![DeviceChange::VolumeChanged {
                old_volume: 0,
                new_volume: 30
            }]
        );
        assert_eq!(model.volume(), 30);
    }

    #[test]
    fn test_presets_refresh_replaces_map() {
        let mut model = online_model();
        let registry = DeviceRegistry::new();
        apply_all(
            &mut model,
            &registry,
            vec![
                ModelUpdate::PresetsCleared,
                ModelUpdate::PresetStored(Preset::with_content_item(1, jazz())),
                ModelUpdate::PresetStored(Preset::with_content_item(4, jazz())),
            ],
        );
        assert_eq!(model.presets().len(), 2);

        apply_all(
            &mut model,
            &registry,
            vec![
                ModelUpdate::PresetsCleared,
                ModelUpdate::PresetStored(Preset::with_content_item(2, jazz())),
            ],
        );
        assert_eq!(model.presets().keys().copied().collect::<Vec<_>>(), vec![2]);
    }

    #[test]
    fn test_source_change_clears_details() {
        let mut model = online_model();
        let registry = DeviceRegistry::new();
        apply_all(
            &mut model,
            &registry,
            vec![
                ModelUpdate::NowPlayingSource("INTERNET_RADIO".to_string()),
                ModelUpdate::NowPlayingField(NowPlayingField::Artist, "Miles Davis".to_string()),
            ],
        );

        let out = apply_all(
            &mut model,
            &registry,
            vec![ModelUpdate::NowPlayingSource("BLUETOOTH".to_string())],
        );
        assert_eq!(
            out.changes,
            vec![
                DeviceChange::NowPlayingSourceChanged {
                    source: "BLUETOOTH".to_string()
                },
                DeviceChange::NowPlayingCleared,
            ]
        );
        assert!(model.now_playing().is_empty());
        assert_eq!(model.current_source(), Some("BLUETOOTH"));
    }

    #[test]
    fn test_offline_clears_item() {
        let mut model = online_model();
        let registry = DeviceRegistry::new();
        apply_all(&mut model, &registry, vec![ModelUpdate::NowPlayingItem(jazz())]);
        assert_eq!(model.operation_mode(), OperationMode::InternetRadio);

        let mut out = Outcome::new();
        model.set_offline("Connection reset", &mut out);
        assert_eq!(model.connectivity(), Connectivity::Offline);
        assert_eq!(model.status_reason(), "Connection reset");
        assert!(model.current_content_item().is_none());
        assert_eq!(model.operation_mode(), OperationMode::Other);
        assert!(out.changes.contains(&DeviceChange::ContentItemChanged { item: None }));
        assert!(out.changes.contains(&DeviceChange::PowerChanged { powered: false }));
    }

    #[test]
    fn test_zone_member_of_other_master() {
        let registry = DeviceRegistry::new();
        registry
            .register(RegisteredDevice::new(DeviceId::new("B1B1B1B1B1B1"), "10.0.0.2", "Kitchen"))
            .unwrap();
        let mut model = online_model();
        let out = apply_all(
            &mut model,
            &registry,
            vec![
                ModelUpdate::ZoneStarted {
                    master: Some(DeviceId::new("B1B1B1B1B1B1")),
                },
                ModelUpdate::ZoneMemberStarted {
                    ip_address: "10.0.0.1".to_string(),
                },
                ModelUpdate::ZoneMemberMac(DeviceId::new(OWN)),
                ModelUpdate::ZonesChanged,
            ],
        );

        assert_eq!(model.zone_state(), ZoneState::Member);
        assert_eq!(model.zone_master(), Some(&DeviceId::new("B1B1B1B1B1B1")));
        assert_eq!(model.zone_summary(), "Member; Master is: Kitchen; Members: ");
        assert_eq!(out.changes.len(), 1);
    }

    #[test]
    fn test_empty_zone_resets_state() {
        let registry = DeviceRegistry::new();
        let mut model = online_model();
        apply_all(
            &mut model,
            &registry,
            vec![
                ModelUpdate::ZoneStarted { master: None },
                ModelUpdate::ZoneMemberStarted {
                    ip_address: "10.0.0.2".to_string(),
                },
                ModelUpdate::ZonesChanged,
            ],
        );
        assert_eq!(model.zone_state(), ZoneState::None);
        assert!(model.zone_members().is_empty());
        assert_eq!(model.zone_summary(), "");
    }

    #[test]
    fn test_follow_ups_are_collected() {
        let mut model = online_model();
        let out = apply_all(
            &mut model,
            &DeviceRegistry::new(),
            vec![ModelUpdate::FollowUp(Query::Volume), ModelUpdate::FollowUp(Query::Zone)],
        );
        assert_eq!(out.queries, vec![Query::Volume, Query::Zone]);
        assert!(out.changes.is_empty());
    }
}
