//! Zone coordination
//!
//! A zone is a group of devices where one master drives playback on its
//! members. Every device keeps its own view of the zone; views converge as
//! each device receives its own zone notification and queries the zone
//! again. Other devices are only reached through the [`DeviceRegistry`].

use soundtouch_api::{DeviceId, Frame, RequestEncoder, ZoneMember, ZoneState};
use tracing::{info, warn};

use crate::error::{Result, StateError};
use crate::model::{DeviceModel, Outcome};
use crate::registry::{DeviceRegistry, RegisteredDevice};

/// Shown when a zone master cannot be resolved
pub const UNKNOWN_MASTER: &str = "<unknown>";

/// Human-readable description of a device's zone
///
/// Members that cannot be resolved through the registry are left out.
pub fn zone_summary(model: &DeviceModel, registry: &DeviceRegistry) -> String {
    let members = || {
        model
            .zone_members()
            .iter()
            .filter_map(|member| member.mac())
            .filter_map(|mac| registry.display_name(mac))
            .collect::<Vec<_>>()
            .join(", ")
    };

    match model.zone_state() {
        ZoneState::None => String::new(),
        ZoneState::Master => format!("Master; Members: {}", members()),
        ZoneState::Member => {
            let master = model
                .zone_master()
                .and_then(|master| registry.display_name(master))
                .unwrap_or_else(|| UNKNOWN_MASTER.to_string());
            format!("Member; Master is: {}; Members: {}", master, members())
        }
    }
}

/// Applies zone commands to one device's model
pub struct ZoneCoordinator<'a> {
    model: &'a mut DeviceModel,
    registry: &'a DeviceRegistry,
}

impl<'a> ZoneCoordinator<'a> {
    pub fn new(model: &'a mut DeviceModel, registry: &'a DeviceRegistry) -> Self {
        Self { model, registry }
    }

    /// Add another device to this device's zone
    ///
    /// A device without a zone becomes its master.
    pub fn add_member(&mut self, target: &RegisteredDevice, out: &mut Outcome) -> Result<()> {
        let own = self.model.id().clone();
        if target.id() == &own {
            return Err(StateError::InvalidParameter(format!(
                "device {} cannot join its own zone",
                own
            )));
        }
        if self.contains(target.id()) {
            warn!(device = %own, member = %target.id(), "Device is already a zone member");
            return Err(StateError::AlreadyZoneMember(target.id().clone()));
        }

        self.model
            .zone_members_mut()
            .push(ZoneMember::new(target.id().clone(), target.host()));
        if self.model.zone_state() == ZoneState::None {
            self.model.set_zone_state(ZoneState::Master);
        }
        info!(device = %own, member = %target.id(), "Added zone member");
        self.model.refresh_zone_summary(self.registry, out);
        Ok(())
    }

    /// Remove a device from this device's zone
    pub fn remove_member(&mut self, target: &DeviceId, out: &mut Outcome) -> Result<()> {
        let own = self.model.id().clone();
        if !self.contains(target) {
            warn!(device = %own, member = %target, "Device is not a zone member");
            return Err(StateError::NotZoneMember(target.clone()));
        }

        self.model.zone_members_mut().retain(|member| !member.is(target));
        if self.model.zone_members().is_empty() {
            self.model.set_zone_state(ZoneState::None);
        }
        info!(device = %own, member = %target, "Removed zone member");
        self.model.refresh_zone_summary(self.registry, out);
        Ok(())
    }

    /// Frame announcing the current topology with this device as master
    pub fn topology(&self, encoder: &RequestEncoder) -> Frame {
        encoder.zone(self.model.id(), self.model.zone_members())
    }

    fn contains(&self, id: &DeviceId) -> bool {
        self.model.zone_members().iter().any(|member| member.is(id))
    }
}
