//! Device handler
//!
//! [`SoundTouchDevice`] owns the push connection to one device and keeps its
//! [`DeviceModel`] in sync. Inbound messages and commands both mutate the
//! model inside one short critical section. Frames and notifications
//! collected there are dispatched only after the lock is released, so no
//! I/O ever happens while the model is locked.
//!
//! Each connection attempt gets a generation number. Callbacks carrying an
//! older generation belong to a replaced connection and are ignored.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use soundtouch_api::request::MAX_VOLUME;
use soundtouch_api::{
    ApiError, Connectivity, ContentItem, DeviceId, Frame, KeyState, OperationMode, Preset, Query,
    RadioStation, RemoteKey, RequestEncoder, ZoneMember, ZoneState,
};
use soundtouch_stream::{parse_message, ConnectionListener, Connector, StreamError, Transport};
use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};

use crate::config::DeviceConfig;
use crate::error::{Result, StateError};
use crate::model::{DeviceChange, DeviceEvent, DeviceModel, NowPlaying, Outcome};
use crate::registry::{DeviceRegistry, RegisteredDevice};
use crate::zone::ZoneCoordinator;

/// Buffered notifications per subscriber before the oldest are dropped
const EVENT_CAPACITY: usize = 256;

struct ActiveTransport {
    generation: u64,
    transport: Box<dyn Transport>,
}

struct DeviceInner {
    config: DeviceConfig,
    entry: Arc<RegisteredDevice>,
    registry: DeviceRegistry,
    connector: Arc<dyn Connector>,
    encoder: RequestEncoder,
    model: Mutex<DeviceModel>,
    transport: Mutex<Option<ActiveTransport>>,
    generation: AtomicU64,
    disposed: AtomicBool,
    changes: broadcast::Sender<DeviceChange>,
    events: Option<broadcast::Sender<DeviceEvent>>,
}

/// A managed SoundTouch device
///
/// Dropping the handle disposes the device.
pub struct SoundTouchDevice {
    inner: Arc<DeviceInner>,
}

impl SoundTouchDevice {
    /// Register a device; the connection is opened by [`SoundTouchDevice::open`]
    pub fn new(
        config: DeviceConfig,
        registry: DeviceRegistry,
        connector: Arc<dyn Connector>,
    ) -> Result<Self> {
        Self::build(config, registry, connector, None)
    }

    /// Like [`SoundTouchDevice::new`], also publishing every change to `events`
    pub fn with_events(
        config: DeviceConfig,
        registry: DeviceRegistry,
        connector: Arc<dyn Connector>,
        events: broadcast::Sender<DeviceEvent>,
    ) -> Result<Self> {
        Self::build(config, registry, connector, Some(events))
    }

    fn build(
        config: DeviceConfig,
        registry: DeviceRegistry,
        connector: Arc<dyn Connector>,
        events: Option<broadcast::Sender<DeviceEvent>>,
    ) -> Result<Self> {
        let entry = registry.register(RegisteredDevice::new(
            config.mac.clone(),
            config.host.clone(),
            config.initial_display_name(),
        ))?;
        let (changes, _) = broadcast::channel(EVENT_CAPACITY);
        info!(device = %config.mac, host = %config.host, "Initialized device");

        Ok(Self {
            inner: Arc::new(DeviceInner {
                encoder: RequestEncoder::new(config.mac.clone()),
                model: Mutex::new(DeviceModel::new(config.mac.clone())),
                config,
                entry,
                registry,
                connector,
                transport: Mutex::new(None),
                generation: AtomicU64::new(0),
                disposed: AtomicBool::new(false),
                changes,
                events,
            }),
        })
    }

    /// Open a fresh connection, replacing any existing one
    pub fn open(&self) -> Result<()> {
        self.inner.open()
    }

    /// Unregister the device and close its connection
    pub fn dispose(&self) {
        self.inner.dispose();
    }

    /// Receive every change of this device from now on
    pub fn subscribe(&self) -> broadcast::Receiver<DeviceChange> {
        self.inner.changes.subscribe()
    }

    // ========================================================================
    // Commands
    // ========================================================================

    pub fn set_volume(&self, level: u8) -> Result<()> {
        if level > MAX_VOLUME {
            return Err(ApiError::out_of_range("volume", level, 0, MAX_VOLUME as i64).into());
        }
        self.inner.ensure_connected()?;
        let frame = self.inner.encoder.volume(level)?;
        self.inner.send(frame);
        Ok(())
    }

    /// Toggle mute with the mute key when the state differs
    pub fn set_mute(&self, muted: bool) -> Result<()> {
        if self.inner.model.lock().is_muted() == muted {
            debug!(device = %self.id(), muted, "Mute already in requested state");
            return Ok(());
        }
        self.simulate_key(RemoteKey::Mute)
    }

    /// Toggle power with the power key when the state differs
    pub fn set_power(&self, on: bool) -> Result<()> {
        if self.inner.model.lock().is_powered() == on {
            debug!(device = %self.id(), on, "Power already in requested state");
            return Ok(());
        }
        self.simulate_key(RemoteKey::Power)
    }

    /// Send a key press immediately followed by its release
    pub fn simulate_key(&self, key: RemoteKey) -> Result<()> {
        self.inner.ensure_connected()?;
        self.inner.send(self.inner.encoder.key(key, KeyState::Press));
        self.inner.send(self.inner.encoder.key(key, KeyState::Release));
        Ok(())
    }

    pub fn select_preset(&self, slot: u8) -> Result<()> {
        self.simulate_key(RemoteKey::preset(slot)?)
    }

    pub fn play(&self) -> Result<()> {
        self.simulate_key(RemoteKey::Play)
    }

    pub fn pause(&self) -> Result<()> {
        self.simulate_key(RemoteKey::Pause)
    }

    pub fn play_pause(&self) -> Result<()> {
        self.simulate_key(RemoteKey::PlayPause)
    }

    pub fn next(&self) -> Result<()> {
        self.simulate_key(RemoteKey::NextTrack)
    }

    pub fn previous(&self) -> Result<()> {
        self.simulate_key(RemoteKey::PrevTrack)
    }

    /// Add a device, by identity or display name, to this device's zone
    pub fn zone_add(&self, target: &str) -> Result<()> {
        let target = self.inner.resolve(target)?;
        self.inner.ensure_connected()?;

        let mut out = Outcome::new();
        let frame = {
            let mut model = self.inner.model.lock();
            let mut zone = ZoneCoordinator::new(&mut model, &self.inner.registry);
            zone.add_member(&target, &mut out)?;
            zone.topology(&self.inner.encoder)
        };
        self.inner.send(frame);
        self.inner.finish(out);
        Ok(())
    }

    /// Remove a device, by identity or display name, from this device's zone
    ///
    /// Members that are no longer registered can still be removed by identity.
    pub fn zone_remove(&self, target: &str) -> Result<()> {
        let target = match self.inner.resolve(target) {
            Ok(device) => device.id().clone(),
            Err(StateError::DeviceNotFound(_)) => DeviceId::new(target),
            Err(err) => return Err(err),
        };
        self.inner.ensure_connected()?;

        let mut out = Outcome::new();
        let frame = {
            let mut model = self.inner.model.lock();
            let mut zone = ZoneCoordinator::new(&mut model, &self.inner.registry);
            zone.remove_member(&target, &mut out)?;
            zone.topology(&self.inner.encoder)
        };
        self.inner.send(frame);
        self.inner.finish(out);
        Ok(())
    }

    // ========================================================================
    // Queries
    // ========================================================================

    pub fn id(&self) -> &DeviceId {
        &self.inner.config.mac
    }

    pub fn host(&self) -> &str {
        &self.inner.config.host
    }

    pub fn display_name(&self) -> String {
        self.inner.entry.display_name()
    }

    pub fn device_type(&self) -> Option<String> {
        self.inner.model.lock().device_type().map(str::to_string)
    }

    pub fn connectivity(&self) -> Connectivity {
        self.inner.model.lock().connectivity()
    }

    /// Why the device is offline, empty while connected
    pub fn status_reason(&self) -> String {
        self.inner.model.lock().status_reason().to_string()
    }

    pub fn operation_mode(&self) -> OperationMode {
        self.inner.model.lock().operation_mode()
    }

    pub fn radio_station(&self) -> RadioStation {
        self.inner.model.lock().radio_station()
    }

    pub fn is_powered(&self) -> bool {
        self.inner.model.lock().is_powered()
    }

    pub fn volume(&self) -> u8 {
        self.inner.model.lock().volume()
    }

    pub fn is_muted(&self) -> bool {
        self.inner.model.lock().is_muted()
    }

    pub fn zone_state(&self) -> ZoneState {
        self.inner.model.lock().zone_state()
    }

    pub fn zone_summary(&self) -> String {
        self.inner.model.lock().zone_summary().to_string()
    }

    pub fn zone_members(&self) -> Vec<ZoneMember> {
        self.inner.model.lock().zone_members().to_vec()
    }

    pub fn preset(&self, position: i32) -> Option<Preset> {
        self.inner.model.lock().preset(position).cloned()
    }

    /// Stored presets in ascending position order
    pub fn presets(&self) -> Vec<Preset> {
        self.inner.model.lock().presets().values().cloned().collect()
    }

    pub fn current_content_item(&self) -> Option<ContentItem> {
        self.inner.model.lock().current_content_item().cloned()
    }

    pub fn now_playing(&self) -> NowPlaying {
        self.inner.model.lock().now_playing().clone()
    }

    /// Copy of the whole model
    pub fn snapshot(&self) -> DeviceModel {
        self.inner.model.lock().clone()
    }
}

impl Drop for SoundTouchDevice {
    fn drop(&mut self) {
        self.inner.dispose();
    }
}

impl std::fmt::Debug for SoundTouchDevice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SoundTouchDevice")
            .field("id", self.id())
            .field("host", &self.host())
            .finish()
    }
}

impl DeviceInner {
    fn id(&self) -> &DeviceId {
        &self.config.mac
    }

    fn is_current(&self, generation: u64) -> bool {
        !self.disposed.load(Ordering::SeqCst) && self.generation.load(Ordering::SeqCst) == generation
    }

    fn check_disposed(&self) -> Result<()> {
        if self.disposed.load(Ordering::SeqCst) {
            return Err(StateError::Disposed(self.id().clone()));
        }
        Ok(())
    }

    fn resolve(&self, target: &str) -> Result<Arc<RegisteredDevice>> {
        self.check_disposed()?;
        self.registry
            .resolve(target)
            .ok_or_else(|| StateError::DeviceNotFound(target.to_string()))
    }

    fn open(self: &Arc<Self>) -> Result<()> {
        self.check_disposed()?;

        // Held across connector.open so a concurrent open cannot interleave
        let mut slot = self.transport.lock();
        if let Some(previous) = slot.take() {
            previous.transport.close("reconnecting");
        }
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        // Frames queued before the handshake already belong to this connection
        self.encoder.reset();

        let mut out = Outcome::new();
        self.model.lock().set_connecting(&self.registry, &mut out);
        self.publish(out.changes);

        info!(device = %self.id(), host = %self.config.host, generation, "Opening connection");
        let listener = Arc::new(DeviceListener {
            generation,
            device: Arc::downgrade(self),
        });
        match self.connector.open(&self.config.host, listener) {
            Ok(transport) => {
                *slot = Some(ActiveTransport {
                    generation,
                    transport,
                });
                Ok(())
            }
            Err(err) => {
                drop(slot);
                error!(device = %self.id(), error = %err, "Failed to open connection");
                self.mark_offline(err.to_string());
                Err(err.into())
            }
        }
    }

    /// Reopen when a command finds the device offline
    fn ensure_connected(self: &Arc<Self>) -> Result<()> {
        self.check_disposed()?;
        if self.model.lock().connectivity() == Connectivity::Offline {
            info!(device = %self.id(), "Device offline, reconnecting for command");
            self.open()?;
        }
        Ok(())
    }

    fn dispose(&self) {
        if self.disposed.swap(true, Ordering::SeqCst) {
            return;
        }
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.registry.unregister(self.id());
        if let Some(active) = self.transport.lock().take() {
            active.transport.close("disposed");
        }
        self.mark_offline("Disposed");
        info!(device = %self.id(), "Disposed device");
    }

    fn connection_opened(&self) {
        let mut out = Outcome::new();
        self.model.lock().set_online(&mut out);
        info!(device = %self.id(), "Connection opened");
        self.publish(out.changes);
        self.send(self.encoder.query(Query::Info));
    }

    fn connection_lost(&self, generation: u64, reason: String) {
        {
            // open() bumps the generation while holding the slot
            let mut slot = self.transport.lock();
            if self.generation.load(Ordering::SeqCst) != generation {
                debug!(device = %self.id(), generation, "Ignoring loss of a replaced connection");
                return;
            }
            if slot.as_ref().is_some_and(|active| active.generation == generation) {
                slot.take();
            }
        }
        self.mark_offline(reason);
    }

    fn message_received(&self, text: &str) {
        debug!(device = %self.id(), message = text, "Received message");
        let updates = match parse_message(self.id(), text) {
            Ok(updates) => updates,
            Err(err) => {
                warn!(device = %self.id(), error = %err, "Dropping malformed message");
                return;
            }
        };
        if updates.is_empty() {
            return;
        }

        let mut out = Outcome::new();
        {
            let mut model = self.model.lock();
            for update in updates {
                model.apply(update, &self.registry, &mut out);
            }
        }
        self.finish(out);
    }

    /// Publish changes and send follow-up queries of one mutation
    fn finish(&self, out: Outcome) {
        if self.config.name.is_none() {
            for change in &out.changes {
                if let DeviceChange::DeviceNameChanged { name } = change {
                    self.entry.set_display_name(name.clone());
                }
            }
        }
        self.publish(out.changes);
        for query in out.queries {
            self.send(self.encoder.query(query));
        }
    }

    fn publish(&self, changes: Vec<DeviceChange>) {
        for change in changes {
            info!(device = %self.id(), ?change, "Device state changed");
            if let Some(events) = &self.events {
                let _ = events.send(DeviceEvent::new(self.id().clone(), change.clone()));
            }
            let _ = self.changes.send(change);
        }
    }

    fn mark_offline(&self, reason: impl Into<String>) {
        let mut out = Outcome::new();
        self.model.lock().set_offline(reason, &mut out);
        self.publish(out.changes);
    }

    fn send(&self, frame: Frame) {
        let slot = self.transport.lock();
        let Some(active) = slot.as_ref() else {
            debug!(device = %self.id(), request_id = frame.request_id(), "No connection, dropping frame");
            return;
        };

        debug!(device = %self.id(), frame = frame.as_str(), "Sending frame");
        if let Err(err) = active.transport.send(frame) {
            let generation = active.generation;
            drop(slot);
            self.send_failed(generation, err);
        }
    }

    /// A failed send is handled like a failed connection
    fn send_failed(&self, generation: u64, err: StreamError) {
        error!(device = %self.id(), error = %err, "Failed to send frame");
        let failed = {
            let mut slot = self.transport.lock();
            match slot.take() {
                Some(active) if active.generation == generation => Some(active),
                other => {
                    *slot = other;
                    None
                }
            }
        };
        if let Some(active) = failed {
            active.transport.close("send failed");
            self.mark_offline(err.to_string());
        }
    }
}

/// Connection callbacks for one connection generation
struct DeviceListener {
    generation: u64,
    device: Weak<DeviceInner>,
}

impl DeviceListener {
    fn device(&self) -> Option<Arc<DeviceInner>> {
        self.device
            .upgrade()
            .filter(|device| device.is_current(self.generation))
    }
}

impl ConnectionListener for DeviceListener {
    fn on_opened(&self) {
        if let Some(device) = self.device() {
            device.connection_opened();
        }
    }

    fn on_message(&self, text: &str) {
        if let Some(device) = self.device() {
            device.message_received(text);
        }
    }

    fn on_closed(&self, code: u16, reason: &str) {
        if let Some(device) = self.device() {
            info!(device = %device.id(), code, reason, "Connection closed");
            device.connection_lost(self.generation, closed_reason(code, reason));
        }
    }

    fn on_failed(&self, error: &StreamError) {
        if let Some(device) = self.device() {
            error!(device = %device.id(), %error, "Connection failed");
            device.connection_lost(self.generation, error.to_string());
        }
    }
}

fn closed_reason(code: u16, reason: &str) -> String {
    if reason.is_empty() {
        format!("Connection closed ({})", code)
    } else {
        format!("Connection closed ({}): {}", code, reason)
    }
}
