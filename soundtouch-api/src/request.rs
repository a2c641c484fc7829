//! Outbound request frames
//!
//! Every command sent to a device is a single text frame wrapping an XML
//! `<msg>` envelope. `GET` frames ask the device to report a resource over
//! the push connection; `POST` frames carry a body that changes device state.
//! Responses are never correlated with the request id: the device reports
//! the new state as an ordinary update.

use quick_xml::escape::escape;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};

use crate::error::{ApiError, Result};
use crate::model::{DeviceId, RemoteKey, ZoneMember};

/// Sender name the device expects on key frames
const KEY_SENDER: &str = "Gabbo";

/// Highest volume the device accepts
pub const MAX_VOLUME: u8 = 100;

/// An encoded outbound text frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    request_id: u32,
    text: String,
}

impl Frame {
    /// Request id stamped on this frame
    pub fn request_id(&self) -> u32 {
        self.request_id
    }

    /// Frame text as sent on the wire
    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn into_text(self) -> String {
        self.text
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Resources that can be requested with a `GET` frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Query {
    Info,
    Volume,
    Presets,
    NowPlaying,
    Zone,
}

impl Query {
    /// Url attribute for this query
    pub fn url(&self) -> &'static str {
        match self {
            Query::Info => "info",
            Query::Volume => "volume",
            Query::Presets => "presets",
            Query::NowPlaying => "now_playing",
            Query::Zone => "getZone",
        }
    }
}

/// Whether a key frame presses or releases the key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyState {
    Press,
    Release,
}

impl KeyState {
    fn main_node(&self) -> &'static str {
        match self {
            KeyState::Press => "keyPress",
            KeyState::Release => "keyRelease",
        }
    }

    fn state(&self) -> &'static str {
        match self {
            KeyState::Press => "press",
            KeyState::Release => "release",
        }
    }
}

/// Builds request frames for one device connection
///
/// Request ids come from a counter owned by the encoder. They strictly
/// increase until [`RequestEncoder::reset`] is called, which happens each
/// time a new connection opens.
#[derive(Debug)]
pub struct RequestEncoder {
    device_id: DeviceId,
    next_request_id: AtomicU32,
}

impl RequestEncoder {
    pub fn new(device_id: DeviceId) -> Self {
        Self {
            device_id,
            next_request_id: AtomicU32::new(0),
        }
    }

    pub fn device_id(&self) -> &DeviceId {
        &self.device_id
    }

    /// Restart request ids at zero
    pub fn reset(&self) {
        self.next_request_id.store(0, Ordering::SeqCst);
    }

    fn next_id(&self) -> u32 {
        self.next_request_id.fetch_add(1, Ordering::SeqCst)
    }

    /// Encode a `GET` frame for an arbitrary url
    pub fn get(&self, url: &str) -> Frame {
        let request_id = self.next_id();
        let text = format!(
            r#"<msg><header deviceID="{}" url="{}" method="GET"><request requestID="{}"><info type="new"/></request></header></msg>"#,
            escape(self.device_id.as_str()),
            escape(url),
            request_id
        );
        Frame { request_id, text }
    }

    /// Encode a `POST` frame; `body` must already be well-formed XML
    pub fn set(&self, url: &str, main_node: Option<&str>, body: &str) -> Frame {
        let request_id = self.next_id();
        let main_node = match main_node {
            Some(node) => format!(r#"mainNode="{}" "#, escape(node)),
            None => String::new(),
        };
        let text = format!(
            r#"<msg><header deviceID="{}" url="{}" method="POST"><request requestID="{}"><info {}type="new"/></request></header><body>{}</body></msg>"#,
            escape(self.device_id.as_str()),
            escape(url),
            request_id,
            main_node,
            body
        );
        Frame { request_id, text }
    }

    pub fn query(&self, query: Query) -> Frame {
        self.get(query.url())
    }

    /// Encode a volume change; values above 100 are rejected
    pub fn volume(&self, level: u8) -> Result<Frame> {
        if level > MAX_VOLUME {
            return Err(ApiError::out_of_range("volume", level, 0, MAX_VOLUME as i64));
        }
        let body = format!(
            r#"<volume deviceID="{}">{}</volume>"#,
            escape(self.device_id.as_str()),
            level
        );
        Ok(self.set("volume", None, &body))
    }

    pub fn key(&self, key: RemoteKey, state: KeyState) -> Frame {
        let body = format!(
            r#"<key state="{}" sender="{}">{}</key>"#,
            state.state(),
            KEY_SENDER,
            key.as_str()
        );
        self.set("key", Some(state.main_node()), &body)
    }

    /// Encode a zone topology with `master` at its head
    ///
    /// Members whose mac is not known yet are left out.
    pub fn zone(&self, master: &DeviceId, members: &[ZoneMember]) -> Frame {
        let mut body = format!(r#"<zone master="{}">"#, escape(master.as_str()));
        for member in members {
            if let Some(mac) = member.mac() {
                body.push_str(&format!(
                    r#"<member ipaddress="{}">{}</member>"#,
                    escape(member.ip_address()),
                    escape(mac.as_str())
                ));
            }
        }
        body.push_str("</zone>");
        self.set("setZone", Some("newZone"), &body)
    }
}
