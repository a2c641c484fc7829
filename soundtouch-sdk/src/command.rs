//! Free-text control commands
//!
//! Keywords are case-insensitive; device arguments keep their case.
//!
//! ```rust
//! use soundtouch_sdk::ControlCommand;
//!
//! assert_eq!(ControlCommand::parse("PRESET 3").unwrap(), ControlCommand::Preset(3));
//! assert_eq!(
//!     ControlCommand::parse("zone add Living Room").unwrap(),
//!     ControlCommand::ZoneAdd("Living Room".to_string())
//! );
//! ```

use std::fmt;
use std::str::FromStr;

use soundtouch_api::request::MAX_VOLUME;
use soundtouch_api::Preset;
use soundtouch_state::SoundTouchDevice;

use crate::error::{Result, SdkError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlCommand {
    Play,
    Pause,
    PlayPause,
    Next,
    Previous,
    Preset(u8),
    Volume(u8),
    Mute(bool),
    Power(bool),
    ZoneAdd(String),
    ZoneRemove(String),
}

impl ControlCommand {
    pub fn parse(input: &str) -> Result<Self> {
        let input = input.trim();
        let invalid = || SdkError::InvalidCommand(input.to_string());

        let (keyword, rest) = match input.split_once(char::is_whitespace) {
            Some((keyword, rest)) => (keyword, rest.trim()),
            None => (input, ""),
        };
        let keyword = keyword.to_ascii_lowercase();

        let command = match (keyword.as_str(), rest) {
            ("play", "") => ControlCommand::Play,
            ("pause", "") => ControlCommand::Pause,
            ("play_pause" | "playpause", "") => ControlCommand::PlayPause,
            ("next", "") => ControlCommand::Next,
            ("previous" | "prev", "") => ControlCommand::Previous,
            ("preset", slot) => ControlCommand::Preset(parse_slot(slot).ok_or_else(invalid)?),
            ("volume", level) => {
                let level: u8 = level.parse().map_err(|_| invalid())?;
                if level > MAX_VOLUME {
                    return Err(invalid());
                }
                ControlCommand::Volume(level)
            }
            ("mute", state) => ControlCommand::Mute(parse_switch(state).ok_or_else(invalid)?),
            ("power", state) => ControlCommand::Power(parse_switch(state).ok_or_else(invalid)?),
            ("zone", args) => {
                let (action, target) = args.split_once(char::is_whitespace).ok_or_else(invalid)?;
                let target = target.trim();
                match action.to_ascii_lowercase().as_str() {
                    "add" => ControlCommand::ZoneAdd(target.to_string()),
                    "remove" => ControlCommand::ZoneRemove(target.to_string()),
                    _ => return Err(invalid()),
                }
            }
            (keyword, "") if keyword.starts_with("preset") => {
                ControlCommand::Preset(parse_slot(&keyword["preset".len()..]).ok_or_else(invalid)?)
            }
            _ => return Err(invalid()),
        };
        Ok(command)
    }

    /// Run the command against a device
    pub fn execute(&self, device: &SoundTouchDevice) -> Result<()> {
        match self {
            ControlCommand::Play => device.play()?,
            ControlCommand::Pause => device.pause()?,
            ControlCommand::PlayPause => device.play_pause()?,
            ControlCommand::Next => device.next()?,
            ControlCommand::Previous => device.previous()?,
            ControlCommand::Preset(slot) => device.select_preset(*slot)?,
            ControlCommand::Volume(level) => device.set_volume(*level)?,
            ControlCommand::Mute(muted) => device.set_mute(*muted)?,
            ControlCommand::Power(on) => device.set_power(*on)?,
            ControlCommand::ZoneAdd(target) => device.zone_add(target)?,
            ControlCommand::ZoneRemove(target) => device.zone_remove(target)?,
        }
        Ok(())
    }
}

impl FromStr for ControlCommand {
    type Err = SdkError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for ControlCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ControlCommand::Play => write!(f, "play"),
            ControlCommand::Pause => write!(f, "pause"),
            ControlCommand::PlayPause => write!(f, "play_pause"),
            ControlCommand::Next => write!(f, "next"),
            ControlCommand::Previous => write!(f, "previous"),
            ControlCommand::Preset(slot) => write!(f, "preset {}", slot),
            ControlCommand::Volume(level) => write!(f, "volume {}", level),
            ControlCommand::Mute(muted) => write!(f, "mute {}", on_off(*muted)),
            ControlCommand::Power(on) => write!(f, "power {}", on_off(*on)),
            ControlCommand::ZoneAdd(target) => write!(f, "zone add {}", target),
            ControlCommand::ZoneRemove(target) => write!(f, "zone remove {}", target),
        }
    }
}

fn parse_slot(slot: &str) -> Option<u8> {
    let slot: u8 = slot.trim().parse().ok()?;
    let valid = (Preset::MIN_POSITION..=Preset::MAX_POSITION).contains(&i32::from(slot));
    valid.then_some(slot)
}

fn parse_switch(state: &str) -> Option<bool> {
    match state.to_ascii_lowercase().as_str() {
        "on" => Some(true),
        "off" => Some(false),
        _ => None,
    }
}

fn on_off(value: bool) -> &'static str {
    if value {
        "on"
    } else {
        "off"
    }
}
