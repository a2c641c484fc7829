//! Device model and change notifications

mod change;
mod device_model;
mod now_playing;

pub use change::{DeviceChange, DeviceEvent};
pub use device_model::{DeviceModel, Outcome};
pub use now_playing::NowPlaying;
