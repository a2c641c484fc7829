//! Control SoundTouch devices from the command line
//!
//! Loads the device list from the default configuration path
//! (`$SOUNDTOUCH_CONFIG_DIR/devices.json` or the platform config directory),
//! waits for the devices to come online, then runs one command.
//!
//! Run with: cargo run -p soundtouch-sdk --example control -- Kitchen "preset 2"

use std::time::{Duration, Instant};

use soundtouch_sdk::{Connectivity, SdkError, SoundTouchSystem, SystemConfig};

fn main() -> Result<(), SdkError> {
    if let Err(e) = soundtouch_sdk::init_logging_from_env() {
        eprintln!("Logging disabled: {}", e);
    }

    let mut args = std::env::args().skip(1);
    let device = args.next();
    let command = args.collect::<Vec<_>>().join(" ");

    let config = SystemConfig::load_default()?;
    if config.devices.is_empty() {
        println!(
            "No devices configured in {}",
            soundtouch_sdk::config::default_path()?.display()
        );
        return Ok(());
    }

    let system = SoundTouchSystem::from_config(config)?;
    wait_until_online(&system, Duration::from_secs(5));

    match device {
        Some(device) if !command.is_empty() => {
            system.execute_text(&device, &command)?;
            println!("Sent '{}' to {}", command, device);
            // Give the device a moment to report the change
            std::thread::sleep(Duration::from_millis(500));
        }
        _ => println!("Usage: control <device> <command>"),
    }

    println!();
    for device in system.devices() {
        println!(
            "{:<16} {:<10} {:<15} vol {:>3}{} {}",
            device.display_name(),
            format!("{:?}", device.connectivity()),
            device.operation_mode(),
            device.volume(),
            if device.is_muted() { " (muted)" } else { "" },
            device.zone_summary()
        );
    }
    Ok(())
}

fn wait_until_online(system: &SoundTouchSystem, timeout: Duration) {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        let pending = system
            .devices()
            .iter()
            .filter(|device| device.connectivity() == Connectivity::Connecting)
            .count();
        if pending == 0 {
            return;
        }
        std::thread::sleep(Duration::from_millis(100));
    }
}
