//! Event monitor modes (`--joystick-events`, `--keyboard-events`).
//!
//! These modes help write a mapping file: they print every input event with
//! the identifier a mapping would use for it, and run no actions.
//!
//! ```text
//! $ joykeys --joystick-events
//! device 0: Thrustmaster T.16000M (16 buttons, 1 hat)
//! BUTTON_3 pressed
//! HAT_0 -> up        (map as HAT_0_up)
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::TryRecvError;
use std::sync::Arc;
use std::time::Duration;

use joykeys_core::{EventNamer, HatDirection};
use tracing::info;

use super::input_capture::{joystick_count, CaptureError, DeviceKind, InputSource, RawInputEvent};

const MONITOR_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Which events to print.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorMode {
    Joystick,
    Keyboard,
}

/// Formats one event for `mode`.  Returns `None` for events the mode ignores.
pub fn describe_event(event: &RawInputEvent, namer: &EventNamer, mode: MonitorMode) -> Option<String> {
    match (mode, event) {
        (MonitorMode::Joystick, RawInputEvent::ButtonDown { device, button }) => {
            Some(format!("{} pressed", namer.button(*device, *button)))
        }
        (MonitorMode::Joystick, RawInputEvent::ButtonUp { device, button }) => {
            Some(format!("{} released", namer.button(*device, *button)))
        }
        (MonitorMode::Joystick, RawInputEvent::HatMotion { device, hat, x, y }) => {
            let direction = HatDirection::from_axes(*x, *y);
            Some(format!(
                "{} -> {:<10} (map as {})",
                namer.hat(*device, *hat),
                direction.as_str(),
                namer.hat_event(*device, *hat, direction)
            ))
        }
        (MonitorMode::Keyboard, RawInputEvent::KeyDown { key }) => {
            Some(format!("key pressed: {}", namer.key(key)))
        }
        _ => None,
    }
}

/// Lists the devices relevant to `mode`.
pub fn describe_devices(source: &dyn InputSource, mode: MonitorMode) -> Vec<String> {
    source
        .devices()
        .into_iter()
        .filter_map(|device| match (&device.kind, mode) {
            (DeviceKind::Joystick { buttons, hats }, MonitorMode::Joystick) => Some(format!(
                "device {}: {} ({buttons} buttons, {hats} hat{})",
                device.id,
                device.name,
                if *hats == 1 { "" } else { "s" }
            )),
            (DeviceKind::Keyboard, MonitorMode::Keyboard) => {
                Some(format!("keyboard: {} ({})", device.name, device.path.display()))
            }
            _ => None,
        })
        .collect()
}

/// Prints events from `source` until `running` is cleared or the source closes.
pub async fn run_monitor(
    source: &dyn InputSource,
    namer: EventNamer,
    mode: MonitorMode,
    running: Arc<AtomicBool>,
) -> Result<(), CaptureError> {
    let lines = describe_devices(source, mode);
    if lines.is_empty() {
        println!("no matching input devices found");
    }
    for line in lines {
        println!("{line}");
    }
    let namer = namer.with_device_count(joystick_count(&source.devices()));

    let events = source.start()?;
    info!(?mode, "monitoring input events, press Ctrl-C to exit");
    while running.load(Ordering::SeqCst) {
        match events.try_recv() {
            Ok(event) => {
                if let Some(line) = describe_event(&event, &namer, mode) {
                    println!("{line}");
                }
            }
            Err(TryRecvError::Empty) => tokio::time::sleep(MONITOR_POLL_INTERVAL).await,
            Err(TryRecvError::Disconnected) => break,
        }
    }
    source.stop();
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
