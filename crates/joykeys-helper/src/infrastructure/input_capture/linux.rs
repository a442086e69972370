//! Linux input capture via evdev.
//!
//! # What is evdev? (for beginners)
//!
//! The Linux kernel exposes every input device as a character device under
//! `/dev/input/event*`.  Reading one yields a stream of small records, each
//! carrying a *type* (`EV_KEY`, `EV_ABS`, ...), a *code* (which key or axis)
//! and a *value* (1 = pressed, 0 = released, or an axis position).
//!
//! Joystick buttons arrive as `EV_KEY` events with `BTN_*` codes.  A hat
//! switch arrives as two `EV_ABS` axes (`ABS_HAT0X`, `ABS_HAT0Y`), each moving
//! between -1, 0 and 1.  Note that the kernel's `ABS_HAT0Y = -1` means *up*,
//! the opposite of the convention used by [`HatDirection::from_axes`], so the
//! y value is negated here.
//!
//! # Threads
//!
//! `Device::fetch_events` blocks until the device produces something, so each
//! device gets its own reader thread.  A reader exits when its device fails,
//! when the event channel is closed, or on the first event after `stop()`.
//!
//! # Permissions
//!
//! Reading `/dev/input/event*` normally requires membership of the `input`
//! group.  Devices that cannot be opened are silently absent from
//! `evdev::enumerate()`.
//!
//! [`HatDirection::from_axes`]: joykeys_core::HatDirection::from_axes

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Sender};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;

use evdev::{Device, InputEventKind};
use joykeys_core::keymap::linux_evdev;
use joykeys_core::DeviceId;
use tracing::{debug, info, trace, warn};

use super::{CaptureError, DeviceInfo, DeviceKind, InputSource, RawInputEvent};

// ── Kernel constants ──────────────────────────────────────────────────────────

const BTN_MISC: u16 = 0x100;
const BTN_MISC_END: u16 = 0x10f;
const BTN_JOYSTICK: u16 = 0x120;
/// End of the joystick and gamepad button block (`BTN_THUMBR` is 0x13e).
const BTN_GAMEPAD_END: u16 = 0x13f;
const BTN_TRIGGER_HAPPY: u16 = 0x2c0;
const BTN_TRIGGER_HAPPY_END: u16 = 0x2e8;

const ABS_HAT0X: u16 = 0x10;
const ABS_HAT3Y: u16 = 0x17;

const KEY_ENTER: u16 = 28;
const KEY_A: u16 = 30;

const VALUE_RELEASE: i32 = 0;
const VALUE_PRESS: i32 = 1;

/// Number of hats a device can report (`ABS_HAT0X` through `ABS_HAT3Y`).
const MAX_HATS: usize = 4;

// ── Normalization ─────────────────────────────────────────────────────────────

/// Ordering group of a button code; joystick and gamepad buttons come first.
fn button_group(code: u16) -> Option<u8> {
    match code {
        BTN_JOYSTICK..=BTN_GAMEPAD_END => Some(0),
        BTN_TRIGGER_HAPPY..=BTN_TRIGGER_HAPPY_END => Some(1),
        BTN_MISC..=BTN_MISC_END => Some(2),
        _ => None,
    }
}

/// Maps kernel `BTN_*` codes to zero-based button indices for one device.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ButtonLayout {
    indices: HashMap<u16, u16>,
}

impl ButtonLayout {
    /// Builds a layout from the codes a device supports.  Codes outside the
    /// button ranges are ignored.
    pub fn from_codes(codes: impl IntoIterator<Item = u16>) -> Self {
        let mut buttons: Vec<(u8, u16)> = codes
            .into_iter()
            .filter_map(|code| button_group(code).map(|group| (group, code)))
            .collect();
        buttons.sort_unstable();
        buttons.dedup();
        let indices = buttons
            .into_iter()
            .enumerate()
            .map(|(index, (_, code))| (code, index as u16))
            .collect();
        Self { indices }
    }

    /// Index of the button with kernel code `code`.
    pub fn index(&self, code: u16) -> Option<u16> {
        self.indices.get(&code).copied()
    }

    /// Number of buttons.
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    /// Returns `true` if the device has no buttons.
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

/// Number of hats among the absolute axis codes a device supports.
fn hat_count(axes: impl IntoIterator<Item = u16>) -> u8 {
    axes.into_iter()
        .filter(|code| (ABS_HAT0X..=ABS_HAT3Y).contains(code))
        .map(|code| (code - ABS_HAT0X) / 2 + 1)
        .max()
        .unwrap_or(0) as u8
}

/// Turns one device's kernel events into [`RawInputEvent`]s.
#[derive(Debug, Clone)]
pub struct EventNormalizer {
    device: DeviceId,
    keyboard: bool,
    buttons: ButtonLayout,
    hats: [(i32, i32); MAX_HATS],
}

impl EventNormalizer {
    /// Normalizer for joystick `device` with the given button layout.
    pub fn joystick(device: DeviceId, buttons: ButtonLayout) -> Self {
        Self {
            device,
            keyboard: false,
            buttons,
            hats: [(0, 0); MAX_HATS],
        }
    }

    /// Normalizer for a keyboard.
    pub fn keyboard(device: DeviceId) -> Self {
        Self {
            device,
            keyboard: true,
            buttons: ButtonLayout::default(),
            hats: [(0, 0); MAX_HATS],
        }
    }

    /// Handles an `EV_KEY` event.  Autorepeat (value 2) yields nothing.
    pub fn on_key(&mut self, code: u16, value: i32) -> Option<RawInputEvent> {
        if value != VALUE_PRESS && value != VALUE_RELEASE {
            return None;
        }
        let down = value == VALUE_PRESS;
        if self.keyboard {
            let Some(key) = linux_evdev::code_to_key(code) else {
                trace!(code, "unrecognized key code");
                return None;
            };
            return Some(if down {
                RawInputEvent::KeyDown { key }
            } else {
                RawInputEvent::KeyUp { key }
            });
        }
        let button = self.buttons.index(code)?;
        let device = self.device;
        Some(if down {
            RawInputEvent::ButtonDown { device, button }
        } else {
            RawInputEvent::ButtonUp { device, button }
        })
    }

    /// Handles an `EV_ABS` event.  Only hat axes produce events.
    pub fn on_abs(&mut self, code: u16, value: i32) -> Option<RawInputEvent> {
        if self.keyboard || !(ABS_HAT0X..=ABS_HAT3Y).contains(&code) {
            return None;
        }
        let hat = usize::from((code - ABS_HAT0X) / 2);
        let axes = &mut self.hats[hat];
        if (code - ABS_HAT0X) % 2 == 0 {
            axes.0 = value.signum();
        } else {
            axes.1 = -value.signum();
        }
        Some(RawInputEvent::HatMotion {
            device: self.device,
            hat: hat as u8,
            x: axes.0,
            y: axes.1,
        })
    }
}

// ── Evdev source ──────────────────────────────────────────────────────────────

struct PendingDevice {
    info: DeviceInfo,
    device: Device,
    normalizer: EventNormalizer,
}

/// Reads joysticks (and optionally keyboards) from `/dev/input`.
///
/// The source keeps one sender of its own until `stop()`, so the channel
/// stays open even when no device is attached or every reader has exited.
pub struct EvdevInputSource {
    infos: Vec<DeviceInfo>,
    pending: Mutex<Vec<PendingDevice>>,
    sender: Mutex<Option<Sender<RawInputEvent>>>,
    started: AtomicBool,
    stop: Arc<AtomicBool>,
}

impl EvdevInputSource {
    /// Enumerates input devices.
    ///
    /// Devices named `exclude_name` (the helper's own virtual keyboard) are
    /// skipped so that synthesized keys never loop back as triggers.
    pub fn open(include_keyboards: bool, exclude_name: &str) -> Self {
        let mut found: Vec<(PathBuf, Device)> = evdev::enumerate()
            .filter(|(_, device)| device.name() != Some(exclude_name))
            .collect();
        found.sort_by(|a, b| a.0.cmp(&b.0));

        let mut joysticks = Vec::new();
        let mut keyboards = Vec::new();
        for (path, device) in found {
            let keys: Vec<u16> = device
                .supported_keys()
                .map(|keys| keys.iter().map(|k| k.code()).collect())
                .unwrap_or_default();
            let hats = hat_count(
                device
                    .supported_absolute_axes()
                    .into_iter()
                    .flat_map(|axes| axes.iter().map(|a| a.0)),
            );
            let buttons = ButtonLayout::from_codes(keys.iter().copied());
            let has_joystick_buttons = keys.iter().any(|&code| button_group(code) == Some(0));
            if has_joystick_buttons || hats > 0 {
                joysticks.push((path, device, buttons, hats));
            } else if include_keyboards && keys.contains(&KEY_A) && keys.contains(&KEY_ENTER) {
                keyboards.push((path, device));
            }
        }

        let mut pending = Vec::new();
        for (index, (path, device, buttons, hats)) in joysticks.into_iter().enumerate() {
            let id = index as DeviceId;
            let info = DeviceInfo {
                id,
                name: device.name().unwrap_or("unnamed joystick").to_string(),
                path,
                kind: DeviceKind::Joystick {
                    buttons: buttons.len() as u16,
                    hats,
                },
            };
            let normalizer = EventNormalizer::joystick(id, buttons);
            pending.push(PendingDevice { info, device, normalizer });
        }
        let first_keyboard = pending.len();
        for (index, (path, device)) in keyboards.into_iter().enumerate() {
            let id = (first_keyboard + index) as DeviceId;
            let info = DeviceInfo {
                id,
                name: device.name().unwrap_or("unnamed keyboard").to_string(),
                path,
                kind: DeviceKind::Keyboard,
            };
            let normalizer = EventNormalizer::keyboard(id);
            pending.push(PendingDevice { info, device, normalizer });
        }

        let infos: Vec<DeviceInfo> = pending.iter().map(|p| p.info.clone()).collect();
        for info in &infos {
            info!(id = info.id, name = %info.name, path = %info.path.display(), kind = ?info.kind, "input device");
        }
        if !infos.iter().any(DeviceInfo::is_joystick) {
            warn!("no joystick found; check that the device is connected and readable");
        }

        Self {
            infos,
            pending: Mutex::new(pending),
            sender: Mutex::new(None),
            started: AtomicBool::new(false),
            stop: Arc::new(AtomicBool::new(false)),
        }
    }
}

impl InputSource for EvdevInputSource {
    fn start(&self) -> Result<mpsc::Receiver<RawInputEvent>, CaptureError> {
        if self.started.swap(true, Ordering::SeqCst) {
            return Err(CaptureError::AlreadyStarted);
        }
        let devices = std::mem::take(&mut *self.pending.lock().unwrap_or_else(PoisonError::into_inner));

        let (tx, rx) = mpsc::channel();
        for pending in devices {
            let tx = tx.clone();
            let stop = Arc::clone(&self.stop);
            thread::Builder::new()
                .name(format!("joykeys-input-{}", pending.info.id))
                .spawn(move || read_device(pending, tx, stop))
                .map_err(CaptureError::SpawnReader)?;
        }
        *self.sender.lock().unwrap_or_else(PoisonError::into_inner) = Some(tx);
        Ok(rx)
    }

    fn stop(&self) {
        self.stop.store(true, Ordering::SeqCst);
        self.sender.lock().unwrap_or_else(PoisonError::into_inner).take();
    }

    fn devices(&self) -> Vec<DeviceInfo> {
        self.infos.clone()
    }
}

fn read_device(pending: PendingDevice, tx: Sender<RawInputEvent>, stop: Arc<AtomicBool>) {
    let PendingDevice {
        info,
        mut device,
        mut normalizer,
    } = pending;
    debug!(id = info.id, name = %info.name, "reader started");
    while !stop.load(Ordering::SeqCst) {
        let events = match device.fetch_events() {
            Ok(events) => events,
            Err(e) => {
                warn!(name = %info.name, "input device read failed, dropping device: {e}");
                return;
            }
        };
        for event in events {
            let raw = match event.kind() {
                InputEventKind::Key(key) => normalizer.on_key(key.code(), event.value()),
                InputEventKind::AbsAxis(axis) => normalizer.on_abs(axis.0, event.value()),
                _ => None,
            };
            if let Some(raw) = raw {
                if tx.send(raw).is_err() {
                    return;
                }
            }
        }
    }
    debug!(id = info.id, "reader stopped");
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use joykeys_core::{KeyRef, NamedKey};

    const BTN_TRIGGER: u16 = 0x120;
    const BTN_THUMB: u16 = 0x121;
    const BTN_SOUTH: u16 = 0x130;
    const BTN_0: u16 = 0x100;

    #[test]
    fn test_button_layout_orders_joystick_range_before_misc() {
        // Arrange / Act
        let layout = ButtonLayout::from_codes([BTN_0, BTN_SOUTH, BTN_TRIGGER, KEY_A]);

        // Assert
        assert_eq!(layout.len(), 3);
        assert_eq!(layout.index(BTN_TRIGGER), Some(0));
        assert_eq!(layout.index(BTN_SOUTH), Some(1));
        assert_eq!(layout.index(BTN_0), Some(2));
        assert_eq!(layout.index(KEY_A), None);
    }

    #[test]
    fn test_hat_count_from_axes() {
        assert_eq!(hat_count([0x00, 0x01]), 0);
        assert_eq!(hat_count([0x00, ABS_HAT0X, ABS_HAT0X + 1]), 1);
        assert_eq!(hat_count([ABS_HAT0X + 2, ABS_HAT0X + 3]), 2);
    }

    #[test]
    fn test_joystick_button_press_and_release() {
        // Arrange
        let mut normalizer =
            EventNormalizer::joystick(1, ButtonLayout::from_codes([BTN_TRIGGER, BTN_THUMB]));

        // Act
        let down = normalizer.on_key(BTN_THUMB, 1);
        let repeat = normalizer.on_key(BTN_THUMB, 2);
        let up = normalizer.on_key(BTN_THUMB, 0);

        // Assert
        assert_eq!(down, Some(RawInputEvent::ButtonDown { device: 1, button: 1 }));
        assert_eq!(repeat, None);
        assert_eq!(up, Some(RawInputEvent::ButtonUp { device: 1, button: 1 }));
    }

    #[test]
    fn test_hat_y_axis_is_negated_and_axes_accumulate() {
        // Arrange
        let mut normalizer = EventNormalizer::joystick(0, ButtonLayout::default());

        // Act: kernel reports up as y = -1, then right
        let up = normalizer.on_abs(ABS_HAT0X + 1, -1);
        let up_right = normalizer.on_abs(ABS_HAT0X, 1);

        // Assert
        assert_eq!(up, Some(RawInputEvent::HatMotion { device: 0, hat: 0, x: 0, y: 1 }));
        assert_eq!(
            up_right,
            Some(RawInputEvent::HatMotion { device: 0, hat: 0, x: 1, y: 1 })
        );
    }

    #[test]
    fn test_second_hat_uses_its_own_index() {
        let mut normalizer = EventNormalizer::joystick(0, ButtonLayout::default());
        let event = normalizer.on_abs(ABS_HAT0X + 2, -1);
        assert_eq!(event, Some(RawInputEvent::HatMotion { device: 0, hat: 1, x: -1, y: 0 }));
    }

    #[test]
    fn test_non_hat_axis_is_ignored() {
        let mut normalizer = EventNormalizer::joystick(0, ButtonLayout::default());
        assert_eq!(normalizer.on_abs(0x00, 12000), None);
    }

    #[test]
    fn test_keyboard_keys_translate_to_key_refs() {
        let mut normalizer = EventNormalizer::keyboard(3);
        assert_eq!(
            normalizer.on_key(KEY_A, 1),
            Some(RawInputEvent::KeyDown { key: KeyRef::Char('a') })
        );
        assert_eq!(
            normalizer.on_key(57, 0),
            Some(RawInputEvent::KeyUp { key: KeyRef::Named(NamedKey::Space) })
        );
        assert_eq!(normalizer.on_key(KEY_A, 2), None, "autorepeat is ignored");
    }
}
