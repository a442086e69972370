//! Linux key output via a uinput virtual keyboard.
//!
//! # What is uinput? (for beginners)
//!
//! `/dev/uinput` lets a process create a virtual input device.  Events written
//! to it are delivered to the rest of the system exactly like events from a
//! physical keyboard, under X11 and Wayland alike; the receiving application
//! cannot distinguish them from real key presses.
//!
//! The device has to declare up front which keys it can produce, so the
//! constructor registers every code the [`KeyRef`] vocabulary maps to.
//!
//! # Shifted characters
//!
//! `X` and `?` are not keys; they are `KEY_X` / `KEY_SLASH` with Shift held.
//! For such characters `press` emits Shift-down then the key, and `release`
//! emits the key-up then Shift-up.
//!
//! # Concurrency
//!
//! Several executors may call the sink at once.  The device sits behind a
//! `Mutex`, so individual emits are serialized; a press or release never
//! blocks the event loop, only other sink calls for the length of one write.
//!
//! # Permissions
//!
//! Creating the device needs write access to `/dev/uinput` (typically the
//! `input` group or a udev rule).

use std::sync::{Mutex, PoisonError};

use evdev::uinput::{VirtualDevice, VirtualDeviceBuilder};
use evdev::{AttributeSet, EventType, InputEvent, Key};
use joykeys_core::keymap::linux_evdev::{self, KEY_LEFTSHIFT};
use joykeys_core::KeyRef;
use tracing::info;

use super::VIRTUAL_KEYBOARD_NAME;
use crate::application::execute_sequence::{EmulationError, KeyOutput};

/// Highest key code registered on the virtual device (`KEY_F24`).
const MAX_REGISTERED_CODE: u16 = 194;

const VALUE_RELEASE: i32 = 0;
const VALUE_PRESS: i32 = 1;

/// Linux uinput key output.
pub struct UinputKeyOutput {
    device: Mutex<VirtualDevice>,
}

impl UinputKeyOutput {
    /// Creates the virtual keyboard.
    ///
    /// # Errors
    ///
    /// Returns `EmulationError::Platform` if `/dev/uinput` cannot be opened
    /// or the device cannot be created.
    pub fn new() -> Result<Self, EmulationError> {
        let mut keys = AttributeSet::<Key>::new();
        for code in 1..=MAX_REGISTERED_CODE {
            keys.insert(Key::new(code));
        }

        let device = VirtualDeviceBuilder::new()
            .map_err(platform)?
            .name(VIRTUAL_KEYBOARD_NAME)
            .with_keys(&keys)
            .map_err(platform)?
            .build()
            .map_err(platform)?;
        info!(name = VIRTUAL_KEYBOARD_NAME, "virtual keyboard created");

        Ok(Self {
            device: Mutex::new(device),
        })
    }

    fn emit(&self, events: &[InputEvent]) -> Result<(), EmulationError> {
        self.device
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .emit(events)
            .map_err(platform)
    }
}

impl KeyOutput for UinputKeyOutput {
    fn press(&self, key: &KeyRef) -> Result<(), EmulationError> {
        let (code, needs_shift) = linux_evdev::key_to_code(key).ok_or(EmulationError::UnmappedKey(*key))?;
        if needs_shift {
            self.emit(&[key_event(KEY_LEFTSHIFT, VALUE_PRESS), key_event(code, VALUE_PRESS)])
        } else {
            self.emit(&[key_event(code, VALUE_PRESS)])
        }
    }

    fn release(&self, key: &KeyRef) -> Result<(), EmulationError> {
        let (code, needs_shift) = linux_evdev::key_to_code(key).ok_or(EmulationError::UnmappedKey(*key))?;
        if needs_shift {
            self.emit(&[key_event(code, VALUE_RELEASE), key_event(KEY_LEFTSHIFT, VALUE_RELEASE)])
        } else {
            self.emit(&[key_event(code, VALUE_RELEASE)])
        }
    }
}

fn key_event(code: u16, value: i32) -> InputEvent {
    InputEvent::new(EventType::KEY, code, value)
}

fn platform(e: std::io::Error) -> EmulationError {
    EmulationError::Platform(format!("uinput: {e}"))
}
