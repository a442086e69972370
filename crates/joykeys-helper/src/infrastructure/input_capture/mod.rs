//! Input capture infrastructure: joysticks, hats and keyboards.
//!
//! On Linux, every matching `/dev/input/event*` device is opened through
//! `evdev` and read on its own thread.  Raw kernel events are normalized into
//! [`RawInputEvent`]s and placed into an `mpsc` channel consumed by the
//! dispatcher's event loop.
//!
//! # Normalization
//!
//! - Buttons are numbered per device from 0, in the order the device lists
//!   them, independent of the kernel's `BTN_*` codes.
//! - Hats report both axes on every change, with `y = +1` meaning up.
//! - Keyboard keys are translated to [`KeyRef`]s.  Keys without a `KeyRef`
//!   and autorepeat events are dropped.
//!
//! # Testability
//!
//! The `InputSource` trait allows unit tests to inject synthetic events without
//! requiring real devices.

use std::path::PathBuf;
use std::sync::mpsc;

use joykeys_core::{DeviceId, KeyRef};

pub mod mock;

#[cfg(target_os = "linux")]
pub mod linux;

/// A raw input event produced by the input capture infrastructure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawInputEvent {
    /// A joystick button was pressed.
    ButtonDown { device: DeviceId, button: u16 },
    /// A joystick button was released.
    ButtonUp { device: DeviceId, button: u16 },
    /// A hat switch moved.  `x` and `y` are each -1, 0 or 1; `y = 1` is up.
    HatMotion {
        device: DeviceId,
        hat: u8,
        x: i32,
        y: i32,
    },
    /// A keyboard key was pressed.
    KeyDown { key: KeyRef },
    /// A keyboard key was released.
    KeyUp { key: KeyRef },
}

/// What kind of device the source opened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceKind {
    Joystick { buttons: u16, hats: u8 },
    Keyboard,
}

/// Description of one opened input device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceInfo {
    /// Index used in [`RawInputEvent`]s and in `_DEV<n>` identifiers.
    pub id: DeviceId,
    pub name: String,
    pub path: PathBuf,
    pub kind: DeviceKind,
}

impl DeviceInfo {
    /// Returns `true` for joysticks and gamepads.
    pub fn is_joystick(&self) -> bool {
        matches!(self.kind, DeviceKind::Joystick { .. })
    }
}

/// Counts the joysticks in `devices`.  This is the device count that decides
/// whether identifiers carry a `_DEV<n>` suffix.
pub fn joystick_count(devices: &[DeviceInfo]) -> usize {
    devices.iter().filter(|d| d.is_joystick()).count()
}

/// Error type for input capture operations.
#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    #[error("failed to open input device {path}: {source}")]
    OpenDevice {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to start reader thread: {0}")]
    SpawnReader(#[source] std::io::Error),
    #[error("input source has already been started")]
    AlreadyStarted,
    #[error("platform not supported: {0}")]
    UnsupportedPlatform(String),
}

/// Trait abstracting input event production.
///
/// The production implementation reads evdev devices; tests use [`mock::MockInputSource`].
pub trait InputSource: Send {
    /// Starts the input source and returns a receiver for captured events.
    fn start(&self) -> Result<mpsc::Receiver<RawInputEvent>, CaptureError>;
    /// Stops the input source and releases all OS resources.
    fn stop(&self);
    /// The devices this source reads from.
    fn devices(&self) -> Vec<DeviceInfo>;
}
