//! Output sink implementations: where synthesized key presses go.
//!
//! The correct implementation is selected at startup:
//!
//! - **`linux`**   – a uinput virtual keyboard (Linux only).
//! - **`logging`** – logs each press and release; used for `--dry-run` and on
//!   platforms without a native sink.
//! - **`mock`**    – records calls for tests.

pub mod logging;
pub mod mock;

#[cfg(target_os = "linux")]
pub mod linux;

/// Name of the virtual keyboard device.  The input source skips devices with
/// this name so synthesized keys are never read back as triggers.
pub const VIRTUAL_KEYBOARD_NAME: &str = "joykeys virtual keyboard";
