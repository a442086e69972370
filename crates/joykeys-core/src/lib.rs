//! # joykeys-core
//!
//! Shared library for joykeys containing the domain entities (hat directions,
//! canonical event identifiers, actions) and the key vocabulary tables.
//!
//! This crate is used by the helper daemon and its tests.
//! It has zero dependencies on OS APIs, input devices, or async runtimes.
//!
//! # Architecture overview (for beginners)
//!
//! joykeys turns joystick buttons, hat switches and keyboard keys into
//! sequences of synthesized key presses.  A user-editable mapping table says
//! "when `HAT_0_up` fires, press `v` once and then `x` twice".
//!
//! This crate (`joykeys-core`) is the shared foundation.  It defines:
//!
//! - **`domain`** – Pure rules with no OS dependencies: how an `(x, y)` hat
//!   reading becomes a direction, how a raw `(device, kind, code)` event
//!   becomes a stable string such as `BUTTON_27_DEV1`, and what an action
//!   (ordered key steps, delay, modifier, hooks) looks like.
//!
//! - **`keymap`** – The [`KeyRef`] vocabulary shared by keyboard triggers and
//!   the output side, plus the translation table to Linux input-event codes.

// Declare the two top-level modules.  Rust will look for each in a
// subdirectory with the same name (e.g., src/domain/mod.rs).
pub mod domain;
pub mod keymap;

// Re-export the most-used types at the crate root so callers can write
// `joykeys_core::Action` instead of `joykeys_core::domain::action::Action`.
pub use domain::action::{Action, ActionHook, ActionStep, ActionTable, HookError, DEFAULT_INTER_KEY_DELAY};
pub use domain::direction::HatDirection;
pub use domain::event_id::{CanonicalEventId, DeviceId, DeviceSuffix, EventNamer};
pub use keymap::{KeyParseError, KeyRef, NamedKey};
