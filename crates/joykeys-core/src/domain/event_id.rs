//! Canonical event identifiers.
//!
//! Every physical control that can trigger an action is named by a stable
//! string.  Those strings are the keys of the user's mapping file, so their
//! format must never change between runs or releases:
//!
//! | Event           | Identifier                               |
//! |-----------------|------------------------------------------|
//! | Button press    | `BUTTON_<index>[_DEV<device>]`           |
//! | Hat transition  | `HAT_<index>[_DEV<device>]_<direction>`  |
//! | Named key       | `KEY_<NAME>` (e.g. `KEY_SPACE`)          |
//! | Printable key   | the character itself (e.g. `v`)          |
//!
//! # The device suffix
//!
//! Two joysticks both have a "button 27".  With a single device attached the
//! suffix is left off so that simple mapping files stay simple; as soon as a
//! second device appears (or the policy says [`DeviceSuffix::Always`]) the
//! `_DEV<n>` suffix disambiguates them.

use std::borrow::Borrow;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::direction::HatDirection;
use crate::keymap::KeyRef;

/// Index of an attached input device, assigned by the event source.
pub type DeviceId = u32;

/// A stable string naming one logical input event.
///
/// Identifiers read from a mapping file are taken verbatim; identifiers built
/// from live events come from an [`EventNamer`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CanonicalEventId(String);

impl CanonicalEventId {
    /// Wraps an identifier string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CanonicalEventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for CanonicalEventId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for CanonicalEventId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for CanonicalEventId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// When to append the `_DEV<n>` suffix to button and hat identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceSuffix {
    /// Suffix only when more than one device is attached.
    #[default]
    Auto,
    /// Always suffix, even with a single device.
    Always,
    /// Never suffix; identical indices on different devices share an id.
    Never,
}

/// Turns raw `(device, kind, code)` events into [`CanonicalEventId`]s.
///
/// Deterministic and total: the same inputs always produce the same string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventNamer {
    policy: DeviceSuffix,
    device_count: usize,
}

impl EventNamer {
    /// Creates a namer for `device_count` attached devices.
    pub fn new(policy: DeviceSuffix, device_count: usize) -> Self {
        Self {
            policy,
            device_count,
        }
    }

    /// Returns a namer for a different device set, keeping the policy.
    pub fn with_device_count(self, device_count: usize) -> Self {
        Self {
            device_count,
            ..self
        }
    }

    /// Returns `true` if button and hat identifiers carry a device suffix.
    pub fn uses_device_suffix(&self) -> bool {
        match self.policy {
            DeviceSuffix::Auto => self.device_count > 1,
            DeviceSuffix::Always => true,
            DeviceSuffix::Never => false,
        }
    }

    /// Names a digital button: `BUTTON_<index>[_DEV<device>]`.
    pub fn button(&self, device: DeviceId, index: u16) -> CanonicalEventId {
        CanonicalEventId(format!("BUTTON_{index}{}", self.suffix(device)))
    }

    /// Names a hat itself (without a direction): `HAT_<index>[_DEV<device>]`.
    ///
    /// This is the key under which the last-seen direction is tracked.
    pub fn hat(&self, device: DeviceId, index: u8) -> CanonicalEventId {
        CanonicalEventId(format!("HAT_{index}{}", self.suffix(device)))
    }

    /// Names a hat transition: `HAT_<index>[_DEV<device>]_<direction>`.
    pub fn hat_event(&self, device: DeviceId, index: u8, direction: HatDirection) -> CanonicalEventId {
        CanonicalEventId(format!("HAT_{index}{}_{direction}", self.suffix(device)))
    }

    /// Names a keyboard key: the literal character or `KEY_<NAME>`.
    pub fn key(&self, key: &KeyRef) -> CanonicalEventId {
        CanonicalEventId(key.to_string())
    }

    fn suffix(&self, device: DeviceId) -> String {
        if self.uses_device_suffix() {
            format!("_DEV{device}")
        } else {
            String::new()
        }
    }
}

impl Default for EventNamer {
    fn default() -> Self {
        Self::new(DeviceSuffix::Auto, 1)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
