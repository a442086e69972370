//! Key vocabulary shared by keyboard triggers and synthesized output.
//!
//! A [`KeyRef`] names one keyboard key in the same spelling the mapping file
//! uses:
//!
//! - a single printable ASCII character, e.g. `v`, `4`, `[`, `X`;
//! - a named key with the `KEY_` prefix, e.g. `KEY_SPACE`, `KEY_F1`,
//!   `KEY_SHIFT_R`.
//!
//! Parsing is strict: only the characters and names listed here are
//! accepted.  Platform codes are translated to/from [`KeyRef`] at the
//! capture and emulation boundaries (see [`linux_evdev`]).

pub mod linux_evdev;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Highest function key number accepted (`KEY_F1` … `KEY_F20`).
pub const MAX_FUNCTION_KEY: u8 = 20;

/// Error returned when a key spelling is not part of the vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyParseError {
    #[error("key name is empty")]
    Empty,
    #[error("character {0:?} is not a printable ASCII key")]
    NotPrintable(char),
    #[error("unknown named key: {0:?}")]
    UnknownName(String),
    #[error("unrecognized key {0:?}: expected a single character or KEY_<NAME>")]
    Unrecognized(String),
}

/// A non-printable key, spelled `KEY_<NAME>` in identifiers and configs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NamedKey {
    Space,
    Enter,
    Esc,
    Tab,
    Backspace,
    Delete,
    Insert,
    Home,
    End,
    PageUp,
    PageDown,
    Up,
    Down,
    Left,
    Right,
    CapsLock,
    NumLock,
    ScrollLock,
    PrintScreen,
    Pause,
    Menu,
    Shift,
    ShiftR,
    Ctrl,
    CtrlR,
    Alt,
    AltR,
    Cmd,
    CmdR,
    /// Function key `F1` … `F20`.
    F(u8),
}

/// Fixed names for every [`NamedKey`] except the function keys.
const NAMES: &[(NamedKey, &str)] = &[
    (NamedKey::Space, "SPACE"),
    (NamedKey::Enter, "ENTER"),
    (NamedKey::Esc, "ESC"),
    (NamedKey::Tab, "TAB"),
    (NamedKey::Backspace, "BACKSPACE"),
    (NamedKey::Delete, "DELETE"),
    (NamedKey::Insert, "INSERT"),
    (NamedKey::Home, "HOME"),
    (NamedKey::End, "END"),
    (NamedKey::PageUp, "PAGE_UP"),
    (NamedKey::PageDown, "PAGE_DOWN"),
    (NamedKey::Up, "UP"),
    (NamedKey::Down, "DOWN"),
    (NamedKey::Left, "LEFT"),
    (NamedKey::Right, "RIGHT"),
    (NamedKey::CapsLock, "CAPS_LOCK"),
    (NamedKey::NumLock, "NUM_LOCK"),
    (NamedKey::ScrollLock, "SCROLL_LOCK"),
    (NamedKey::PrintScreen, "PRINT_SCREEN"),
    (NamedKey::Pause, "PAUSE"),
    (NamedKey::Menu, "MENU"),
    (NamedKey::Shift, "SHIFT"),
    (NamedKey::ShiftR, "SHIFT_R"),
    (NamedKey::Ctrl, "CTRL"),
    (NamedKey::CtrlR, "CTRL_R"),
    (NamedKey::Alt, "ALT"),
    (NamedKey::AltR, "ALT_R"),
    (NamedKey::Cmd, "CMD"),
    (NamedKey::CmdR, "CMD_R"),
];

/// Alternate spellings accepted on input; output always uses [`NAMES`].
const ALIASES: &[(&str, NamedKey)] = &[
    ("RETURN", NamedKey::Enter),
    ("ESCAPE", NamedKey::Esc),
    ("SHIFT_L", NamedKey::Shift),
    ("CTRL_L", NamedKey::Ctrl),
    ("ALT_L", NamedKey::Alt),
    ("ALT_GR", NamedKey::AltR),
    ("CMD_L", NamedKey::Cmd),
];

impl NamedKey {
    /// Looks up a name (without the `KEY_` prefix), case-insensitively.
    pub fn from_name(name: &str) -> Option<Self> {
        let upper = name.to_ascii_uppercase();
        if let Some(&(key, _)) = NAMES.iter().find(|(_, n)| *n == upper) {
            return Some(key);
        }
        if let Some(&(_, key)) = ALIASES.iter().find(|(n, _)| *n == upper) {
            return Some(key);
        }
        let number = upper.strip_prefix('F')?.parse::<u8>().ok()?;
        (1..=MAX_FUNCTION_KEY)
            .contains(&number)
            .then_some(NamedKey::F(number))
    }

    /// Returns the canonical name without the `KEY_` prefix.
    pub fn name(self) -> String {
        match self {
            NamedKey::F(n) => format!("F{n}"),
            other => NAMES
                .iter()
                .find(|(k, _)| *k == other)
                .map(|(_, n)| (*n).to_string())
                .unwrap_or_default(),
        }
    }
}

/// One keyboard key, as used by triggers and by action steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum KeyRef {
    /// A printable ASCII character (`!` through `~`).
    Char(char),
    /// A non-printable key.
    Named(NamedKey),
}

impl KeyRef {
    /// Returns `true` for characters that can stand for themselves in a
    /// [`KeyRef::Char`].
    pub fn is_printable(c: char) -> bool {
        c.is_ascii_graphic()
    }
}

impl fmt::Display for KeyRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyRef::Char(c) => write!(f, "{c}"),
            KeyRef::Named(named) => write!(f, "KEY_{}", named.name()),
        }
    }
}

impl FromStr for KeyRef {
    type Err = KeyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        match (chars.next(), chars.next()) {
            (None, _) => Err(KeyParseError::Empty),
            (Some(c), None) => {
                if c == ' ' {
                    Ok(KeyRef::Named(NamedKey::Space))
                } else if KeyRef::is_printable(c) {
                    Ok(KeyRef::Char(c))
                } else {
                    Err(KeyParseError::NotPrintable(c))
                }
            }
            _ => {
                let prefix = s.get(..4).filter(|p| p.eq_ignore_ascii_case("KEY_"));
                match prefix {
                    Some(_) => {
                        let name = &s[4..];
                        NamedKey::from_name(name)
                            .map(KeyRef::Named)
                            .ok_or_else(|| KeyParseError::UnknownName(name.to_string()))
                    }
                    None => Err(KeyParseError::Unrecognized(s.to_string())),
                }
            }
        }
    }
}

impl TryFrom<String> for KeyRef {
    type Error = KeyParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<KeyRef> for String {
    fn from(key: KeyRef) -> Self {
        key.to_string()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
