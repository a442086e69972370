//! Hat switch direction resolution.
//!
//! A hat (a small 8-way directional pad on a joystick) reports two axis
//! readings, each in `{-1, 0, 1}`.  This module maps the pair onto one of
//! nine symbolic directions.
//!
//! # Axis convention
//!
//! `x = 1` is right and `y = 1` is up.  Sources whose native convention is
//! inverted (Linux `ABS_HAT0Y` reports `-1` for up) must negate `y` before
//! calling [`HatDirection::from_axes`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One of the nine positions a hat switch can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HatDirection {
    #[default]
    Centered,
    Up,
    UpRight,
    Right,
    DownRight,
    Down,
    DownLeft,
    Left,
    UpLeft,
}

/// Error returned when a direction name is not one of the nine known names.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown hat direction: {0:?}")]
pub struct UnknownDirection(pub String);

impl HatDirection {
    /// All nine directions, in table order.
    pub const ALL: [HatDirection; 9] = [
        HatDirection::Centered,
        HatDirection::Up,
        HatDirection::UpRight,
        HatDirection::Right,
        HatDirection::DownRight,
        HatDirection::Down,
        HatDirection::DownLeft,
        HatDirection::Left,
        HatDirection::UpLeft,
    ];

    /// Resolves a two-axis hat reading to a direction.
    ///
    /// Total: any pair outside `{-1, 0, 1}²` resolves to [`HatDirection::Centered`].
    pub fn from_axes(x: i32, y: i32) -> Self {
        match (x, y) {
            (0, 1) => HatDirection::Up,
            (1, 1) => HatDirection::UpRight,
            (1, 0) => HatDirection::Right,
            (1, -1) => HatDirection::DownRight,
            (0, -1) => HatDirection::Down,
            (-1, -1) => HatDirection::DownLeft,
            (-1, 0) => HatDirection::Left,
            (-1, 1) => HatDirection::UpLeft,
            _ => HatDirection::Centered,
        }
    }

    /// Returns the canonical lowercase name used inside event identifiers.
    pub fn as_str(self) -> &'static str {
        match self {
            HatDirection::Centered => "centered",
            HatDirection::Up => "up",
            HatDirection::UpRight => "up-right",
            HatDirection::Right => "right",
            HatDirection::DownRight => "down-right",
            HatDirection::Down => "down",
            HatDirection::DownLeft => "down-left",
            HatDirection::Left => "left",
            HatDirection::UpLeft => "up-left",
        }
    }
}

impl fmt::Display for HatDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HatDirection {
    type Err = UnknownDirection;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        HatDirection::ALL
            .into_iter()
            .find(|d| d.as_str() == s)
            .ok_or_else(|| UnknownDirection(s.to_string()))
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
