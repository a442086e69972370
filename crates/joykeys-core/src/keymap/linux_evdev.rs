//! [`KeyRef`] to Linux input-event code translation table.
//!
//! Codes are the `KEY_*` constants from `linux/input-event-codes.h`, the same
//! numbers evdev reports for physical keyboards and uinput accepts for
//! synthesized ones.
//!
//! # Shifted characters
//!
//! Linux key codes name physical keys, not characters.  `X` and `!` have no
//! code of their own: they are `KEY_X` / `KEY_1` pressed while Shift is held
//! (US layout).  [`key_to_code`] reports this with its `needs_shift` flag and
//! the emulator wraps the press in `KEY_LEFTSHIFT`.

use super::{KeyRef, NamedKey};

/// `KEY_LEFTSHIFT`, used to produce shifted characters.
pub const KEY_LEFTSHIFT: u16 = 42;

/// Unshifted printable characters and their key codes (US layout).
const UNSHIFTED: &[(char, u16)] = &[
    ('1', 2),
    ('2', 3),
    ('3', 4),
    ('4', 5),
    ('5', 6),
    ('6', 7),
    ('7', 8),
    ('8', 9),
    ('9', 10),
    ('0', 11),
    ('-', 12),
    ('=', 13),
    ('q', 16),
    ('w', 17),
    ('e', 18),
    ('r', 19),
    ('t', 20),
    ('y', 21),
    ('u', 22),
    ('i', 23),
    ('o', 24),
    ('p', 25),
    ('[', 26),
    (']', 27),
    ('a', 30),
    ('s', 31),
    ('d', 32),
    ('f', 33),
    ('g', 34),
    ('h', 35),
    ('j', 36),
    ('k', 37),
    ('l', 38),
    (';', 39),
    ('\'', 40),
    ('`', 41),
    ('\\', 43),
    ('z', 44),
    ('x', 45),
    ('c', 46),
    ('v', 47),
    ('b', 48),
    ('n', 49),
    ('m', 50),
    (',', 51),
    ('.', 52),
    ('/', 53),
];

/// Shifted symbols and the unshifted character on the same key (US layout).
const SHIFTED_SYMBOLS: &[(char, char)] = &[
    ('!', '1'),
    ('@', '2'),
    ('#', '3'),
    ('$', '4'),
    ('%', '5'),
    ('^', '6'),
    ('&', '7'),
    ('*', '8'),
    ('(', '9'),
    (')', '0'),
    ('_', '-'),
    ('+', '='),
    ('{', '['),
    ('}', ']'),
    ('|', '\\'),
    (':', ';'),
    ('"', '\''),
    ('~', '`'),
    ('<', ','),
    ('>', '.'),
    ('?', '/'),
];

/// Translates a [`KeyRef`] to a Linux key code.
///
/// Returns `(code, needs_shift)`, or `None` if the key has no code.
pub fn key_to_code(key: &KeyRef) -> Option<(u16, bool)> {
    match key {
        KeyRef::Char(c) => char_to_code(*c),
        KeyRef::Named(named) => named_to_code(*named).map(|code| (code, false)),
    }
}

/// Translates a Linux key code to the unshifted [`KeyRef`] it produces.
///
/// Returns `None` for codes outside the vocabulary (media keys, keypad, …).
pub fn code_to_key(code: u16) -> Option<KeyRef> {
    if let Some(&(c, _)) = UNSHIFTED.iter().find(|(_, k)| *k == code) {
        return Some(KeyRef::Char(c));
    }
    code_to_named(code).map(KeyRef::Named)
}

fn char_to_code(c: char) -> Option<(u16, bool)> {
    if let Some(&(_, code)) = UNSHIFTED.iter().find(|(ch, _)| *ch == c) {
        return Some((code, false));
    }
    if c.is_ascii_uppercase() {
        return char_to_code(c.to_ascii_lowercase()).map(|(code, _)| (code, true));
    }
    let base = SHIFTED_SYMBOLS
        .iter()
        .find(|(shifted, _)| *shifted == c)
        .map(|(_, base)| *base)?;
    char_to_code(base).map(|(code, _)| (code, true))
}

fn named_to_code(key: NamedKey) -> Option<u16> {
    let code = match key {
        NamedKey::Esc => 1,
        NamedKey::Backspace => 14,
        NamedKey::Tab => 15,
        NamedKey::Enter => 28,
        NamedKey::Ctrl => 29,
        NamedKey::Shift => KEY_LEFTSHIFT,
        NamedKey::ShiftR => 54,
        NamedKey::Alt => 56,
        NamedKey::Space => 57,
        NamedKey::CapsLock => 58,
        NamedKey::NumLock => 69,
        NamedKey::ScrollLock => 70,
        NamedKey::CtrlR => 97,
        NamedKey::PrintScreen => 99, // KEY_SYSRQ
        NamedKey::AltR => 100,
        NamedKey::Home => 102,
        NamedKey::Up => 103,
        NamedKey::PageUp => 104,
        NamedKey::Left => 105,
        NamedKey::Right => 106,
        NamedKey::End => 107,
        NamedKey::Down => 108,
        NamedKey::PageDown => 109,
        NamedKey::Insert => 110,
        NamedKey::Delete => 111,
        NamedKey::Pause => 119,
        NamedKey::Cmd => 125,
        NamedKey::CmdR => 126,
        NamedKey::Menu => 127, // KEY_COMPOSE
        NamedKey::F(n) => return function_key_code(n),
    };
    Some(code)
}

/// F1–F10 are contiguous from 59, F11/F12 sit at 87/88, F13–F24 from 183.
fn function_key_code(n: u8) -> Option<u16> {
    match n {
        1..=10 => Some(58 + u16::from(n)),
        11 => Some(87),
        12 => Some(88),
        13..=super::MAX_FUNCTION_KEY => Some(170 + u16::from(n)),
        _ => None,
    }
}

fn code_to_named(code: u16) -> Option<NamedKey> {
    let named = match code {
        1 => NamedKey::Esc,
        14 => NamedKey::Backspace,
        15 => NamedKey::Tab,
        28 => NamedKey::Enter,
        29 => NamedKey::Ctrl,
        KEY_LEFTSHIFT => NamedKey::Shift,
        54 => NamedKey::ShiftR,
        56 => NamedKey::Alt,
        57 => NamedKey::Space,
        58 => NamedKey::CapsLock,
        59..=68 => NamedKey::F((code - 58) as u8),
        69 => NamedKey::NumLock,
        70 => NamedKey::ScrollLock,
        87 => NamedKey::F(11),
        88 => NamedKey::F(12),
        97 => NamedKey::CtrlR,
        99 => NamedKey::PrintScreen,
        100 => NamedKey::AltR,
        102 => NamedKey::Home,
        103 => NamedKey::Up,
        104 => NamedKey::PageUp,
        105 => NamedKey::Left,
        106 => NamedKey::Right,
        107 => NamedKey::End,
        108 => NamedKey::Down,
        109 => NamedKey::PageDown,
        110 => NamedKey::Insert,
        111 => NamedKey::Delete,
        119 => NamedKey::Pause,
        125 => NamedKey::Cmd,
        126 => NamedKey::CmdR,
        127 => NamedKey::Menu,
        183..=190 => NamedKey::F((code - 170) as u8),
        _ => return None,
    };
    Some(named)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
