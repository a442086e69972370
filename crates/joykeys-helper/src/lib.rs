//! joykeys-helper library entry point.
//!
//! Re-exports all public modules so that integration tests in `tests/`
//! and the binary entry point in `main.rs` share the same module tree.
//!
//! # What does the helper do? (for beginners)
//!
//! The helper is a small background daemon:
//!
//! 1. It reads button, hat and keyboard events from the attached input
//!    devices (the *event source*).
//! 2. It names each event with a stable identifier such as `HAT_0_up` and
//!    tracks which controls are currently held.
//! 3. It looks the identifier up in the user's mapping table, checks the
//!    optional modifier, and starts an independent task that presses the
//!    configured keys with the configured delays (the *output sink*).
//! 4. It swaps in a freshly loaded mapping table on request without
//!    disturbing sequences that are already running.

/// Application layer: the dispatch engine and its use cases.
pub mod application;

/// Infrastructure layer: devices, virtual keyboard, config file, signals.
pub mod infrastructure;
