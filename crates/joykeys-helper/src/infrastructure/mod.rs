//! Infrastructure layer for the helper.
//!
//! Contains OS-facing adapters: input device readers, the virtual keyboard,
//! mapping file storage, process signals and the event monitor.
//!
//! **Dependency rule**: this layer may depend on `application` and
//! `joykeys_core`; the application layer only reaches in for plain data types
//! (`RawInputEvent`, `ConfigError`).

pub mod control;
pub mod input_capture;
pub mod key_emulation;
pub mod monitor;
pub mod storage;
