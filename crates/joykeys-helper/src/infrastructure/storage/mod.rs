//! Storage infrastructure: mapping file persistence.
//!
//! The `config` sub-module handles:
//!
//! - Reading the TOML mapping file from the platform-appropriate directory.
//! - Validating it into the table the dispatcher uses.
//! - Writing the default mapping file on first run (`--create-config`).
//! - Providing the default mappings when the file is missing or broken.

pub mod config;
