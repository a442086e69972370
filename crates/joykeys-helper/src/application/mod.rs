//! Application layer use cases for the helper.
//!
//! # What is the "application" layer? (for beginners)
//!
//! In Clean Architecture the *application* layer sits between the domain
//! (pure rules in `joykeys-core`) and the infrastructure (devices, files,
//! signals).
//!
//! Use cases in this layer:
//!
//! - **Orchestrate** domain objects to fulfil a user goal (e.g., "press `v`
//!   then `x` twice when the hat is pushed up").
//! - **Depend on abstractions** (traits) rather than concrete implementations,
//!   so the infrastructure can be swapped without changing this code.
//! - **Contain no OS calls and no file system access**.
//!
//! # Sub-modules
//!
//! - **`momentary_state`**  – Which controls are held right now and where
//!   each hat last pointed.  Owned by the event loop alone.
//!
//! - **`action_registry`**  – The active mapping table, readable without
//!   locks and replaceable atomically.
//!
//! - **`reload_config`**    – Loads a new table from the config collaborator
//!   and swaps it in, keeping the old one when loading fails.
//!
//! - **`dispatch_input`**   – The event loop.  This is the most critical use
//!   case: it runs on every button press and hat movement.
//!
//! - **`execute_sequence`** – Runs one action to completion on its own task.
//!
//! - **`hooks`**            – The whitelist of named pre/post hooks.

pub mod action_registry;
pub mod dispatch_input;
pub mod execute_sequence;
pub mod hooks;
pub mod momentary_state;
pub mod reload_config;
