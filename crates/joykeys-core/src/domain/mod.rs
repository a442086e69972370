//! Domain entities for joykeys.
//!
//! This module contains pure rules with no infrastructure dependencies.
//!
//! # What is "domain" in Clean Architecture? (for beginners)
//!
//! Clean Architecture organises code into concentric layers.  The innermost
//! layer is called the **domain** (or "entities" layer).  Domain code:
//!
//! - Contains the core rules of the application.
//! - Has **no** imports from OS APIs, device libraries, or async runtimes.
//! - Can be compiled and tested on any platform without any external setup.
//!
//! Code in outer layers (application, infrastructure) depends on the domain,
//! but the domain never depends on them.

/// Hat switch direction resolution.
pub mod direction;

/// Canonical event identifiers and the namer that produces them.
pub mod event_id;

/// Action definitions: ordered key steps, delays, modifiers, hooks.
pub mod action;
