//! ReloadCoordinator: replaces the active mapping table on request.
//!
//! A reload asks the config collaborator for a complete new table and swaps
//! it into the [`ActionRegistry`] in one step.  If loading fails, the
//! registry keeps the table it already had and the caller gets the error.
//!
//! Sequences already running are not touched: each one holds its own
//! `Arc<Action>` and finishes with the definition it started with.

use std::sync::Arc;

use joykeys_core::ActionTable;
use thiserror::Error;
use tracing::{error, info};

use super::action_registry::ActionRegistry;
use crate::infrastructure::storage::config::ConfigError;

/// Produces a complete mapping table.
///
/// The production implementation reads the TOML mapping file; tests use a
/// mock.
pub trait ConfigSource: Send + Sync {
    /// Loads and validates a full table.
    fn load(&self) -> Result<ActionTable, ConfigError>;
}

/// Error type for reload requests.
#[derive(Debug, Error)]
pub enum ReloadError {
    #[error("mapping reload failed, keeping previous mappings: {0}")]
    Load(#[from] ConfigError),
}

/// Loads a table from a [`ConfigSource`] and installs it in the registry.
pub struct ReloadCoordinator {
    source: Arc<dyn ConfigSource>,
    registry: Arc<ActionRegistry>,
}

impl ReloadCoordinator {
    /// Creates a coordinator for `registry`.
    pub fn new(source: Arc<dyn ConfigSource>, registry: Arc<ActionRegistry>) -> Self {
        Self { source, registry }
    }

    /// Loads a fresh table and swaps it in.  Returns the new mapping count.
    ///
    /// Callable from any thread.  On failure the previous table stays active.
    pub fn reload(&self) -> Result<usize, ReloadError> {
        match self.source.load() {
            Ok(table) => {
                let count = table.len();
                let previous = self.registry.replace(table);
                info!(previous, current = count, "mappings reloaded");
                Ok(count)
            }
            Err(e) => {
                error!("mapping reload failed, keeping {} mappings: {e}", self.registry.len());
                Err(ReloadError::Load(e))
            }
        }
    }

    /// The registry this coordinator writes to.
    pub fn registry(&self) -> &Arc<ActionRegistry> {
        &self.registry
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
