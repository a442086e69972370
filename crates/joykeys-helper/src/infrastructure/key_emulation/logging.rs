//! Dry-run output sink.
//!
//! Logs each press and release instead of typing it.  Useful for checking a
//! mapping file without sending keys to the focused window, and the fallback
//! on platforms without a native sink.

use joykeys_core::KeyRef;
use tracing::info;

use crate::application::execute_sequence::{EmulationError, KeyOutput};

/// A sink that only logs.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingKeyOutput;

impl KeyOutput for LoggingKeyOutput {
    fn press(&self, key: &KeyRef) -> Result<(), EmulationError> {
        info!(%key, "press");
        Ok(())
    }

    fn release(&self, key: &KeyRef) -> Result<(), EmulationError> {
        info!(%key, "release");
        Ok(())
    }
}
