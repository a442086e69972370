//! Mock key output for unit testing.
//!
//! # Why a mock sink?
//!
//! The real sink creates a uinput device, which:
//!
//! - Requires write access to `/dev/uinput`.
//! - Actually types into whatever window has focus on the test machine.
//! - Cannot be observed directly from Rust test code.
//!
//! `MockKeyOutput` replaces all of that with in-memory recording.  Each call
//! is pushed into a `Mutex<Vec<...>>` together with the Tokio clock reading,
//! so tests can check both the order of calls and their timing (including
//! under a paused clock).
//!
//! # `should_fail` flag
//!
//! Build with [`MockKeyOutput::failing`] to make every call return an
//! `EmulationError::Platform`, to test fault handling without a broken OS.

use std::sync::Mutex;

use joykeys_core::KeyRef;
use tokio::time::Instant;

use crate::application::execute_sequence::{EmulationError, KeyOutput};

/// One recorded sink call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyEvent {
    Press(KeyRef),
    Release(KeyRef),
}

/// A mock sink that records all calls without performing OS API calls.
#[derive(Debug, Default)]
pub struct MockKeyOutput {
    /// Every accepted call with the time it was made.
    pub events: Mutex<Vec<(KeyEvent, Instant)>>,
    /// When `true`, every call returns an error and nothing is recorded.
    pub should_fail: bool,
}

impl MockKeyOutput {
    /// Creates a recording sink with `should_fail = false`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a sink whose every call fails.
    pub fn failing() -> Self {
        Self {
            should_fail: true,
            ..Self::default()
        }
    }

    /// A copy of the recorded calls.
    pub fn events(&self) -> Vec<(KeyEvent, Instant)> {
        self.events.lock().unwrap().clone()
    }

    /// The keys pressed, in order.
    pub fn presses(&self) -> Vec<KeyRef> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter_map(|(event, _)| match event {
                KeyEvent::Press(key) => Some(*key),
                KeyEvent::Release(_) => None,
            })
            .collect()
    }

    fn record(&self, event: KeyEvent) -> Result<(), EmulationError> {
        if self.should_fail {
            return Err(EmulationError::Platform("mock failure".into()));
        }
        self.events.lock().unwrap().push((event, Instant::now()));
        Ok(())
    }
}

impl KeyOutput for MockKeyOutput {
    fn press(&self, key: &KeyRef) -> Result<(), EmulationError> {
        self.record(KeyEvent::Press(*key))
    }

    fn release(&self, key: &KeyRef) -> Result<(), EmulationError> {
        self.record(KeyEvent::Release(*key))
    }
}
