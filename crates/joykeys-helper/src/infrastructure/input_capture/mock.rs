//! Mock input source for unit testing.
//!
//! Allows tests to inject synthetic [`RawInputEvent`]s without requiring
//! real joysticks or read access to `/dev/input`.

use std::sync::{
    mpsc::{self, Sender},
    Arc, Mutex,
};

use super::{CaptureError, DeviceInfo, InputSource, RawInputEvent};

/// A mock implementation of [`InputSource`] that allows tests to inject events.
pub struct MockInputSource {
    sender: Arc<Mutex<Option<Sender<RawInputEvent>>>>,
    devices: Vec<DeviceInfo>,
}

impl MockInputSource {
    /// Creates a new mock input source with no devices.
    pub fn new() -> Self {
        Self::with_devices(Vec::new())
    }

    /// Creates a mock that reports `devices` from [`InputSource::devices`].
    pub fn with_devices(devices: Vec<DeviceInfo>) -> Self {
        Self {
            sender: Arc::new(Mutex::new(None)),
            devices,
        }
    }

    /// Injects a synthetic event, as if captured from hardware.
    ///
    /// Panics if `start()` has not been called or if `stop()` has been called.
    pub fn inject_event(&self, event: RawInputEvent) {
        let guard = self.sender.lock().expect("lock poisoned");
        if let Some(ref sender) = *guard {
            sender
                .send(event)
                .expect("receiver has been dropped; call start() first");
        } else {
            panic!("MockInputSource::inject_event called before start()");
        }
    }
}

impl Default for MockInputSource {
    fn default() -> Self {
        Self::new()
    }
}

impl InputSource for MockInputSource {
    fn start(&self) -> Result<mpsc::Receiver<RawInputEvent>, CaptureError> {
        let (tx, rx) = mpsc::channel();
        *self.sender.lock().expect("lock poisoned") = Some(tx);
        Ok(rx)
    }

    fn stop(&self) {
        // Drop the sender to close the channel
        *self.sender.lock().expect("lock poisoned") = None;
    }

    fn devices(&self) -> Vec<DeviceInfo> {
        self.devices.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::input_capture::DeviceKind;
    use joykeys_core::KeyRef;
    use std::path::PathBuf;

    #[test]
    fn test_mock_input_source_starts_and_receives_events() {
        // Arrange
        let source = MockInputSource::new();
        let rx = source.start().expect("start should succeed");

        // Act
        source.inject_event(RawInputEvent::ButtonDown { device: 0, button: 4 });

        // Assert
        let event = rx.recv().expect("should receive event");
        assert_eq!(event, RawInputEvent::ButtonDown { device: 0, button: 4 });
    }

    #[test]
    fn test_mock_input_source_stop_closes_channel() {
        // Arrange
        let source = MockInputSource::new();
        let rx = source.start().expect("start should succeed");

        // Act
        source.stop();

        // Assert – channel should be disconnected
        let result = rx.recv();
        assert!(result.is_err(), "channel should be closed after stop()");
    }

    #[test]
    fn test_mock_input_source_preserves_event_order() {
        // Arrange
        let source = MockInputSource::new();
        let rx = source.start().expect("start should succeed");

        // Act
        source.inject_event(RawInputEvent::HatMotion { device: 0, hat: 0, x: 0, y: 1 });
        source.inject_event(RawInputEvent::KeyDown { key: KeyRef::Char('a') });
        source.inject_event(RawInputEvent::KeyUp { key: KeyRef::Char('a') });

        // Assert
        assert!(matches!(rx.recv().unwrap(), RawInputEvent::HatMotion { y: 1, .. }));
        assert!(matches!(rx.recv().unwrap(), RawInputEvent::KeyDown { .. }));
        assert!(matches!(rx.recv().unwrap(), RawInputEvent::KeyUp { .. }));
    }

    #[test]
    fn test_mock_input_source_reports_configured_devices() {
        let source = MockInputSource::with_devices(vec![DeviceInfo {
            id: 0,
            name: "pad".to_string(),
            path: PathBuf::from("/dev/input/event7"),
            kind: DeviceKind::Joystick { buttons: 10, hats: 1 },
        }]);
        assert_eq!(source.devices().len(), 1);
    }
}
