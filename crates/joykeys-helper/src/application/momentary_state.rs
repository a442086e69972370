//! Momentary input state: which controls are held and where each hat points.
//!
//! # Why track state at all? (for beginners)
//!
//! A hat switch does not send "pressed up"; it reports its current position
//! every time either axis changes, and some drivers resend the same position.
//! To fire `HAT_0_up` exactly once per push, the dispatcher needs to know the
//! previous position and only react when it changes.
//!
//! The same table answers the modifier question: "is `BUTTON_3` held right
//! now?"  Buttons and keys are added on press and removed on release.
//!
//! # Ownership
//!
//! The state belongs to the event loop alone.  It is a plain struct with no
//! locks; executors never see it.

use std::collections::{HashMap, HashSet};

use joykeys_core::{CanonicalEventId, HatDirection};

/// Held controls plus the last-seen direction of every hat.
#[derive(Debug, Default)]
pub struct MomentaryState {
    pressed: HashSet<CanonicalEventId>,
    hats: HashMap<CanonicalEventId, HatDirection>,
}

impl MomentaryState {
    /// Creates an empty state: nothing held, every hat centered.
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks `id` as held.  Pressing an already-held control is a no-op.
    pub fn on_press(&mut self, id: CanonicalEventId) {
        self.pressed.insert(id);
    }

    /// Marks `id` as released.  Releasing a control that is not held is a no-op.
    pub fn on_release(&mut self, id: &str) {
        self.pressed.remove(id);
    }

    /// Records a hat sample and reports whether the direction changed.
    ///
    /// A hat that has never been sampled counts as `Centered`, so a first
    /// sample of `Centered` is not a change.
    pub fn on_hat_sample(&mut self, hat: CanonicalEventId, direction: HatDirection) -> bool {
        let previous = self.hats.get(&hat).copied().unwrap_or_default();
        if previous == direction {
            return false;
        }
        self.hats.insert(hat, direction);
        true
    }

    /// Returns `true` if the control named `id` is currently held.
    pub fn is_held(&self, id: &str) -> bool {
        self.pressed.contains(id)
    }

    /// Returns the last-seen direction of `hat` (`Centered` if never seen).
    pub fn hat_direction(&self, hat: &str) -> HatDirection {
        self.hats.get(hat).copied().unwrap_or_default()
    }

    /// Number of buttons and keys currently held.
    pub fn held_count(&self) -> usize {
        self.pressed.len()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> CanonicalEventId {
        CanonicalEventId::new(s)
    }

    #[test]
    fn test_press_then_release_clears_held() {
        // Arrange
        let mut state = MomentaryState::new();

        // Act
        state.on_press(id("BUTTON_3"));
        let held_after_press = state.is_held("BUTTON_3");
        state.on_release("BUTTON_3");

        // Assert
        assert!(held_after_press);
        assert!(!state.is_held("BUTTON_3"));
        assert_eq!(state.held_count(), 0);
    }

    #[test]
    fn test_repeated_press_and_stray_release_are_idempotent() {
        let mut state = MomentaryState::new();
        state.on_release("BUTTON_9");
        state.on_press(id("BUTTON_1"));
        state.on_press(id("BUTTON_1"));
        assert_eq!(state.held_count(), 1);
    }

    #[test]
    fn test_unseen_hat_reads_centered() {
        let state = MomentaryState::new();
        assert_eq!(state.hat_direction("HAT_0"), HatDirection::Centered);
    }

    #[test]
    fn test_first_centered_sample_is_not_a_change() {
        let mut state = MomentaryState::new();
        assert!(!state.on_hat_sample(id("HAT_0"), HatDirection::Centered));
    }

    #[test]
    fn test_hat_change_detection_centered_up_centered() {
        // Arrange
        let mut state = MomentaryState::new();

        // Act
        let to_up = state.on_hat_sample(id("HAT_0"), HatDirection::Up);
        let repeat_up = state.on_hat_sample(id("HAT_0"), HatDirection::Up);
        let back = state.on_hat_sample(id("HAT_0"), HatDirection::Centered);

        // Assert
        assert!(to_up);
        assert!(!repeat_up, "same direction twice must not count as a change");
        assert!(back, "returning to centered is a change");
        assert_eq!(state.hat_direction("HAT_0"), HatDirection::Centered);
    }

    #[test]
    fn test_hats_are_tracked_independently() {
        let mut state = MomentaryState::new();
        assert!(state.on_hat_sample(id("HAT_0_DEV0"), HatDirection::Left));
        assert!(state.on_hat_sample(id("HAT_0_DEV1"), HatDirection::Left));
        assert_eq!(state.hat_direction("HAT_0_DEV0"), HatDirection::Left);
        assert_eq!(state.hat_direction("HAT_1_DEV0"), HatDirection::Centered);
    }
}
