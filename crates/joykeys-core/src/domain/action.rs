//! Action definitions.
//!
//! An [`Action`] is the small key-press program run when a trigger fires:
//! an ordered list of [`ActionStep`]s, the pause between key events, an
//! optional modifier that must be held, and optional hooks run before and
//! after the steps.
//!
//! Actions are immutable once built.  The registry stores them behind an
//! [`Arc`], and an executor clones that `Arc` when it starts, so a later
//! reload never changes an action that is already running.

use std::collections::HashMap;
use std::fmt;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

use super::event_id::CanonicalEventId;
use crate::keymap::KeyRef;

/// Pause after each press and each release when an action sets none.
pub const DEFAULT_INTER_KEY_DELAY: Duration = Duration::from_millis(100);

/// Error reported by an [`ActionHook`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("hook {hook:?} failed: {reason}")]
pub struct HookError {
    /// Name of the hook that failed.
    pub hook: String,
    /// Human-readable failure description.
    pub reason: String,
}

impl HookError {
    /// Creates a hook error.
    pub fn new(hook: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            hook: hook.into(),
            reason: reason.into(),
        }
    }
}

/// A side-effecting callback run before or after an action's steps.
///
/// Hooks are registered by name in application code and resolved when a
/// mapping file is loaded; mapping files only ever contain the name.
pub trait ActionHook: Send + Sync {
    /// The name the hook is registered under.
    fn name(&self) -> &str;

    /// Runs the hook for the action triggered by `trigger`.
    fn run(&self, trigger: &CanonicalEventId) -> Result<(), HookError>;
}

/// One step of an action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionStep {
    /// Press and release `key`, `repeat_count` times.
    Key {
        key: KeyRef,
        repeat_count: NonZeroU32,
    },
    /// Pause this action without touching the output.
    Wait { duration: Duration },
}

impl ActionStep {
    /// A key step pressed `repeat_count` times.
    pub fn key(key: KeyRef, repeat_count: NonZeroU32) -> Self {
        ActionStep::Key { key, repeat_count }
    }

    /// A key step pressed once.
    pub fn tap(key: KeyRef) -> Self {
        ActionStep::Key {
            key,
            repeat_count: NonZeroU32::MIN,
        }
    }

    /// A wait step.
    pub fn wait(duration: Duration) -> Self {
        ActionStep::Wait { duration }
    }
}

/// The program executed when a trigger fires.
#[derive(Clone)]
pub struct Action {
    /// Steps, run in order.
    pub steps: Vec<ActionStep>,
    /// Pause after every press and every release.
    pub inter_key_delay: Duration,
    /// Control that must be held for the action to fire.
    pub required_modifier: Option<CanonicalEventId>,
    /// Run before the steps; a failure skips the steps.
    pub pre_hook: Option<Arc<dyn ActionHook>>,
    /// Run after the steps.
    pub post_hook: Option<Arc<dyn ActionHook>>,
}

impl Action {
    /// Creates an action with the default delay and no modifier or hooks.
    pub fn new(steps: Vec<ActionStep>) -> Self {
        Self {
            steps,
            inter_key_delay: DEFAULT_INTER_KEY_DELAY,
            required_modifier: None,
            pre_hook: None,
            post_hook: None,
        }
    }

    /// Sets the pause after each press and release.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.inter_key_delay = delay;
        self
    }

    /// Requires `modifier` to be held when the trigger fires.
    pub fn with_modifier(mut self, modifier: impl Into<CanonicalEventId>) -> Self {
        self.required_modifier = Some(modifier.into());
        self
    }

    /// Sets the hook run before the steps.
    pub fn with_pre_hook(mut self, hook: Arc<dyn ActionHook>) -> Self {
        self.pre_hook = Some(hook);
        self
    }

    /// Sets the hook run after the steps.
    pub fn with_post_hook(mut self, hook: Arc<dyn ActionHook>) -> Self {
        self.post_hook = Some(hook);
        self
    }

    /// Returns `true` if this action, bound to `trigger`, is gated by the
    /// trigger itself.
    ///
    /// Such a mapping always fires (the trigger is held during its own
    /// press), which is rarely what the author meant.
    pub fn is_self_gated(&self, trigger: &CanonicalEventId) -> bool {
        self.required_modifier.as_ref() == Some(trigger)
    }

    /// Total number of key press/release pairs the action emits.
    pub fn key_press_count(&self) -> u64 {
        self.steps
            .iter()
            .map(|step| match step {
                ActionStep::Key { repeat_count, .. } => u64::from(repeat_count.get()),
                ActionStep::Wait { .. } => 0,
            })
            .sum()
    }
}

impl fmt::Debug for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Action")
            .field("steps", &self.steps)
            .field("inter_key_delay", &self.inter_key_delay)
            .field("required_modifier", &self.required_modifier)
            .field("pre_hook", &self.pre_hook.as_ref().map(|h| h.name()))
            .field("post_hook", &self.post_hook.as_ref().map(|h| h.name()))
            .finish()
    }
}

/// The full mapping from trigger to action.
pub type ActionTable = HashMap<CanonicalEventId, Arc<Action>>;

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    struct NamedHook;

    impl ActionHook for NamedHook {
        fn name(&self) -> &str {
            "named"
        }

        fn run(&self, _trigger: &CanonicalEventId) -> Result<(), HookError> {
            Ok(())
        }
    }

    fn repeat(n: u32) -> NonZeroU32 {
        NonZeroU32::new(n).unwrap()
    }

    #[test]
    fn test_new_action_uses_default_delay_and_no_modifier() {
        let action = Action::new(vec![ActionStep::tap(KeyRef::Char('v'))]);
        assert_eq!(action.inter_key_delay, DEFAULT_INTER_KEY_DELAY);
        assert!(action.required_modifier.is_none());
        assert!(action.pre_hook.is_none());
    }

    #[test]
    fn test_builder_sets_delay_and_modifier() {
        let action = Action::new(vec![])
            .with_delay(Duration::from_millis(20))
            .with_modifier("BUTTON_3");
        assert_eq!(action.inter_key_delay, Duration::from_millis(20));
        assert_eq!(action.required_modifier, Some(CanonicalEventId::new("BUTTON_3")));
    }

    #[test]
    fn test_is_self_gated_detects_trigger_as_own_modifier() {
        let action = Action::new(vec![]).with_modifier("BUTTON_1");
        assert!(action.is_self_gated(&CanonicalEventId::new("BUTTON_1")));
        assert!(!action.is_self_gated(&CanonicalEventId::new("BUTTON_2")));
    }

    #[test]
    fn test_key_press_count_ignores_wait_steps() {
        let action = Action::new(vec![
            ActionStep::tap(KeyRef::Char('v')),
            ActionStep::wait(Duration::from_millis(200)),
            ActionStep::key(KeyRef::Char('x'), repeat(2)),
        ]);
        assert_eq!(action.key_press_count(), 3);
    }

    #[test]
    fn test_debug_shows_hook_names() {
        let action = Action::new(vec![]).with_pre_hook(Arc::new(NamedHook));
        let text = format!("{action:?}");
        assert!(text.contains("Some(\"named\")"), "{text}");
    }

    #[test]
    fn test_hook_error_display_names_hook() {
        let err = HookError::new("log_start", "disk full");
        assert_eq!(err.to_string(), "hook \"log_start\" failed: disk full");
    }
}
