//! Named pre-run and post-run hooks.
//!
//! A mapping file refers to hooks by name only (`pre_run = "log_start"`).
//! The loader resolves each name against a [`HookRegistry`] built in code;
//! an unknown name is a config error.  Nothing in a config file is ever
//! evaluated.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use joykeys_core::{ActionHook, CanonicalEventId, HookError};
use tracing::info;

/// Name of the built-in hook announcing that a sequence started.
pub const LOG_START: &str = "log_start";
/// Name of the built-in hook announcing that a sequence finished.
pub const LOG_END: &str = "log_end";

/// Emits an `info` event naming the trigger.
struct LogHook {
    name: &'static str,
    message: &'static str,
}

impl ActionHook for LogHook {
    fn name(&self) -> &str {
        self.name
    }

    fn run(&self, trigger: &CanonicalEventId) -> Result<(), HookError> {
        info!(trigger = %trigger, "{}", self.message);
        Ok(())
    }
}

/// Whitelist of hooks a mapping file may name.
#[derive(Default, Clone)]
pub struct HookRegistry {
    hooks: HashMap<String, Arc<dyn ActionHook>>,
}

impl HookRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry holding `log_start` and `log_end`.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(LogHook {
            name: LOG_START,
            message: "sequence started",
        }));
        registry.register(Arc::new(LogHook {
            name: LOG_END,
            message: "sequence finished",
        }));
        registry
    }

    /// Adds `hook` under its own name, replacing any hook of the same name.
    pub fn register(&mut self, hook: Arc<dyn ActionHook>) {
        self.hooks.insert(hook.name().to_string(), hook);
    }

    /// Looks up a hook by name.
    pub fn resolve(&self, name: &str) -> Option<Arc<dyn ActionHook>> {
        self.hooks.get(name).cloned()
    }

    /// Registered hook names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.hooks.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl fmt::Debug for HookRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HookRegistry")
            .field("hooks", &self.names())
            .finish()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    struct FailingHook;

    impl ActionHook for FailingHook {
        fn name(&self) -> &str {
            "always_fails"
        }

        fn run(&self, _trigger: &CanonicalEventId) -> Result<(), HookError> {
            Err(HookError::new("always_fails", "as configured"))
        }
    }

    #[test]
    fn test_builtins_are_registered() {
        let registry = HookRegistry::with_builtins();
        assert_eq!(registry.names(), vec![LOG_END, LOG_START]);
    }

    #[test]
    fn test_builtin_hooks_succeed() {
        let registry = HookRegistry::with_builtins();
        let hook = registry.resolve(LOG_START).expect("builtin");
        assert!(hook.run(&CanonicalEventId::new("HAT_0_up")).is_ok());
    }

    #[test]
    fn test_unknown_name_resolves_to_none() {
        assert!(HookRegistry::with_builtins().resolve("rm_rf").is_none());
    }

    #[test]
    fn test_register_custom_hook() {
        // Arrange
        let mut registry = HookRegistry::new();

        // Act
        registry.register(Arc::new(FailingHook));

        // Assert
        let hook = registry.resolve("always_fails").expect("registered");
        assert!(hook.run(&CanonicalEventId::new("BUTTON_0")).is_err());
    }
}
