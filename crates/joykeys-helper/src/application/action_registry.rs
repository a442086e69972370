//! The active mapping table.
//!
//! The event loop looks up every trigger here, while a reload may replace
//! the table from another thread at any moment.  The table lives behind an
//! [`ArcSwap`]: a lookup performs one atomic load and therefore sees either
//! the whole old table or the whole new one, never a mix.
//!
//! The table itself is never mutated in place.  A reload builds a complete
//! new [`ActionTable`] and swaps it in.

use std::sync::Arc;

use arc_swap::ArcSwap;
use joykeys_core::{Action, ActionTable};

/// Lock-free holder of the current [`ActionTable`].
#[derive(Debug)]
pub struct ActionRegistry {
    table: ArcSwap<ActionTable>,
}

impl ActionRegistry {
    /// Creates a registry holding `table`.
    pub fn new(table: ActionTable) -> Self {
        Self {
            table: ArcSwap::from_pointee(table),
        }
    }

    /// Returns the action bound to `id`, if any.
    ///
    /// The returned `Arc` stays valid after a later reload.
    pub fn lookup(&self, id: &str) -> Option<Arc<Action>> {
        self.table.load().get(id).cloned()
    }

    /// Replaces the whole table.  Returns the number of mappings it replaced.
    pub fn replace(&self, table: ActionTable) -> usize {
        self.table.swap(Arc::new(table)).len()
    }

    /// Returns the current table.
    pub fn snapshot(&self) -> Arc<ActionTable> {
        self.table.load_full()
    }

    /// Number of mappings in the current table.
    pub fn len(&self) -> usize {
        self.table.load().len()
    }

    /// Returns `true` if the current table has no mappings.
    pub fn is_empty(&self) -> bool {
        self.table.load().is_empty()
    }
}

impl Default for ActionRegistry {
    fn default() -> Self {
        Self::new(ActionTable::new())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use joykeys_core::{ActionStep, CanonicalEventId, KeyRef};
    use std::thread;

    fn table_of(entries: &[(&str, char)]) -> ActionTable {
        entries
            .iter()
            .map(|&(id, key)| {
                (
                    CanonicalEventId::new(id),
                    Arc::new(Action::new(vec![ActionStep::tap(KeyRef::Char(key))])),
                )
            })
            .collect()
    }

    #[test]
    fn test_lookup_finds_mapped_and_misses_unmapped() {
        let registry = ActionRegistry::new(table_of(&[("HAT_0_up", 'v')]));
        assert!(registry.lookup("HAT_0_up").is_some());
        assert!(registry.lookup("HAT_0_down").is_none());
    }

    #[test]
    fn test_replace_returns_previous_size_and_swaps_contents() {
        // Arrange
        let registry = ActionRegistry::new(table_of(&[("a", 'a'), ("b", 'b')]));

        // Act
        let previous = registry.replace(table_of(&[("c", 'c')]));

        // Assert
        assert_eq!(previous, 2);
        assert_eq!(registry.len(), 1);
        assert!(registry.lookup("a").is_none());
        assert!(registry.lookup("c").is_some());
    }

    #[test]
    fn test_held_action_survives_replace() {
        // Arrange
        let registry = ActionRegistry::new(table_of(&[("HAT_0_up", 'v')]));
        let held = registry.lookup("HAT_0_up").expect("mapped");

        // Act
        registry.replace(ActionTable::new());

        // Assert
        assert!(registry.is_empty());
        assert_eq!(held.steps, vec![ActionStep::tap(KeyRef::Char('v'))]);
    }

    #[test]
    fn test_lookup_never_observes_mixed_tables() {
        // Arrange: table A maps both ids to 'a', table B maps both to 'b'.
        // A reader that looks up both ids from one snapshot must never see
        // one 'a' and one 'b'.
        let table_a = table_of(&[("X", 'a'), ("Y", 'a')]);
        let table_b = table_of(&[("X", 'b'), ("Y", 'b')]);
        let registry = Arc::new(ActionRegistry::new(table_a.clone()));

        // Act
        let writer = {
            let registry = Arc::clone(&registry);
            thread::spawn(move || {
                for i in 0..1000 {
                    let next = if i % 2 == 0 { table_b.clone() } else { table_a.clone() };
                    registry.replace(next);
                }
            })
        };
        let reader = {
            let registry = Arc::clone(&registry);
            thread::spawn(move || {
                for _ in 0..1000 {
                    let snapshot = registry.snapshot();
                    let x = &snapshot.get("X").expect("X mapped").steps[0];
                    let y = &snapshot.get("Y").expect("Y mapped").steps[0];
                    assert_eq!(x, y, "snapshot mixed two tables");
                    assert!(registry.lookup("X").is_some());
                }
            })
        };

        // Assert
        writer.join().expect("writer panicked");
        reader.join().expect("reader panicked");
        assert_eq!(registry.len(), 2);
    }
}
