//! Linear undo/redo history of whole-document snapshots.

/// Maximum number of undo states to keep by default.
pub const DEFAULT_MAX_HISTORY: usize = 100;

/// A linear snapshot stack with a cursor.
///
/// `entries[0]` is the oldest kept state and `entries[index]` is the state
/// currently shown. Pushing after an undo drops everything past the cursor.
#[derive(Debug, Clone)]
pub struct History<T> {
    entries: Vec<T>,
    index: usize,
    max_entries: usize,
}

impl<T: Clone> History<T> {
    /// Start a history at `initial`.
    pub fn new(initial: T) -> Self {
        Self::with_limit(initial, DEFAULT_MAX_HISTORY)
    }

    /// Start a history that keeps at most `max_entries` states (at least one).
    pub fn with_limit(initial: T, max_entries: usize) -> Self {
        Self {
            entries: vec![initial],
            index: 0,
            max_entries: max_entries.max(1),
        }
    }

    /// Record a new state, discarding the redo branch.
    pub fn push(&mut self, state: T) {
        self.entries.truncate(self.index + 1);
        self.entries.push(state);

        if self.entries.len() > self.max_entries {
            let overflow = self.entries.len() - self.max_entries;
            self.entries.drain(..overflow);
        }
        self.index = self.entries.len() - 1;
    }

    /// Step back. Returns the state to restore, or `None` at the start.
    pub fn undo(&mut self) -> Option<&T> {
        if self.index == 0 {
            return None;
        }
        self.index -= 1;
        self.entries.get(self.index)
    }

    /// Step forward. Returns the state to restore, or `None` at the end.
    pub fn redo(&mut self) -> Option<&T> {
        if self.index + 1 >= self.entries.len() {
            return None;
        }
        self.index += 1;
        self.entries.get(self.index)
    }

    /// The state at the cursor.
    pub fn current(&self) -> &T {
        &self.entries[self.index]
    }

    pub fn can_undo(&self) -> bool {
        self.index > 0
    }

    pub fn can_redo(&self) -> bool {
        self.index + 1 < self.entries.len()
    }

    /// Cursor position.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Number of kept states.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Forget everything and start over at `initial`.
    pub fn reset(&mut self, initial: T) {
        self.entries.clear();
        self.entries.push(initial);
        self.index = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_undo_redo_symmetry() {
        let mut history = History::new(0);
        for n in 1..=5 {
            history.push(n);
        }
        for _ in 0..5 {
            assert!(history.undo().is_some());
        }
        assert_eq!(*history.current(), 0);
        assert!(!history.can_undo());
        assert!(history.undo().is_none());
    }

    #[test]
    fn test_redo_restores_state_before_undo() {
        let mut history = History::new("a");
        history.push("b");
        history.push("c");

        assert_eq!(history.undo(), Some(&"b"));
        assert_eq!(history.redo(), Some(&"c"));
        assert!(history.redo().is_none());
    }

    #[test]
    fn test_push_after_undo_truncates_redo_branch() {
        let mut history = History::new(0);
        history.push(1);
        history.push(2);
        history.undo();
        history.undo();
        assert!(history.can_redo());

        history.push(10);
        assert!(!history.can_redo());
        assert_eq!(history.len(), 2);
        assert_eq!(history.undo(), Some(&0));
    }

    #[test]
    fn test_limit_drops_oldest() {
        let mut history = History::with_limit(0, 3);
        for n in 1..=5 {
            history.push(n);
        }
        assert_eq!(history.len(), 3);
        assert_eq!(*history.current(), 5);
        history.undo();
        history.undo();
        assert_eq!(*history.current(), 3);
        assert!(!history.can_undo());
    }

    #[test]
    fn test_reset() {
        let mut history = History::new(1);
        history.push(2);
        history.reset(7);
        assert_eq!(history.len(), 1);
        assert_eq!(*history.current(), 7);
        assert!(!history.can_redo());
    }
}
