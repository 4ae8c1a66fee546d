//! History Manager - bounded linear undo/redo over full snapshots

use std::collections::VecDeque;

use tracing::debug;

use crate::model::CardState;
use crate::types::CardId;

/// Snapshot stack with a cursor on the current state
#[derive(Debug, Clone)]
pub struct History {
    snapshots: VecDeque<CardState>,
    cursor: usize,
    capacity: usize,
}

impl History {
    /// Start a history whose current state is `initial`
    pub fn new(initial: CardState, capacity: usize) -> Self {
        let mut snapshots = VecDeque::with_capacity(capacity.max(1));
        snapshots.push_back(initial);
        Self {
            snapshots,
            cursor: 0,
            capacity: capacity.max(1),
        }
    }

    pub fn current(&self) -> &CardState {
        &self.snapshots[self.cursor]
    }

    /// Number of retained snapshots
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.snapshots.len()
    }

    /// Record a new current state.
    ///
    /// Drops the redo tail, ignores a state equal to the current one and
    /// evicts the oldest snapshot at capacity. Returns whether it was recorded.
    pub fn push(&mut self, state: CardState) -> bool {
        if *self.current() == state {
            return false;
        }
        self.snapshots.truncate(self.cursor + 1);
        self.snapshots.push_back(state);
        if self.snapshots.len() > self.capacity {
            self.snapshots.pop_front();
        }
        self.cursor = self.snapshots.len() - 1;
        debug!(cursor = self.cursor, len = self.snapshots.len(), "History push");
        true
    }

    /// Step back; `None` at the oldest snapshot
    pub fn undo(&mut self) -> Option<&CardState> {
        if !self.can_undo() {
            return None;
        }
        self.cursor -= 1;
        Some(&self.snapshots[self.cursor])
    }

    /// Step forward; `None` at the newest snapshot
    pub fn redo(&mut self) -> Option<&CardState> {
        if !self.can_redo() {
            return None;
        }
        self.cursor += 1;
        Some(&self.snapshots[self.cursor])
    }

    /// Record a persistence id on every snapshot.
    ///
    /// Being saved is not an edit, so undo must not drop the id.
    pub fn stamp_card_id(&mut self, id: &CardId) {
        for snapshot in self.snapshots.iter_mut() {
            snapshot.card_id = Some(id.clone());
        }
    }

    /// Forget everything and start over from `state`
    pub fn reset(&mut self, state: CardState) {
        self.snapshots.clear();
        self.snapshots.push_back(state);
        self.cursor = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn named(name: &str) -> CardState {
        let mut state = CardState::default();
        state.set_input("name", name);
        state
    }

    #[test]
    fn test_undo_redo_walk() {
        let mut history = History::new(named("a"), 10);
        history.push(named("b"));
        history.push(named("c"));

        assert_eq!(history.undo(), Some(&named("b")));
        assert_eq!(history.undo(), Some(&named("a")));
        assert_eq!(history.undo(), None);
        assert_eq!(history.redo(), Some(&named("b")));
    }

    #[test]
    fn test_push_after_undo_truncates_redo() {
        let mut history = History::new(named("a"), 10);
        history.push(named("b"));
        history.undo();
        history.push(named("x"));
        assert!(!history.can_redo());
        assert_eq!(history.len(), 2);
        assert_eq!(history.current(), &named("x"));
    }

    #[test]
    fn test_duplicate_push_is_ignored() {
        let mut history = History::new(named("a"), 10);
        assert!(!history.push(named("a")));
        assert_eq!(history.len(), 1);
    }

    #[test]
    fn test_capacity_evicts_oldest() {
        let mut history = History::new(named("0"), 3);
        for i in 1..=5 {
            history.push(named(&i.to_string()));
        }
        assert_eq!(history.len(), 3);
        history.undo();
        history.undo();
        assert_eq!(history.current(), &named("3"));
        assert_eq!(history.undo(), None);
    }

    #[test]
    fn test_redo_at_end_is_noop() {
        let mut history = History::new(named("a"), 2);
        assert_eq!(history.redo(), None);
        assert_eq!(history.current(), &named("a"));
    }
}
