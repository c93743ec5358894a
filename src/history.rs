//! Undo/redo history over graph snapshots.
//!
//! Two bounded stacks of full `{nodes, edges}` snapshots. A snapshot is
//! taken synchronously before every structural mutation, so an undo or
//! redo is always a complete swap and never a partial application.

use std::collections::VecDeque;

use crate::graph::Graph;

/// Default maximum depth of each stack; oldest snapshots are evicted.
pub const DEFAULT_CAPACITY: usize = 50;

/// Bounded undo/redo stacks of graph snapshots.
#[derive(Debug, Clone, Default)]
pub struct History {
    undo: VecDeque<Graph>,
    redo: VecDeque<Graph>,
    capacity: usize,
}

impl History {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            undo: VecDeque::new(),
            redo: VecDeque::new(),
            capacity: capacity.max(1),
        }
    }

    /// Record the current live state. Must be called before the mutation
    /// it protects. Any fresh snapshot invalidates the redo path.
    pub fn snapshot(
        &mut self,
        live: &Graph,
    ) {
        if self.undo.len() == self.capacity {
            self.undo.pop_front();
        }
        self.undo.push_back(live.clone());
        self.redo.clear();
    }

    /// Swap the live state with the top undo snapshot. No-op when the
    /// undo stack is empty; returns whether a swap happened.
    pub fn undo(
        &mut self,
        live: &mut Graph,
    ) -> bool {
        let Some(previous) = self.undo.pop_back() else {
            return false;
        };
        if self.redo.len() == self.capacity {
            self.redo.pop_front();
        }
        self.redo.push_back(std::mem::replace(live, previous));
        true
    }

    /// Swap the live state with the top redo snapshot. No-op when the
    /// redo stack is empty; returns whether a swap happened.
    pub fn redo(
        &mut self,
        live: &mut Graph,
    ) -> bool {
        let Some(next) = self.redo.pop_back() else {
            return false;
        };
        if self.undo.len() == self.capacity {
            self.undo.pop_front();
        }
        self.undo.push_back(std::mem::replace(live, next));
        true
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }
}
