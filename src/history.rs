use crate::stroke::model::StrokeSet;

/// Default number of snapshots kept.
pub const MAX_HISTORY: usize = 50;

/// Bounded linear undo/redo over stroke-set snapshots.
///
/// Invariant: `index < snapshots.len()` whenever the stack is non-empty.
#[derive(Clone, Debug)]
pub struct HistoryStack {
    snapshots: Vec<StrokeSet>,
    index: usize,
    capacity: usize,
}

impl Default for HistoryStack {
    fn default() -> Self {
        Self::new(MAX_HISTORY)
    }
}

impl HistoryStack {
    /// Empty stack holding at most `capacity` snapshots (at least 1).
    pub fn new(capacity: usize) -> Self {
        Self {
            snapshots: Vec::new(),
            index: 0,
            capacity: capacity.max(1),
        }
    }

    /// Record a copy of `set` as the newest state.
    ///
    /// Any redo entries past the current index are discarded first; the oldest snapshot is
    /// evicted once capacity is exceeded.
    pub fn snapshot(&mut self, set: &StrokeSet) {
        if !self.snapshots.is_empty() {
            self.snapshots.truncate(self.index + 1);
        }
        self.snapshots.push(set.clone());
        if self.snapshots.len() > self.capacity {
            let excess = self.snapshots.len() - self.capacity;
            self.snapshots.drain(..excess);
        }
        self.index = self.snapshots.len() - 1;
    }

    /// Step back one snapshot. `None` at the oldest entry.
    pub fn undo(&mut self) -> Option<StrokeSet> {
        if !self.can_undo() {
            return None;
        }
        self.index -= 1;
        Some(self.snapshots[self.index].clone())
    }

    /// Step forward one snapshot. `None` at the newest entry.
    pub fn redo(&mut self) -> Option<StrokeSet> {
        if !self.can_redo() {
            return None;
        }
        self.index += 1;
        Some(self.snapshots[self.index].clone())
    }

    pub fn can_undo(&self) -> bool {
        !self.snapshots.is_empty() && self.index > 0
    }

    pub fn can_redo(&self) -> bool {
        self.index + 1 < self.snapshots.len()
    }

    pub fn current(&self) -> Option<&StrokeSet> {
        self.snapshots.get(self.index)
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
#[path = "../tests/unit/history.rs"]
mod tests;
