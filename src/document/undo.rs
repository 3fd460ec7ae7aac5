//! Snapshot-based undo/redo history.

/// Immutable copy of the document text and caret taken before an edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub text: Vec<char>,
    pub caret: usize,
}

#[derive(Debug, Default)]
pub struct UndoStack {
    undo: Vec<Snapshot>,
    redo: Vec<Snapshot>,
}

impl UndoStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the state preceding an edit. Any redo history is discarded.
    pub fn record(&mut self, before: Snapshot) {
        self.undo.push(before);
        self.redo.clear();
    }

    /// Pop the most recent snapshot, keeping `current` for redo.
    pub fn undo(&mut self, current: Snapshot) -> Option<Snapshot> {
        let previous = self.undo.pop()?;
        self.redo.push(current);
        Some(previous)
    }

    pub fn redo(&mut self, current: Snapshot) -> Option<Snapshot> {
        let next = self.redo.pop()?;
        self.undo.push(current);
        Some(next)
    }
}
