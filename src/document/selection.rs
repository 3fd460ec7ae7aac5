//! Shift-selection state machine.
//!
//! The document is either unanchored (no selection) or anchored at the caret position where a
//! shift-modified navigation began. Replace-selection on edits is left to the key dispatcher.

use crate::core::input::KeyEvent;
use crate::document::Document;

/// Half-open selected range `[start, end)` in caret coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionSpan {
    pub start: usize,
    pub end: usize,
}

impl SelectionSpan {
    pub fn new(anchor: usize, caret: usize) -> Self {
        Self {
            start: anchor.min(caret),
            end: anchor.max(caret),
        }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn contains(&self, index: usize) -> bool {
        self.start <= index && index < self.end
    }
}

/// Key-down phase: runs before the caret motion of a navigation key.
pub fn on_key_down(document: &mut Document, key: &KeyEvent) {
    if key.handled || !key.key.is_navigation() {
        return;
    }
    if key.modifiers.shift() {
        if !document.is_anchored() {
            let caret = document.caret();
            document.set_anchor(caret);
        }
    } else {
        document.clear_selection();
    }
}

/// Key-up phase: an anchored selection that has shrunk to nothing is dropped.
pub fn on_key_up(document: &mut Document) {
    if document.is_anchored() && document.selection().is_none() {
        document.clear_selection();
    }
}
