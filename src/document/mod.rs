//! Text document model: buffer, caret, selection, undo history and wrapped layout.
//!
//! Every operation is total. Out-of-range offsets and counts are clamped or ignored so the
//! key dispatch loop never has to handle errors per keystroke.

pub mod selection;
pub mod undo;
pub mod wrap;

use self::undo::{Snapshot, UndoStack};
use self::wrap::{cursor_for_caret, word_wrap};

pub use self::selection::SelectionSpan;
pub use self::wrap::{Cursor, WrappedLine};

#[derive(Debug)]
pub struct Document {
    text: Vec<char>,
    caret: usize,
    anchor: Option<usize>,
    history: UndoStack,
    wrap_width: usize,
    lines: Vec<WrappedLine>,
    cursor: Cursor,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    pub fn new() -> Self {
        let mut document = Self {
            text: Vec::new(),
            caret: 0,
            anchor: None,
            history: UndoStack::new(),
            wrap_width: usize::MAX,
            lines: Vec::new(),
            cursor: Cursor::default(),
        };
        document.rewrap();
        document
    }

    pub fn text(&self) -> String {
        self.text.iter().collect()
    }

    pub fn chars(&self) -> &[char] {
        &self.text
    }

    /// Text in `[start, end)`, clamped to the buffer.
    pub fn slice(&self, start: usize, end: usize) -> String {
        let end = end.min(self.text.len());
        let start = start.min(end);
        self.text[start..end].iter().collect()
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn caret(&self) -> usize {
        self.caret
    }

    pub fn set_caret(&mut self, caret: usize) {
        self.caret = caret.min(self.text.len());
        self.update_cursor();
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    pub fn wrapped_lines(&self) -> &[WrappedLine] {
        &self.lines
    }

    pub fn wrap_width(&self) -> usize {
        self.wrap_width
    }

    // Selection

    pub fn anchor(&self) -> Option<usize> {
        self.anchor
    }

    pub fn is_anchored(&self) -> bool {
        self.anchor.is_some()
    }

    /// Fix the selection anchor at `position` (clamped).
    pub fn set_anchor(&mut self, position: usize) {
        self.anchor = Some(position.min(self.text.len()));
    }

    pub fn clear_selection(&mut self) {
        self.anchor = None;
    }

    /// The selected range, if a non-empty selection is active.
    pub fn selection(&self) -> Option<SelectionSpan> {
        let anchor = self.anchor?;
        let span = SelectionSpan::new(anchor, self.caret);
        (!span.is_empty()).then_some(span)
    }

    pub fn selected_text(&self) -> Option<String> {
        self.selection()
            .map(|span| self.slice(span.start, span.end))
    }

    // Mutation

    /// Insert `content` at the caret and move the caret past it.
    pub fn insert_at_caret(&mut self, content: &str) {
        if content.is_empty() {
            return;
        }
        self.record_undo();
        let inserted: Vec<char> = content.chars().collect();
        let count = inserted.len();
        self.text.splice(self.caret..self.caret, inserted);
        self.caret += count;
        self.anchor = None;
        self.rewrap();
    }

    /// Delete up to `count` characters starting at `start`. Removing past the end truncates.
    /// A caret inside or after the removed range moves to `start`.
    pub fn remove(&mut self, start: usize, count: usize) {
        if count == 0 || start >= self.text.len() {
            return;
        }
        let end = start.saturating_add(count).min(self.text.len());
        self.record_undo();
        self.text.drain(start..end);
        if self.caret > start {
            self.caret = start;
        }
        self.anchor = None;
        self.rewrap();
    }

    /// Remove the selected range and leave the caret at its start. No-op without a selection.
    pub fn delete_selected_text(&mut self) {
        let Some(span) = self.selection() else {
            self.anchor = None;
            return;
        };
        self.remove(span.start, span.len());
        self.set_caret(span.start);
    }

    /// Replace `[start, end)` with `content` as a single undo step.
    pub fn replace_range(&mut self, start: usize, end: usize, content: &str) {
        let end = end.min(self.text.len());
        let start = start.min(end);
        if start == end && content.is_empty() {
            return;
        }
        self.record_undo();
        let inserted: Vec<char> = content.chars().collect();
        let count = inserted.len();
        self.text.splice(start..end, inserted);
        self.caret = start + count;
        self.anchor = None;
        self.rewrap();
    }

    /// Replace the whole buffer, caret at the end. Undoable.
    pub fn set_text(&mut self, content: &str) {
        let len = self.text.len();
        if self.text.iter().copied().eq(content.chars()) {
            self.set_caret(len);
            return;
        }
        self.replace_range(0, len, content);
    }

    pub fn undo(&mut self) {
        let current = self.snapshot();
        if let Some(previous) = self.history.undo(current) {
            self.restore(previous);
        }
    }

    pub fn redo(&mut self) {
        let current = self.snapshot();
        if let Some(next) = self.history.redo(current) {
            self.restore(next);
        }
    }

    // Navigation

    /// Move to the start (`direction < 0`) or end (`direction > 0`) of the visual row
    /// holding the caret.
    pub fn move_to_line_boundary(&mut self, direction: i32) {
        let row = self.cursor.row;
        let Some(line) = self.lines.get(row) else {
            return;
        };
        if direction < 0 {
            self.set_caret(line.start_index);
        } else if direction > 0 {
            let followed_by_continuation = self
                .lines
                .get(row + 1)
                .is_some_and(|next| next.is_line_continuation);
            let mut end = line.start_index + line.char_len();
            if line.ends_with_newline() || followed_by_continuation {
                end = end.saturating_sub(1).max(line.start_index);
            }
            self.set_caret(end);
        }
    }

    pub fn move_to_word_boundary(&mut self, direction: i32) {
        let target = self.calculate_word_boundary_index_near_caret(direction);
        self.set_caret(target);
    }

    /// Forward: skip the whitespace run at the caret, then the following word.
    /// Backward mirrors this.
    pub fn calculate_word_boundary_index_near_caret(&self, direction: i32) -> usize {
        let text = &self.text;
        let mut index = self.caret;
        if direction > 0 {
            while index < text.len() && text[index].is_whitespace() {
                index += 1;
            }
            while index < text.len() && !text[index].is_whitespace() {
                index += 1;
            }
        } else if direction < 0 {
            while index > 0 && text[index - 1].is_whitespace() {
                index -= 1;
            }
            while index > 0 && !text[index - 1].is_whitespace() {
                index -= 1;
            }
        }
        index
    }

    // Layout

    /// Recompute the wrapped layout for `width` columns.
    pub fn word_wrap(&mut self, width: usize) {
        self.wrap_width = width;
        self.rewrap();
    }

    fn rewrap(&mut self) {
        self.lines = word_wrap(&self.text, self.wrap_width);
        self.update_cursor();
    }

    fn update_cursor(&mut self) {
        self.cursor = cursor_for_caret(&self.lines, self.caret);
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot {
            text: self.text.clone(),
            caret: self.caret,
        }
    }

    fn record_undo(&mut self) {
        let snapshot = self.snapshot();
        self.history.record(snapshot);
    }

    fn restore(&mut self, snapshot: Snapshot) {
        self.text = snapshot.text;
        self.caret = snapshot.caret.min(self.text.len());
        self.anchor = None;
        self.rewrap();
    }
}

pub fn is_word_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_'
}
