//! Code rows of the frame: prompt prefix, highlighting, selection and caret position.

use crate::core::text::ansi::ConsoleFormat;
use crate::core::text::width::{char_width, visible_width};
use crate::document::{Document, SelectionSpan};
use crate::render::frame::{Line, ScreenPosition, Span};

/// Vertical scroll state of the code area.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CodeView {
    scroll_offset: usize,
}

impl CodeView {
    pub fn scroll_offset(&self) -> usize {
        self.scroll_offset
    }

    /// Adjust the offset so `caret_row` lies within `visible_rows` rows.
    pub fn scroll_to_caret(&mut self, caret_row: usize, total_rows: usize, visible_rows: usize) {
        let visible_rows = visible_rows.max(1);
        if caret_row < self.scroll_offset {
            self.scroll_offset = caret_row;
        } else if caret_row >= self.scroll_offset + visible_rows {
            self.scroll_offset = caret_row + 1 - visible_rows;
        }
        let max_offset = total_rows.saturating_sub(visible_rows);
        self.scroll_offset = self.scroll_offset.min(max_offset);
    }

    /// Rows currently shown, as a range of wrapped-row indices.
    pub fn visible_range(&self, total_rows: usize, visible_rows: usize) -> std::ops::Range<usize> {
        let start = self.scroll_offset.min(total_rows);
        let end = (start + visible_rows.max(1)).min(total_rows);
        start..end
    }
}

pub struct CodeStyle<'a> {
    pub prompt: &'a str,
    pub selection_format: ConsoleFormat,
    /// Per-character highlight formats, indexed like the document text.
    pub formats: &'a [Option<ConsoleFormat>],
}

/// Render the wrapped rows in `rows`. Returns the lines and the caret position relative to the
/// first returned line, if the caret row is among them.
pub fn render_code_rows(
    document: &Document,
    style: &CodeStyle<'_>,
    rows: std::ops::Range<usize>,
) -> (Vec<Line>, Option<ScreenPosition>) {
    let prompt_width = visible_width(style.prompt);
    let continuation_prefix = " ".repeat(prompt_width);
    let selection = document.selection();
    let cursor = document.cursor();
    let first_row = rows.start;

    let mut lines = Vec::new();
    let mut caret = None;
    for (row, wrapped) in document
        .wrapped_lines()
        .iter()
        .enumerate()
        .skip(rows.start)
        .take(rows.len())
    {
        let mut line = Line::default();
        if row == 0 {
            line.push(Span::from(style.prompt));
        } else {
            line.push(Span::from(continuation_prefix.as_str()));
        }

        let mut column = prompt_width;
        for (offset, ch) in wrapped.content.chars().enumerate() {
            if offset == cursor.column && row == cursor.row {
                caret = Some(ScreenPosition {
                    row: row - first_row,
                    column,
                });
            }
            if ch == '\n' {
                continue;
            }
            let index = wrapped.start_index + offset;
            let format = char_format(index, selection, style);
            let mut buf = [0u8; 4];
            let text = ch.encode_utf8(&mut buf).to_string();
            match format {
                Some(format) => line.push(Span::styled(text, format)),
                None => line.push(Span::new(text)),
            }
            column += char_width(ch);
        }
        if row == cursor.row && caret.is_none() {
            caret = Some(ScreenPosition {
                row: row - first_row,
                column,
            });
        }
        lines.push(line);
    }

    (lines, caret)
}

fn char_format(
    index: usize,
    selection: Option<SelectionSpan>,
    style: &CodeStyle<'_>,
) -> Option<ConsoleFormat> {
    if selection.is_some_and(|span| span.contains(index)) {
        return Some(style.selection_format);
    }
    style.formats.get(index).copied().flatten()
}

#[cfg(test)]
mod tests {
    use super::{render_code_rows, CodeStyle, CodeView};
    use crate::core::text::ansi::{AnsiColor, ConsoleFormat};
    use crate::document::Document;
    use crate::render::frame::ScreenPosition;

    fn document(text: &str, width: usize) -> Document {
        let mut document = Document::new();
        document.word_wrap(width);
        document.insert_at_caret(text);
        document
    }

    #[test]
    fn prompt_prefixes_first_row_and_indents_the_rest() {
        let document = document("ab\ncd", 20);
        let style = CodeStyle {
            prompt: "> ",
            selection_format: ConsoleFormat::inverted(),
            formats: &[],
        };
        let (lines, caret) = render_code_rows(&document, &style, 0..2);
        let lines: Vec<String> = lines.into_iter().map(|l| l.into_string()).collect();
        assert_eq!(lines, vec!["> ab", "  cd"]);
        assert_eq!(caret, Some(ScreenPosition { row: 1, column: 4 }));
    }

    #[test]
    fn selection_overrides_highlight() {
        let mut document = document("abc", 20);
        document.set_anchor(0);
        document.set_caret(2);
        let red = ConsoleFormat::foreground(AnsiColor::Red);
        let formats = vec![Some(red); 3];
        let style = CodeStyle {
            prompt: "",
            selection_format: ConsoleFormat::inverted(),
            formats: &formats,
        };
        let (lines, caret) = render_code_rows(&document, &style, 0..1);
        assert_eq!(
            lines[0].clone().into_string(),
            "\x1b[39;49;7mab\x1b[0m\x1b[31;49mc\x1b[0m"
        );
        assert_eq!(caret, Some(ScreenPosition { row: 0, column: 2 }));
    }

    #[test]
    fn scroll_follows_caret() {
        let mut view = CodeView::default();
        view.scroll_to_caret(7, 10, 3);
        assert_eq!(view.scroll_offset(), 5);
        assert_eq!(view.visible_range(10, 3), 5..8);
        view.scroll_to_caret(2, 10, 3);
        assert_eq!(view.scroll_offset(), 2);
        view.scroll_to_caret(0, 2, 3);
        assert_eq!(view.scroll_offset(), 0);
    }
}
