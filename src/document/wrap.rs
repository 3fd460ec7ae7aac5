//! Word wrapping for the document layout.

use crate::core::text::width::{char_width, chars_width};

/// One visual row of the wrapped document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrappedLine {
    /// Offset of the first character of this row in the document text.
    pub start_index: usize,
    /// Characters of this row. A hard line break stays at the end of its row.
    pub content: String,
    /// True when this row continues the logical line of the previous row.
    pub is_line_continuation: bool,
}

impl WrappedLine {
    fn new(start_index: usize, chars: &[char], is_line_continuation: bool) -> Self {
        Self {
            start_index,
            content: chars.iter().collect(),
            is_line_continuation,
        }
    }

    pub fn char_len(&self) -> usize {
        self.content.chars().count()
    }

    /// Length of the row without trailing whitespace (including the line break).
    pub fn trimmed_len(&self) -> usize {
        self.content.trim_end().chars().count()
    }

    pub fn ends_with_newline(&self) -> bool {
        self.content.ends_with('\n')
    }
}

/// Row/column position of the caret inside the wrapped layout. `column` counts characters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Cursor {
    pub row: usize,
    pub column: usize,
}

/// Wrap `text` into rows of at most `width` display columns.
///
/// Rows break after a whitespace run where possible and hard-break words wider than the row.
/// A width of 0 is treated as 1. There is always at least one row; a trailing empty row is
/// added when the text ends with a line break or its last row is full, so the caret at the end
/// of the text has a row to sit on.
pub fn word_wrap(text: &[char], width: usize) -> Vec<WrappedLine> {
    let width = width.max(1);
    let mut lines = Vec::new();

    let mut line_start = 0;
    while line_start < text.len() {
        let line_end = text[line_start..]
            .iter()
            .position(|&ch| ch == '\n')
            .map(|offset| line_start + offset + 1)
            .unwrap_or(text.len());
        wrap_logical_line(text, line_start, line_end, width, &mut lines);
        line_start = line_end;
    }

    let needs_trailing_row = match lines.last() {
        None => true,
        Some(last) => {
            last.ends_with_newline() || visible_row_width(last) >= width
        }
    };
    if needs_trailing_row {
        let is_line_continuation = lines.last().is_some_and(|last| !last.ends_with_newline());
        lines.push(WrappedLine::new(text.len(), &[], is_line_continuation));
    }

    lines
}

fn visible_row_width(line: &WrappedLine) -> usize {
    line.content.chars().map(char_width).sum()
}

fn wrap_logical_line(
    text: &[char],
    start: usize,
    end: usize,
    width: usize,
    lines: &mut Vec<WrappedLine>,
) {
    let line = &text[start..end];
    if chars_width(line) <= width {
        lines.push(WrappedLine::new(start, line, false));
        return;
    }

    let mut chunk_start = 0usize;
    let mut current_width = 0usize;
    let mut wrap_opp_index: Option<usize> = None;
    let mut wrap_opp_width = 0usize;

    for (idx, &ch) in line.iter().enumerate() {
        let ch_width = char_width(ch);

        if current_width + ch_width > width {
            if let Some(opp) = wrap_opp_index {
                lines.push(WrappedLine::new(
                    start + chunk_start,
                    &line[chunk_start..opp],
                    chunk_start > 0,
                ));
                chunk_start = opp;
                current_width = current_width.saturating_sub(wrap_opp_width);
            }
            // A wide character can still overflow the row left after the soft break.
            if current_width + ch_width > width && chunk_start < idx {
                lines.push(WrappedLine::new(
                    start + chunk_start,
                    &line[chunk_start..idx],
                    chunk_start > 0,
                ));
                chunk_start = idx;
                current_width = 0;
            }
            wrap_opp_index = None;
        }

        current_width += ch_width;

        if ch.is_whitespace() {
            if let Some(&next) = line.get(idx + 1) {
                if !next.is_whitespace() {
                    wrap_opp_index = Some(idx + 1);
                    wrap_opp_width = current_width;
                }
            }
        }
    }

    lines.push(WrappedLine::new(
        start + chunk_start,
        &line[chunk_start..],
        chunk_start > 0,
    ));
}

/// Locate `caret` in `lines`: the last row starting at or before it.
pub fn cursor_for_caret(lines: &[WrappedLine], caret: usize) -> Cursor {
    let row = lines
        .iter()
        .rposition(|line| line.start_index <= caret)
        .unwrap_or(0);
    let column = lines
        .get(row)
        .map(|line| caret.saturating_sub(line.start_index))
        .unwrap_or(0);
    Cursor { row, column }
}

#[cfg(test)]
mod tests {
    use super::{cursor_for_caret, word_wrap, Cursor};

    fn chars(text: &str) -> Vec<char> {
        text.chars().collect()
    }

    fn contents(text: &str, width: usize) -> Vec<String> {
        word_wrap(&chars(text), width)
            .into_iter()
            .map(|line| line.content)
            .collect()
    }

    #[test]
    fn breaks_long_words() {
        assert_eq!(contents("abcdefgh", 3), vec!["abc", "def", "gh"]);
    }

    #[test]
    fn breaks_after_whitespace() {
        assert_eq!(contents("hello big world", 10), vec!["hello big ", "world"]);
    }

    #[test]
    fn keeps_newline_at_end_of_row() {
        let lines = word_wrap(&chars("ab\ncd"), 10);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].content, "ab\n");
        assert_eq!(lines[1].start_index, 3);
        assert!(!lines[1].is_line_continuation);
    }

    #[test]
    fn trailing_newline_adds_empty_row() {
        let lines = word_wrap(&chars("ab\n"), 10);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1].start_index, 3);
        assert_eq!(lines[1].content, "");
    }

    #[test]
    fn full_last_row_adds_continuation_row() {
        let lines = word_wrap(&chars("abc"), 3);
        assert_eq!(lines.len(), 2);
        assert!(lines[1].is_line_continuation);
        assert_eq!(cursor_for_caret(&lines, 3), Cursor { row: 1, column: 0 });
    }

    #[test]
    fn empty_text_has_one_row() {
        let lines = word_wrap(&[], 5);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].start_index, 0);
    }

    #[test]
    fn zero_width_wraps_one_char_per_row() {
        assert_eq!(contents("abc", 0), vec!["a", "b", "c", ""]);
    }

    #[test]
    fn rows_join_back_to_text() {
        let samples = [
            "",
            "plain",
            "two words here and there",
            "multi\nline\n\ntext with  double  spaces",
            "wide 你好世界 chars",
            "trailing\n",
        ];
        for sample in samples {
            for width in 1..12 {
                let joined: String = contents(sample, width).concat();
                assert_eq!(joined, sample, "width {width}");
            }
        }
    }

    #[test]
    fn wide_chars_never_overflow_the_row() {
        assert_eq!(contents(" x你你", 4), vec![" ", "x你", "你"]);

        let samples = [" x你你", "wide 你好世界 chars", "a 你你你 b 你", "你 你你 x"];
        for sample in samples {
            for width in 2..12 {
                for line in word_wrap(&chars(sample), width) {
                    let row_width = super::visible_row_width(&line);
                    assert!(row_width <= width, "{sample:?} width {width}: {:?}", line.content);
                }
            }
        }
    }

    #[test]
    fn wrapping_is_stable() {
        let text = chars("the quick brown fox\njumps over");
        assert_eq!(word_wrap(&text, 7), word_wrap(&text, 7));
    }

    #[test]
    fn cursor_follows_row_starts() {
        let lines = word_wrap(&chars("ab\ncd"), 10);
        assert_eq!(cursor_for_caret(&lines, 0), Cursor { row: 0, column: 0 });
        assert_eq!(cursor_for_caret(&lines, 2), Cursor { row: 0, column: 2 });
        assert_eq!(cursor_for_caret(&lines, 3), Cursor { row: 1, column: 0 });
        assert_eq!(cursor_for_caret(&lines, 5), Cursor { row: 1, column: 2 });
    }
}
