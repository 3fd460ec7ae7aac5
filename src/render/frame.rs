//! Typed render model.
//!
//! A [`Frame`] is what the renderer diffs: styled lines, the caret's screen position and the
//! index where overlay rows (completion popup) begin.

use crate::core::text::ansi::{to_ansi_escape_sequence, ConsoleFormat, RESET};

/// A contiguous run of text with one format.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Span {
    text: String,
    format: Option<ConsoleFormat>,
}

impl Span {
    pub fn new(text: String) -> Self {
        Self { text, format: None }
    }

    pub fn styled(text: String, format: ConsoleFormat) -> Self {
        Self {
            text,
            format: (!format.is_plain()).then_some(format),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn format(&self) -> Option<ConsoleFormat> {
        self.format
    }

    fn write_to(&self, out: &mut String) {
        match &self.format {
            Some(format) => {
                out.push_str(&to_ansi_escape_sequence(format));
                out.push_str(&self.text);
                out.push_str(RESET);
            }
            None => out.push_str(&self.text),
        }
    }
}

impl From<String> for Span {
    fn from(text: String) -> Self {
        Self::new(text)
    }
}

impl From<&str> for Span {
    fn from(text: &str) -> Self {
        Self::new(text.to_string())
    }
}

/// A single rendered line.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Line {
    spans: Vec<Span>,
}

impl Line {
    pub fn new(spans: Vec<Span>) -> Self {
        Self { spans }
    }

    pub fn spans(&self) -> &[Span] {
        &self.spans
    }

    pub fn push(&mut self, span: Span) {
        if span.text.is_empty() {
            return;
        }
        if let Some(last) = self.spans.last_mut() {
            if last.format == span.format {
                last.text.push_str(&span.text);
                return;
            }
        }
        self.spans.push(span);
    }

    /// Encode the line, each formatted span wrapped in its SGR sequence and a reset.
    pub fn into_string(self) -> String {
        let mut out = String::new();
        for span in &self.spans {
            span.write_to(&mut out);
        }
        out
    }
}

impl From<String> for Line {
    fn from(text: String) -> Self {
        Self::new(vec![Span::new(text)])
    }
}

/// Caret position relative to the first frame row; `column` is 0-based.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct ScreenPosition {
    pub row: usize,
    pub column: usize,
}

/// A rendered frame (collection of lines).
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Frame {
    lines: Vec<Line>,
    cursor: Option<ScreenPosition>,
    overlay_start: Option<usize>,
}

impl Frame {
    pub fn new(lines: Vec<Line>) -> Self {
        Self {
            lines,
            cursor: None,
            overlay_start: None,
        }
    }

    pub fn with_cursor(mut self, cursor: Option<ScreenPosition>) -> Self {
        self.cursor = cursor;
        self
    }

    /// Append overlay rows after the content rows.
    pub fn with_overlay(mut self, overlay: Vec<Line>) -> Self {
        if !overlay.is_empty() {
            self.overlay_start = Some(self.lines.len());
            self.lines.extend(overlay);
        }
        self
    }

    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    pub fn cursor(&self) -> Option<ScreenPosition> {
        self.cursor
    }

    /// Number of rows before the overlay.
    pub fn content_rows(&self) -> usize {
        self.overlay_start.unwrap_or(self.lines.len())
    }

    pub fn into_strings(self) -> Vec<String> {
        self.lines.into_iter().map(Line::into_string).collect()
    }
}

impl From<Vec<String>> for Frame {
    fn from(lines: Vec<String>) -> Self {
        Self::new(lines.into_iter().map(Line::from).collect())
    }
}
