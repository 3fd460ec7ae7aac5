//! Highlight provider protocol and span resolution.

use futures_util::future::BoxFuture;

use crate::core::callbacks::CallbackResult;
use crate::core::text::ansi::ConsoleFormat;

/// Formatting applied to `length` characters starting at `start_index`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatSpan {
    pub start_index: usize,
    pub length: usize,
    pub format: ConsoleFormat,
}

impl FormatSpan {
    pub fn new(start_index: usize, length: usize, format: ConsoleFormat) -> Self {
        Self {
            start_index,
            length,
            format,
        }
    }
}

/// Produces highlight spans for the full text.
pub trait HighlightProvider: Send + Sync {
    fn highlight(&self, text: &str) -> BoxFuture<'static, CallbackResult<Vec<FormatSpan>>>;
}

impl<F> HighlightProvider for F
where
    F: Fn(&str) -> BoxFuture<'static, CallbackResult<Vec<FormatSpan>>> + Send + Sync,
{
    fn highlight(&self, text: &str) -> BoxFuture<'static, CallbackResult<Vec<FormatSpan>>> {
        self(text)
    }
}

/// Per-character formats for a text of `len` characters. The first span covering a character
/// wins; spans past the end are clipped.
pub fn resolve_formats(spans: &[FormatSpan], len: usize) -> Vec<Option<ConsoleFormat>> {
    let mut formats = vec![None; len];
    for span in spans {
        let start = span.start_index.min(len);
        let end = span.start_index.saturating_add(span.length).min(len);
        for slot in &mut formats[start..end] {
            if slot.is_none() {
                *slot = Some(span.format);
            }
        }
    }
    formats
}
