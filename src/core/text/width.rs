//! Display-width helpers.

use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthChar;

use super::ansi::extract_ansi_code;

/// Terminal columns occupied by a single character. Control characters (including the `\n`
/// kept at the end of wrapped lines) occupy no columns.
pub fn char_width(ch: char) -> usize {
    if ch.is_control() {
        return 0;
    }
    UnicodeWidthChar::width(ch).unwrap_or(0)
}

pub fn chars_width(chars: &[char]) -> usize {
    chars.iter().copied().map(char_width).sum()
}

/// Visible width of `input`, ignoring ANSI escape sequences.
pub fn visible_width(input: &str) -> usize {
    if input.is_empty() {
        return 0;
    }

    let mut width = 0;
    let mut idx = 0;
    while idx < input.len() {
        if let Some(ansi) = extract_ansi_code(input, idx) {
            idx += ansi.length;
            continue;
        }
        let Some(ch) = input[idx..].chars().next() else {
            break;
        };
        width += char_width(ch);
        idx += ch.len_utf8();
    }
    width
}

/// Truncate plain text to at most `max_width` columns, never splitting a grapheme.
pub fn truncate_to_width(text: &str, max_width: usize) -> String {
    let mut out = String::new();
    let mut width = 0;
    for grapheme in text.graphemes(true) {
        let g_width: usize = grapheme.chars().map(char_width).sum();
        if width + g_width > max_width {
            break;
        }
        width += g_width;
        out.push_str(grapheme);
    }
    out
}
