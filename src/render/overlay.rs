//! Completion popup rendered as trailing overlay rows.

use crate::core::text::ansi::ConsoleFormat;
use crate::core::text::width::{chars_width, truncate_to_width, visible_width};
use crate::document::Document;
use crate::render::frame::{Line, Span};
use crate::widgets::completion_pane::CompletionPane;

pub struct OverlayStyle {
    pub prompt_width: usize,
    /// Terminal width in columns.
    pub width: usize,
    pub item_rows: usize,
    pub description_lines: usize,
    pub selected_format: ConsoleFormat,
}

/// Lines for the open completion list and the selected item's description, at most
/// `max_rows` of them. Rows are indented so the list starts under the word being completed.
pub fn completion_overlay(
    pane: &CompletionPane,
    document: &Document,
    style: &OverlayStyle,
    max_rows: usize,
) -> Vec<Line> {
    if !pane.is_open() || max_rows == 0 || style.width == 0 {
        return Vec::new();
    }
    let items = pane.visible_items(style.item_rows);
    if items.is_empty() {
        return Vec::new();
    }

    let label_width = items
        .iter()
        .map(|(item, _)| visible_width(item.label()))
        .max()
        .unwrap_or(0);
    // One column of padding on each side of the label.
    let box_width = (label_width + 2).min(style.width);
    let indent = word_column(pane, document, style.prompt_width).min(style.width - box_width);
    let prefix = " ".repeat(indent);

    let mut lines = Vec::new();
    for (item, selected) in items {
        let label = truncate_to_width(item.label(), box_width.saturating_sub(2));
        let padding = box_width.saturating_sub(visible_width(&label) + 1);
        let cell = format!(" {label}{}", " ".repeat(padding));
        let mut line = Line::default();
        line.push(Span::new(prefix.clone()));
        if selected {
            line.push(Span::styled(cell, style.selected_format));
        } else {
            line.push(Span::new(cell));
        }
        lines.push(line);
    }

    if let Some(description) = pane.selected_description() {
        let room = style.width - indent;
        for text in description.lines().take(style.description_lines) {
            let mut line = Line::default();
            line.push(Span::new(prefix.clone()));
            line.push(Span::new(truncate_to_width(text, room)));
            lines.push(line);
        }
    }

    lines.truncate(max_rows);
    lines
}

/// Screen column of the completed word's first character.
fn word_column(pane: &CompletionPane, document: &Document, prompt_width: usize) -> usize {
    let Some(start) = pane.start_index() else {
        return prompt_width;
    };
    let lines = document.wrapped_lines();
    let row = lines
        .iter()
        .rposition(|line| line.start_index <= start)
        .unwrap_or(0);
    let row_start = lines.get(row).map(|line| line.start_index).unwrap_or(0);
    let end = start.min(document.len());
    prompt_width + chars_width(&document.chars()[row_start.min(end)..end])
}
