//! Render/debug logging helpers.
//!
//! Output goes through `tracing`; the embedder installs the subscriber. The two render channels
//! are additionally gated by `TAPE_PROMPT_DEBUG` and `TAPE_PROMPT_DEBUG_REDRAW`.

use crate::config::env_config;

pub const RENDER_TARGET: &str = "tape_prompt::render";

pub fn tui_debug_enabled() -> bool {
    env_config().tui_debug
}

pub fn debug_redraw_enabled() -> bool {
    env_config().debug_redraw
}

/// Per-frame renderer state worth logging.
#[derive(Debug)]
pub struct RenderDebugInfo<'a> {
    pub first_changed: Option<usize>,
    pub final_cursor_row: usize,
    pub top_coordinate: usize,
    pub height: usize,
    pub new_lines: &'a [String],
    pub previous_lines: &'a [String],
    pub buffer: &'a str,
}

pub fn log_tui_debug(info: &RenderDebugInfo<'_>) {
    tracing::debug!(
        target: RENDER_TARGET,
        first_changed = ?info.first_changed,
        final_cursor_row = info.final_cursor_row,
        top_coordinate = info.top_coordinate,
        height = info.height,
        new_lines = info.new_lines.len(),
        previous_lines = info.previous_lines.len(),
        bytes = info.buffer.len(),
        "frame rendered"
    );
}

pub fn log_debug_redraw(reason: &str, previous_lines: usize, new_lines: usize, height: usize) {
    tracing::debug!(
        target: RENDER_TARGET,
        reason,
        previous_lines,
        new_lines,
        height,
        "full redraw"
    );
}
