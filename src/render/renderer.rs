//! Diff renderer.
//!
//! Frame rows are drawn from window row `top` downwards. Every cursor movement is relative to
//! the hardware cursor, so the renderer only tracks which frame row the cursor sits on. Moving
//! below the last window row is done with `\r\n`, which scrolls the window and shifts `top` up.

use crate::core::output::{encode, TerminalCmd};
use crate::core::text::width::visible_width;
use crate::logging::{
    debug_redraw_enabled, log_debug_redraw, log_tui_debug, tui_debug_enabled, RenderDebugInfo,
};
use crate::render::frame::{Frame, ScreenPosition};

/// Terminal geometry sampled before each frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: usize,
    pub height: usize,
    /// Buffer row shown at the top of the window.
    pub window_top: usize,
}

#[derive(Debug, Clone)]
struct Pass {
    top: usize,
    hardware_row: usize,
    height: usize,
    cmds: Vec<TerminalCmd>,
}

impl Pass {
    fn move_to_row(&mut self, target: usize) {
        if target < self.hardware_row {
            self.cmds.push(TerminalCmd::MoveUp(self.hardware_row - target));
            self.hardware_row = target;
            return;
        }
        let mut remaining = target - self.hardware_row;
        let window_row = self.top + self.hardware_row;
        let room = self.height.saturating_sub(1).saturating_sub(window_row);
        let down = remaining.min(room);
        if down > 0 {
            self.cmds.push(TerminalCmd::MoveDown(down));
            self.hardware_row += down;
            remaining -= down;
        }
        for _ in 0..remaining {
            self.new_line();
        }
    }

    fn new_line(&mut self) {
        self.cmds.push(TerminalCmd::NewLine);
        if self.top + self.hardware_row + 1 >= self.height {
            self.top = self.top.saturating_sub(1);
        }
        self.hardware_row += 1;
    }

    fn place_cursor(&mut self, position: ScreenPosition) {
        self.move_to_row(position.row);
        self.cmds.push(TerminalCmd::ColumnAbs(position.column + 1));
    }
}

#[derive(Debug, Clone)]
pub struct DiffRenderer {
    top: usize,
    hardware_row: usize,
    previous_lines: Vec<String>,
    previous_content_rows: usize,
    previous_cursor: Option<ScreenPosition>,
    previous_viewport: Option<Viewport>,
}

impl DiffRenderer {
    /// `top` is the window row the prompt starts on.
    pub fn new(top: usize) -> Self {
        Self {
            top,
            hardware_row: 0,
            previous_lines: Vec::new(),
            previous_content_rows: 0,
            previous_cursor: None,
            previous_viewport: None,
        }
    }

    /// Window row of the first frame row.
    pub fn top(&self) -> usize {
        self.top
    }

    pub fn previous_lines(&self) -> &[String] {
        &self.previous_lines
    }

    pub fn render(
        &mut self,
        frame: Frame,
        viewport: Viewport,
        clear_screen: bool,
    ) -> Vec<TerminalCmd> {
        let content_rows = frame.content_rows();
        let cursor = frame.cursor();
        let lines = frame.into_strings();
        let target = cursor.unwrap_or_else(|| ScreenPosition {
            row: lines.len().saturating_sub(1),
            column: lines.last().map(|line| visible_width(line)).unwrap_or(0),
        });

        let reason = self.full_redraw_reason(viewport, clear_screen);
        self.follow_viewport(viewport);

        let pass = match reason {
            Some(reason) => {
                if debug_redraw_enabled() {
                    log_debug_redraw(&reason, self.previous_lines.len(), lines.len(), viewport.height);
                }
                self.full_pass(&lines, target, viewport.height, clear_screen)
            }
            None => {
                let diff = self.diff_pass(&lines, target, viewport.height);
                let full = self.full_pass(&lines, target, viewport.height, false);
                if encode(&diff.cmds).len() > encode(&full.cmds).len() {
                    if debug_redraw_enabled() {
                        log_debug_redraw(
                            "diff larger than full redraw",
                            self.previous_lines.len(),
                            lines.len(),
                            viewport.height,
                        );
                    }
                    full
                } else {
                    diff
                }
            }
        };

        if tui_debug_enabled() {
            let first_changed = (0..lines.len().max(self.previous_lines.len()))
                .find(|&row| lines.get(row) != self.previous_lines.get(row));
            log_tui_debug(&RenderDebugInfo {
                first_changed,
                final_cursor_row: pass.hardware_row,
                top_coordinate: pass.top,
                height: viewport.height,
                new_lines: &lines,
                previous_lines: &self.previous_lines,
                buffer: &encode(&pass.cmds),
            });
        }

        self.top = pass.top;
        self.hardware_row = pass.hardware_row;
        self.previous_lines = lines;
        self.previous_content_rows = content_rows;
        self.previous_cursor = Some(target);
        self.previous_viewport = Some(viewport);
        pass.cmds
    }

    /// Leave the prompt: move below the content, erase overlay rows and start a fresh line.
    /// The next `render` starts a new prompt on that line.
    pub fn finish(&mut self, height: usize) -> Vec<TerminalCmd> {
        let mut pass = self.pass(height);
        if !self.previous_lines.is_empty() {
            pass.move_to_row(self.previous_content_rows.saturating_sub(1));
            pass.new_line();
        }
        pass.cmds.push(TerminalCmd::ClearToEndOfScreen);

        self.top = (pass.top + pass.hardware_row).min(height.saturating_sub(1));
        self.hardware_row = 0;
        self.previous_lines.clear();
        self.previous_content_rows = 0;
        self.previous_cursor = None;
        self.previous_viewport = None;
        pass.cmds
    }

    fn pass(&self, height: usize) -> Pass {
        Pass {
            top: self.top,
            hardware_row: self.hardware_row,
            height,
            cmds: Vec::new(),
        }
    }

    fn full_redraw_reason(&self, viewport: Viewport, clear_screen: bool) -> Option<String> {
        let Some(previous) = self.previous_viewport else {
            return Some("first render".to_string());
        };
        if clear_screen {
            return Some("clear screen".to_string());
        }
        if previous.width != viewport.width {
            return Some(format!("width changed ({} -> {})", previous.width, viewport.width));
        }
        if previous.height != viewport.height {
            return Some(format!("height changed ({} -> {})", previous.height, viewport.height));
        }
        if previous.window_top != viewport.window_top {
            return Some(format!(
                "host scrolled ({} -> {})",
                previous.window_top, viewport.window_top
            ));
        }
        None
    }

    /// Re-derive `top` after the host scrolled or resized the window.
    fn follow_viewport(&mut self, viewport: Viewport) {
        if let Some(previous) = self.previous_viewport {
            if viewport.window_top > previous.window_top {
                self.top = self
                    .top
                    .saturating_sub(viewport.window_top - previous.window_top);
            } else {
                self.top += previous.window_top - viewport.window_top;
            }
        }
        let last_row = viewport.height.saturating_sub(1);
        if self.top + self.hardware_row > last_row {
            self.top = last_row.saturating_sub(self.hardware_row);
        }
    }

    fn full_pass(
        &self,
        lines: &[String],
        target: ScreenPosition,
        height: usize,
        clear_screen: bool,
    ) -> Pass {
        let mut pass = self.pass(height);
        if clear_screen {
            pass.cmds.push(TerminalCmd::ClearScreen);
            pass.cmds.push(TerminalCmd::MoveUp(pass.top + pass.hardware_row));
            pass.top = 0;
            pass.hardware_row = 0;
        } else {
            pass.move_to_row(0);
        }
        pass.cmds.push(TerminalCmd::ColumnAbs(1));
        pass.cmds.push(TerminalCmd::ClearToEndOfScreen);
        for (row, line) in lines.iter().enumerate() {
            if row > 0 {
                pass.new_line();
            }
            pass.cmds.push(TerminalCmd::Bytes(line.clone()));
        }
        pass.place_cursor(target);
        pass
    }

    fn diff_pass(&self, lines: &[String], target: ScreenPosition, height: usize) -> Pass {
        let mut pass = self.pass(height);
        let mut changed = false;
        for row in 0..lines.len().max(self.previous_lines.len()) {
            let Some(line) = lines.get(row) else {
                // Everything from here down belongs to rows that no longer exist.
                pass.move_to_row(row);
                pass.cmds.push(TerminalCmd::ColumnAbs(1));
                pass.cmds.push(TerminalCmd::ClearToEndOfScreen);
                changed = true;
                break;
            };
            if self.previous_lines.get(row) == Some(line) {
                continue;
            }
            pass.move_to_row(row);
            pass.cmds.push(TerminalCmd::ColumnAbs(1));
            pass.cmds.push(TerminalCmd::ClearLine);
            pass.cmds.push(TerminalCmd::Bytes(line.clone()));
            changed = true;
        }
        if changed || self.previous_cursor != Some(target) {
            pass.place_cursor(target);
        }
        pass
    }
}

#[cfg(test)]
mod tests {
    use super::{DiffRenderer, Viewport};
    use crate::core::output::encode;
    use crate::render::frame::{Frame, Line, ScreenPosition};
    use pretty_assertions::assert_eq;

    fn frame(lines: &[&str], row: usize, column: usize) -> Frame {
        Frame::new(lines.iter().map(|line| Line::from(line.to_string())).collect())
            .with_cursor(Some(ScreenPosition { row, column }))
    }

    fn viewport(width: usize, height: usize) -> Viewport {
        Viewport {
            width,
            height,
            window_top: 0,
        }
    }

    #[test]
    fn first_frame_is_a_full_redraw() {
        let mut renderer = DiffRenderer::new(0);
        let out = encode(&renderer.render(frame(&["> hi"], 0, 4), viewport(20, 5), false));
        assert_eq!(out, "\x1b[1G\x1b[0J> hi\x1b[5G");
    }

    #[test]
    fn unchanged_frame_writes_nothing() {
        let mut renderer = DiffRenderer::new(0);
        renderer.render(frame(&["> hi"], 0, 4), viewport(20, 5), false);
        let cmds = renderer.render(frame(&["> hi"], 0, 4), viewport(20, 5), false);
        assert!(cmds.is_empty());
    }

    #[test]
    fn only_changed_rows_are_rewritten() {
        let mut renderer = DiffRenderer::new(0);
        renderer.render(frame(&["> a", "  b", "  c"], 2, 3), viewport(20, 10), false);
        let out = encode(&renderer.render(
            frame(&["> a", "  B", "  c"], 2, 3),
            viewport(20, 10),
            false,
        ));
        assert_eq!(out, "\x1b[1A\x1b[1G\x1b[0K  B\x1b[1B\x1b[4G");
    }

    #[test]
    fn closed_overlay_rows_are_erased() {
        let mut renderer = DiffRenderer::new(0);
        let text = "> abcdefghijklmnop";
        let open = frame(&[text], 0, 18).with_overlay(vec![Line::from("  item".to_string())]);
        renderer.render(open, viewport(40, 10), false);
        let out = encode(&renderer.render(frame(&[text], 0, 18), viewport(40, 10), false));
        assert_eq!(out, "\x1b[1B\x1b[1G\x1b[0J\x1b[1A\x1b[19G");
    }

    #[test]
    fn growing_past_the_bottom_scrolls_the_window() {
        let mut renderer = DiffRenderer::new(4);
        renderer.render(frame(&["> a"], 0, 3), viewport(20, 5), false);
        let out = encode(&renderer.render(frame(&["> a", "  b"], 1, 3), viewport(20, 5), false));
        assert_eq!(out, "\r\n\x1b[1G\x1b[0K  b\x1b[4G");
        assert_eq!(renderer.top(), 3);
    }

    #[test]
    fn width_change_redraws_from_first_row() {
        let mut renderer = DiffRenderer::new(0);
        renderer.render(frame(&["> ab", "  cd"], 1, 4), viewport(20, 10), false);
        let out = encode(&renderer.render(frame(&["> abcd"], 0, 6), viewport(30, 10), false));
        assert_eq!(out, "\x1b[1A\x1b[1G\x1b[0J> abcd\x1b[7G");
    }

    #[test]
    fn clear_screen_redraws_at_window_top() {
        let mut renderer = DiffRenderer::new(3);
        renderer.render(frame(&["> x"], 0, 3), viewport(20, 10), false);
        let out = encode(&renderer.render(frame(&["> x"], 0, 3), viewport(20, 10), true));
        assert_eq!(out, "\x1b[2J\x1b[3A\x1b[1G\x1b[0J> x\x1b[4G");
        assert_eq!(renderer.top(), 0);
    }

    #[test]
    fn host_scroll_shifts_top_and_redraws() {
        let mut renderer = DiffRenderer::new(5);
        renderer.render(frame(&["> x"], 0, 3), viewport(20, 10), false);
        let scrolled = Viewport {
            window_top: 2,
            ..viewport(20, 10)
        };
        let out = encode(&renderer.render(frame(&["> x"], 0, 3), scrolled, false));
        assert_eq!(out, "\x1b[1G\x1b[0J> x\x1b[4G");
        assert_eq!(renderer.top(), 3);
    }

    #[test]
    fn finish_moves_below_content_and_clears_overlay() {
        let mut renderer = DiffRenderer::new(0);
        let open = frame(&["> a", "  b"], 0, 3).with_overlay(vec![Line::from("  item".to_string())]);
        renderer.render(open, viewport(20, 10), false);
        let out = encode(&renderer.finish(10));
        assert_eq!(out, "\x1b[1B\r\n\x1b[0J");
        assert_eq!(renderer.top(), 2);
        assert!(renderer.previous_lines().is_empty());
    }
}
