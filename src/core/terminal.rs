//! Terminal output boundary.

/// What the prompt needs from a terminal: a byte sink plus geometry queries.
///
/// Raw-mode setup and input reading belong to the embedder.
pub trait Terminal {
    /// Write output to the terminal.
    fn write(&mut self, data: &str);

    /// Width of the screen buffer in columns.
    fn columns(&self) -> u16;

    /// Height of the visible window in rows.
    fn rows(&self) -> u16;

    /// Buffer row currently shown at the top of the window. Terminals that cannot report
    /// scrollback position return 0.
    fn window_top(&self) -> usize {
        0
    }

    /// Window row holding the cursor when the prompt starts.
    fn cursor_top(&self) -> usize {
        0
    }
}

/// In-memory terminal that records everything written to it.
#[derive(Debug, Clone)]
pub struct MemoryTerminal {
    output: String,
    columns: u16,
    rows: u16,
    window_top: usize,
    cursor_top: usize,
}

impl MemoryTerminal {
    pub fn new(columns: u16, rows: u16) -> Self {
        Self {
            output: String::new(),
            columns,
            rows,
            window_top: 0,
            cursor_top: 0,
        }
    }

    pub fn with_cursor_top(mut self, cursor_top: usize) -> Self {
        self.cursor_top = cursor_top;
        self
    }

    pub fn output(&self) -> &str {
        &self.output
    }

    /// Return and clear everything written so far.
    pub fn take_output(&mut self) -> String {
        std::mem::take(&mut self.output)
    }

    pub fn resize(&mut self, columns: u16, rows: u16) {
        self.columns = columns;
        self.rows = rows;
    }

    /// Simulate the host scrolling the window.
    pub fn set_window_top(&mut self, window_top: usize) {
        self.window_top = window_top;
    }
}

impl Terminal for MemoryTerminal {
    fn write(&mut self, data: &str) {
        self.output.push_str(data);
    }

    fn columns(&self) -> u16 {
        self.columns
    }

    fn rows(&self) -> u16 {
        self.rows
    }

    fn window_top(&self) -> usize {
        self.window_top
    }

    fn cursor_top(&self) -> usize {
        self.cursor_top
    }
}

impl<T: Terminal + ?Sized> Terminal for &mut T {
    fn write(&mut self, data: &str) {
        (**self).write(data);
    }

    fn columns(&self) -> u16 {
        (**self).columns()
    }

    fn rows(&self) -> u16 {
        (**self).rows()
    }

    fn window_top(&self) -> usize {
        (**self).window_top()
    }

    fn cursor_top(&self) -> usize {
        (**self).cursor_top()
    }
}

#[cfg(test)]
mod tests {
    use super::{MemoryTerminal, Terminal};

    #[test]
    fn memory_terminal_records_and_drains() {
        let mut terminal = MemoryTerminal::new(40, 10);
        terminal.write("ab");
        terminal.write("c");
        assert_eq!(terminal.output(), "abc");
        assert_eq!(terminal.take_output(), "abc");
        assert!(terminal.output().is_empty());
    }

    #[test]
    fn geometry_is_adjustable() {
        let mut terminal = MemoryTerminal::new(40, 10).with_cursor_top(3);
        terminal.resize(20, 5);
        terminal.set_window_top(7);
        assert_eq!((terminal.columns(), terminal.rows()), (20, 5));
        assert_eq!(terminal.window_top(), 7);
        assert_eq!(terminal.cursor_top(), 3);
    }
}
