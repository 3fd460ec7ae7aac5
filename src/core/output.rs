//! Typed terminal output commands and a single output gate.
//!
//! Invariant: all terminal writes must flow through `OutputGate::flush(..)`, and every command
//! encodes to the fixed escape subset in [`crate::core::text::ansi`].

use crate::core::terminal::Terminal;
use crate::core::text::ansi;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TerminalCmd {
    /// Text, possibly carrying SGR formatting sequences.
    Bytes(String),
    BytesStatic(&'static str),

    ClearLine,
    ClearToEndOfScreen,
    ClearScreen,

    MoveUp(usize),
    MoveDown(usize),
    /// Absolute column, 1-based.
    ColumnAbs(usize),
    /// `\r\n`: next row, scrolling the window when on the last row.
    NewLine,
}

impl TerminalCmd {
    pub fn bytes(data: impl Into<String>) -> Self {
        Self::Bytes(data.into())
    }

    /// Append the encoded form of this command to `out`.
    pub fn encode_into(&self, out: &mut String) {
        match self {
            TerminalCmd::Bytes(data) => out.push_str(data),
            TerminalCmd::BytesStatic(data) => out.push_str(data),
            TerminalCmd::ClearLine => out.push_str(ansi::CLEAR_LINE),
            TerminalCmd::ClearToEndOfScreen => out.push_str(ansi::CLEAR_TO_END_OF_SCREEN),
            TerminalCmd::ClearScreen => out.push_str(ansi::CLEAR_ENTIRE_SCREEN),
            TerminalCmd::MoveUp(n) => out.push_str(&ansi::move_cursor_up(*n)),
            TerminalCmd::MoveDown(n) => out.push_str(&ansi::move_cursor_down(*n)),
            TerminalCmd::ColumnAbs(n) => out.push_str(&ansi::move_cursor_to_column(*n)),
            TerminalCmd::NewLine => out.push_str("\r\n"),
        }
    }
}

/// Concatenate the encoded bytes of `cmds`.
pub fn encode(cmds: &[TerminalCmd]) -> String {
    let mut out = String::new();
    for cmd in cmds {
        cmd.encode_into(&mut out);
    }
    out
}

#[derive(Debug, Default)]
pub struct OutputGate {
    cmds: Vec<TerminalCmd>,
}

impl OutputGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, cmd: TerminalCmd) {
        self.cmds.push(cmd);
    }

    pub fn extend<I>(&mut self, cmds: I)
    where
        I: IntoIterator<Item = TerminalCmd>,
    {
        self.cmds.extend(cmds);
    }

    pub fn is_empty(&self) -> bool {
        self.cmds.is_empty()
    }

    pub fn clear(&mut self) {
        self.cmds.clear();
    }

    /// Flush buffered commands to the terminal as a single write.
    ///
    /// This is the single write gate: `Terminal::write(..)` must not be called
    /// from anywhere else.
    pub fn flush<T: Terminal + ?Sized>(&mut self, term: &mut T) {
        if self.cmds.is_empty() {
            return;
        }
        let out = encode(&self.cmds);
        self.cmds.clear();
        if !out.is_empty() {
            term.write(&out);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{encode, OutputGate, TerminalCmd};
    use crate::core::terminal::MemoryTerminal;

    #[test]
    fn commands_encode_to_codec_sequences() {
        let cmds = vec![
            TerminalCmd::MoveUp(2),
            TerminalCmd::MoveDown(0),
            TerminalCmd::ColumnAbs(3),
            TerminalCmd::ClearLine,
            TerminalCmd::bytes("hi"),
            TerminalCmd::NewLine,
            TerminalCmd::ClearToEndOfScreen,
        ];
        assert_eq!(encode(&cmds), "\x1b[2A\x1b[3G\x1b[0Khi\r\n\x1b[0J");
    }

    #[test]
    fn flush_writes_once_and_drains() {
        let mut gate = OutputGate::new();
        let mut terminal = MemoryTerminal::new(10, 5);
        gate.push(TerminalCmd::BytesStatic("a"));
        gate.extend([TerminalCmd::bytes("b")]);
        gate.flush(&mut terminal);
        assert_eq!(terminal.output(), "ab");
        assert!(gate.is_empty());

        gate.flush(&mut terminal);
        assert_eq!(terminal.output(), "ab");
    }
}
