//! ANSI/VT100 escape codec.
//!
//! Everything the renderer writes to the terminal is built from the helpers in this module:
//! SGR formatting, relative cursor motion, move-to-column and the three clear operations.
//! No other control sequences are emitted by the engine.

pub const ESCAPE: char = '\x1b';

const RESET_FOREGROUND: &str = "39";
const RESET_BACKGROUND: &str = "49";
const BOLD: &str = "1";
const UNDERLINE: &str = "4";
const REVERSE: &str = "7";

pub const CLEAR_LINE: &str = "\x1b[0K";
pub const CLEAR_TO_END_OF_SCREEN: &str = "\x1b[0J";
pub const CLEAR_ENTIRE_SCREEN: &str = "\x1b[2J";
pub const RESET: &str = "\x1b[0m";

/// Terminal color, either one of the 16 palette entries or 24-bit RGB.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnsiColor {
    Black,
    Red,
    Green,
    Yellow,
    Blue,
    Magenta,
    Cyan,
    White,
    BrightBlack,
    BrightRed,
    BrightGreen,
    BrightYellow,
    BrightBlue,
    BrightMagenta,
    BrightCyan,
    BrightWhite,
    Rgb(u8, u8, u8),
}

impl AnsiColor {
    fn palette_offset(self) -> Option<u8> {
        let offset = match self {
            AnsiColor::Black => 0,
            AnsiColor::Red => 1,
            AnsiColor::Green => 2,
            AnsiColor::Yellow => 3,
            AnsiColor::Blue => 4,
            AnsiColor::Magenta => 5,
            AnsiColor::Cyan => 6,
            AnsiColor::White => 7,
            AnsiColor::BrightBlack => 60,
            AnsiColor::BrightRed => 61,
            AnsiColor::BrightGreen => 62,
            AnsiColor::BrightYellow => 63,
            AnsiColor::BrightBlue => 64,
            AnsiColor::BrightMagenta => 65,
            AnsiColor::BrightCyan => 66,
            AnsiColor::BrightWhite => 67,
            AnsiColor::Rgb(..) => return None,
        };
        Some(offset)
    }

    /// SGR parameter selecting this color as foreground.
    pub fn foreground(self) -> String {
        match (self, self.palette_offset()) {
            (AnsiColor::Rgb(r, g, b), _) => format!("38;2;{r};{g};{b}"),
            (_, Some(offset)) => (30 + u16::from(offset)).to_string(),
            (_, None) => RESET_FOREGROUND.to_string(),
        }
    }

    /// SGR parameter selecting this color as background.
    pub fn background(self) -> String {
        match (self, self.palette_offset()) {
            (AnsiColor::Rgb(r, g, b), _) => format!("48;2;{r};{g};{b}"),
            (_, Some(offset)) => (40 + u16::from(offset)).to_string(),
            (_, None) => RESET_BACKGROUND.to_string(),
        }
    }
}

/// Abstract text formatting, rendered to a single SGR sequence.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ConsoleFormat {
    pub foreground: Option<AnsiColor>,
    pub background: Option<AnsiColor>,
    pub bold: bool,
    pub underline: bool,
    pub inverted: bool,
}

impl ConsoleFormat {
    pub fn foreground(color: AnsiColor) -> Self {
        Self {
            foreground: Some(color),
            ..Self::default()
        }
    }

    pub fn inverted() -> Self {
        Self {
            inverted: true,
            ..Self::default()
        }
    }

    pub fn is_plain(&self) -> bool {
        *self == Self::default()
    }
}

/// Render `format` as one SGR escape. Inverted formatting resets both colors and ignores the
/// remaining attributes.
pub fn to_ansi_escape_sequence(format: &ConsoleFormat) -> String {
    let params: Vec<String> = if format.inverted {
        vec![
            RESET_FOREGROUND.to_string(),
            RESET_BACKGROUND.to_string(),
            REVERSE.to_string(),
        ]
    } else {
        let mut params = vec![
            format
                .foreground
                .map(AnsiColor::foreground)
                .unwrap_or_else(|| RESET_FOREGROUND.to_string()),
            format
                .background
                .map(AnsiColor::background)
                .unwrap_or_else(|| RESET_BACKGROUND.to_string()),
        ];
        if format.bold {
            params.push(BOLD.to_string());
        }
        if format.underline {
            params.push(UNDERLINE.to_string());
        }
        params
    };
    format!("{ESCAPE}[{}m", params.join(";"))
}

pub fn set_colors(foreground: AnsiColor, background: AnsiColor) -> String {
    to_ansi_escape_sequence(&ConsoleFormat {
        foreground: Some(foreground),
        background: Some(background),
        ..ConsoleFormat::default()
    })
}

/// Column index starts at 1.
pub fn move_cursor_to_column(index: usize) -> String {
    format!("{ESCAPE}[{index}G")
}

pub fn move_cursor_up(count: usize) -> String {
    relative_move(count, 'A')
}

pub fn move_cursor_down(count: usize) -> String {
    relative_move(count, 'B')
}

pub fn move_cursor_right(count: usize) -> String {
    relative_move(count, 'C')
}

pub fn move_cursor_left(count: usize) -> String {
    relative_move(count, 'D')
}

fn relative_move(count: usize, direction: char) -> String {
    if count == 0 {
        String::new()
    } else {
        format!("{ESCAPE}[{count}{direction}")
    }
}

/// Kind of escape sequence recognised by [`extract_ansi_code`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnsiCodeKind {
    Csi,
    Osc,
    Ss3,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnsiCode {
    pub code: String,
    pub length: usize,
    pub kind: AnsiCodeKind,
}

/// Extract the escape sequence starting at byte `pos`, if any.
pub fn extract_ansi_code(input: &str, pos: usize) -> Option<AnsiCode> {
    let bytes = input.as_bytes();
    if pos + 1 >= bytes.len() || bytes[pos] != 0x1b {
        return None;
    }

    match bytes[pos + 1] {
        b'[' => extract_csi(input, pos),
        b']' => extract_osc(input, pos),
        b'O' => extract_ss3(input, pos),
        _ => None,
    }
}

fn extract_csi(input: &str, pos: usize) -> Option<AnsiCode> {
    let bytes = input.as_bytes();
    let mut idx = pos + 2;
    while idx < bytes.len() {
        if (0x40..=0x7e).contains(&bytes[idx]) {
            let end = idx + 1;
            return Some(AnsiCode {
                code: input[pos..end].to_string(),
                length: end - pos,
                kind: AnsiCodeKind::Csi,
            });
        }
        idx += 1;
    }
    None
}

fn extract_osc(input: &str, pos: usize) -> Option<AnsiCode> {
    let bytes = input.as_bytes();
    let mut idx = pos + 2;
    while idx < bytes.len() {
        let end = if bytes[idx] == 0x07 {
            Some(idx + 1)
        } else if bytes[idx] == 0x1b && bytes.get(idx + 1) == Some(&b'\\') {
            Some(idx + 2)
        } else {
            None
        };
        if let Some(end) = end {
            return Some(AnsiCode {
                code: input[pos..end].to_string(),
                length: end - pos,
                kind: AnsiCodeKind::Osc,
            });
        }
        idx += 1;
    }
    None
}

fn extract_ss3(input: &str, pos: usize) -> Option<AnsiCode> {
    let end = pos + 3;
    if end > input.len() || !input.is_char_boundary(end) {
        return None;
    }
    Some(AnsiCode {
        code: input[pos..end].to_string(),
        length: end - pos,
        kind: AnsiCodeKind::Ss3,
    })
}
