//! Key event model.

use std::fmt;
use std::ops::{BitOr, BitOrAssign};

/// Set of held modifier keys.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Modifiers(u8);

impl Modifiers {
    pub const NONE: Modifiers = Modifiers(0);
    pub const SHIFT: Modifiers = Modifiers(1);
    pub const ALT: Modifiers = Modifiers(2);
    pub const CONTROL: Modifiers = Modifiers(4);

    /// Decode the xterm modifier parameter (`1 + bitmask`) used by CSI sequences.
    pub fn from_xterm_param(param: u32) -> Self {
        let mask = param.saturating_sub(1);
        let mut mods = Modifiers::NONE;
        if mask & 1 != 0 {
            mods |= Modifiers::SHIFT;
        }
        if mask & 2 != 0 {
            mods |= Modifiers::ALT;
        }
        if mask & 4 != 0 {
            mods |= Modifiers::CONTROL;
        }
        mods
    }

    pub fn contains(self, other: Modifiers) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn shift(self) -> bool {
        self.contains(Modifiers::SHIFT)
    }

    pub fn control(self) -> bool {
        self.contains(Modifiers::CONTROL)
    }

    pub fn alt(self) -> bool {
        self.contains(Modifiers::ALT)
    }

    pub fn without(self, other: Modifiers) -> Self {
        Modifiers(self.0 & !other.0)
    }
}

impl BitOr for Modifiers {
    type Output = Modifiers;

    fn bitor(self, rhs: Self) -> Self::Output {
        Modifiers(self.0 | rhs.0)
    }
}

impl BitOrAssign for Modifiers {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl fmt::Display for Modifiers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if self.control() {
            parts.push("ctrl");
        }
        if self.alt() {
            parts.push("alt");
        }
        if self.shift() {
            parts.push("shift");
        }
        write!(f, "{}", parts.join("+"))
    }
}

/// Symbolic key identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    /// Letter key, always stored upper-case (`'A'..='Z'`).
    Letter(char),
    Digit(u8),
    Spacebar,
    Enter,
    Tab,
    Backspace,
    Delete,
    Insert,
    Escape,
    Home,
    End,
    PageUp,
    PageDown,
    UpArrow,
    DownArrow,
    LeftArrow,
    RightArrow,
    F(u8),
    /// Punctuation and any other character key without a dedicated identity.
    Other,
}

impl KeyCode {
    /// Key identity for a typed character.
    pub fn for_char(ch: char) -> KeyCode {
        match ch {
            'a'..='z' | 'A'..='Z' => KeyCode::Letter(ch.to_ascii_uppercase()),
            '0'..='9' => KeyCode::Digit(ch as u8 - b'0'),
            ' ' => KeyCode::Spacebar,
            '\t' => KeyCode::Tab,
            '\r' | '\n' => KeyCode::Enter,
            _ => KeyCode::Other,
        }
    }

    pub fn is_navigation(self) -> bool {
        matches!(
            self,
            KeyCode::Home
                | KeyCode::End
                | KeyCode::UpArrow
                | KeyCode::DownArrow
                | KeyCode::LeftArrow
                | KeyCode::RightArrow
        )
    }

    pub fn is_vertical(self) -> bool {
        matches!(self, KeyCode::UpArrow | KeyCode::DownArrow)
    }
}

/// A `(modifiers, key)` chord.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyPattern {
    pub modifiers: Modifiers,
    pub key: KeyCode,
}

impl KeyPattern {
    pub const fn new(modifiers: Modifiers, key: KeyCode) -> Self {
        Self { modifiers, key }
    }

    pub const fn plain(key: KeyCode) -> Self {
        Self::new(Modifiers::NONE, key)
    }

    pub const fn ctrl(key: KeyCode) -> Self {
        Self::new(Modifiers::CONTROL, key)
    }

    pub const fn shift(key: KeyCode) -> Self {
        Self::new(Modifiers::SHIFT, key)
    }
}

impl From<KeyCode> for KeyPattern {
    fn from(key: KeyCode) -> Self {
        KeyPattern::plain(key)
    }
}

/// One physical key press, consumed synchronously by the dispatch pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyEvent {
    /// Literal character produced, `None` for non-printable keys.
    pub character: Option<char>,
    pub key: KeyCode,
    pub modifiers: Modifiers,
    /// Bulk text reported by the terminal as a single paste.
    pub pasted_text: Option<String>,
    /// Set by an earlier handler; later handlers must not interpret the event.
    pub handled: bool,
}

impl KeyEvent {
    pub fn new(key: KeyCode, modifiers: Modifiers) -> Self {
        Self {
            character: None,
            key,
            modifiers,
            pasted_text: None,
            handled: false,
        }
    }

    /// A printable character typed without Ctrl/Alt; Shift is inferred for upper-case letters.
    pub fn from_char(ch: char) -> Self {
        let modifiers = if ch.is_ascii_uppercase() {
            Modifiers::SHIFT
        } else {
            Modifiers::NONE
        };
        Self {
            character: Some(ch),
            key: KeyCode::for_char(ch),
            modifiers,
            pasted_text: None,
            handled: false,
        }
    }

    pub fn with_char(mut self, ch: char) -> Self {
        self.character = Some(ch);
        self
    }

    pub fn paste(text: impl Into<String>) -> Self {
        Self {
            character: None,
            key: KeyCode::Insert,
            modifiers: Modifiers::SHIFT,
            pasted_text: Some(text.into()),
            handled: false,
        }
    }

    pub fn pattern(&self) -> KeyPattern {
        KeyPattern::new(self.modifiers, self.key)
    }

    /// Character to insert for a plain keystroke, if it produces one.
    pub fn printable(&self) -> Option<char> {
        if self.modifiers.control() || self.modifiers.alt() {
            return None;
        }
        self.character.filter(|ch| !ch.is_control())
    }
}

impl From<KeyPattern> for KeyEvent {
    fn from(pattern: KeyPattern) -> Self {
        let mut event = KeyEvent::new(pattern.key, pattern.modifiers);
        if pattern.key == KeyCode::Spacebar && !pattern.modifiers.control() {
            event.character = Some(' ');
        }
        event
    }
}

#[cfg(test)]
mod tests {
    use super::{KeyCode, KeyEvent, Modifiers};

    #[test]
    fn xterm_modifier_param_decodes_bitmask() {
        let mods = Modifiers::from_xterm_param(6);
        assert!(mods.control());
        assert!(mods.shift());
        assert!(!mods.alt());
        assert_eq!(Modifiers::from_xterm_param(1), Modifiers::NONE);
    }

    #[test]
    fn uppercase_character_implies_shift() {
        let event = KeyEvent::from_char('H');
        assert_eq!(event.key, KeyCode::Letter('H'));
        assert!(event.modifiers.shift());
        assert_eq!(event.printable(), Some('H'));
    }

    #[test]
    fn control_chords_are_not_printable() {
        let event = KeyEvent::new(KeyCode::Letter('C'), Modifiers::CONTROL).with_char('c');
        assert_eq!(event.printable(), None);
    }
}
