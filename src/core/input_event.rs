//! Decoding of raw terminal input into [`KeyEvent`]s.
//!
//! Notes:
//! - A single read from the terminal may contain several keys; each becomes one event.
//! - Bracketed paste content is delivered as one `Shift+Insert` event carrying `pasted_text`.
//! - Sequences that do not map to a key are dropped rather than inserted as text.

use crate::core::input::{KeyCode, KeyEvent, Modifiers};
use crate::core::text::ansi::{extract_ansi_code, AnsiCodeKind};

const PASTE_START: &str = "\x1b[200~";
const PASTE_END: &str = "\x1b[201~";

const CODEPOINT_BACKSPACE_LEGACY: u32 = 8;
const CODEPOINT_TAB: u32 = 9;
const CODEPOINT_ENTER: u32 = 13;
const CODEPOINT_ESCAPE: u32 = 27;
const CODEPOINT_SPACE: u32 = 32;
const CODEPOINT_BACKSPACE: u32 = 127;
const CODEPOINT_KP_ENTER: u32 = 57414;

const KITTY_EVENT_RELEASE: u32 = 3;

pub fn parse_key_events(data: &str) -> Vec<KeyEvent> {
    let mut events = Vec::new();
    let mut remaining = data;

    loop {
        let Some(start) = remaining.find(PASTE_START) else {
            parse_non_paste(remaining, &mut events);
            break;
        };

        parse_non_paste(&remaining[..start], &mut events);

        let after_start = &remaining[start + PASTE_START.len()..];
        let Some(end_rel) = after_start.find(PASTE_END) else {
            // Unterminated paste: treat everything after the marker as pasted text.
            events.push(KeyEvent::paste(after_start));
            break;
        };

        events.push(KeyEvent::paste(&after_start[..end_rel]));
        remaining = &after_start[end_rel + PASTE_END.len()..];
        if remaining.is_empty() {
            break;
        }
    }

    events
}

fn parse_non_paste(data: &str, events: &mut Vec<KeyEvent>) {
    let mut idx = 0;
    while idx < data.len() {
        let Some(ch) = data[idx..].chars().next() else {
            break;
        };

        if ch != '\x1b' {
            events.push(decode_char(ch));
            idx += ch.len_utf8();
            continue;
        }

        if let Some(code) = extract_ansi_code(data, idx) {
            if let Some(event) = decode_sequence(&code.code, code.kind) {
                events.push(event);
            }
            idx += code.length;
            continue;
        }

        match data[idx + 1..].chars().next() {
            Some(next) => {
                let mut event = decode_char(next);
                event.modifiers |= Modifiers::ALT;
                events.push(event);
                idx += 1 + next.len_utf8();
            }
            None => {
                events.push(KeyEvent::new(KeyCode::Escape, Modifiers::NONE));
                idx += 1;
            }
        }
    }
}

fn decode_char(ch: char) -> KeyEvent {
    match ch {
        '\r' => KeyEvent::new(KeyCode::Enter, Modifiers::NONE),
        '\n' => KeyEvent::new(KeyCode::Enter, Modifiers::CONTROL),
        '\t' => KeyEvent::new(KeyCode::Tab, Modifiers::NONE),
        '\x7f' => KeyEvent::new(KeyCode::Backspace, Modifiers::NONE),
        '\x08' => KeyEvent::new(KeyCode::Backspace, Modifiers::CONTROL),
        '\x1b' => KeyEvent::new(KeyCode::Escape, Modifiers::NONE),
        '\x00' => KeyEvent::new(KeyCode::Spacebar, Modifiers::CONTROL),
        '\x01'..='\x1a' => {
            let letter = (b'A' + (ch as u8 - 1)) as char;
            KeyEvent::new(KeyCode::Letter(letter), Modifiers::CONTROL)
                .with_char(letter.to_ascii_lowercase())
        }
        c if c.is_control() => KeyEvent::new(KeyCode::Other, Modifiers::CONTROL),
        c => KeyEvent::from_char(c),
    }
}

fn decode_sequence(code: &str, kind: AnsiCodeKind) -> Option<KeyEvent> {
    match kind {
        AnsiCodeKind::Ss3 => decode_ss3(code),
        AnsiCodeKind::Csi => decode_csi(code),
        AnsiCodeKind::Osc => None,
    }
}

fn decode_ss3(code: &str) -> Option<KeyEvent> {
    let last = code.chars().last()?;
    let key = match last {
        'M' => KeyCode::Enter,
        'P' => KeyCode::F(1),
        'Q' => KeyCode::F(2),
        'R' => KeyCode::F(3),
        'S' => KeyCode::F(4),
        other => cursor_key(other)?,
    };
    Some(KeyEvent::new(key, Modifiers::NONE))
}

fn cursor_key(final_byte: char) -> Option<KeyCode> {
    match final_byte {
        'A' => Some(KeyCode::UpArrow),
        'B' => Some(KeyCode::DownArrow),
        'C' => Some(KeyCode::RightArrow),
        'D' => Some(KeyCode::LeftArrow),
        'H' => Some(KeyCode::Home),
        'F' => Some(KeyCode::End),
        _ => None,
    }
}

fn decode_csi(code: &str) -> Option<KeyEvent> {
    let body = code.strip_prefix("\x1b[")?;
    let final_byte = body.chars().last()?;
    let params = &body[..body.len() - final_byte.len_utf8()];
    let fields: Vec<&str> = params.split(';').collect();
    let modifier_field = |index: usize| -> Modifiers {
        fields
            .get(index)
            .and_then(|field| field.split(':').next())
            .and_then(|value| value.parse::<u32>().ok())
            .map(Modifiers::from_xterm_param)
            .unwrap_or(Modifiers::NONE)
    };

    match final_byte {
        'Z' => Some(KeyEvent::new(KeyCode::Tab, Modifiers::SHIFT)),
        'A' | 'B' | 'C' | 'D' | 'H' | 'F' => {
            let key = cursor_key(final_byte)?;
            Some(KeyEvent::new(key, modifier_field(1)))
        }
        'P' | 'Q' | 'R' | 'S' => {
            let n = match final_byte {
                'P' => 1,
                'Q' => 2,
                'R' => 3,
                _ => 4,
            };
            Some(KeyEvent::new(KeyCode::F(n), modifier_field(1)))
        }
        '~' => {
            let number = fields.first()?.parse::<u32>().ok()?;
            if number == 27 {
                // modifyOtherKeys: ESC [ 27 ; mod ; codepoint ~
                let codepoint = fields.get(2)?.parse::<u32>().ok()?;
                return decode_codepoint(codepoint, modifier_field(1));
            }
            let key = match number {
                1 | 7 => KeyCode::Home,
                2 => KeyCode::Insert,
                3 => KeyCode::Delete,
                4 | 8 => KeyCode::End,
                5 => KeyCode::PageUp,
                6 => KeyCode::PageDown,
                11..=15 => KeyCode::F((number - 10) as u8),
                17..=21 => KeyCode::F((number - 11) as u8),
                23 | 24 => KeyCode::F((number - 12) as u8),
                _ => return None,
            };
            Some(KeyEvent::new(key, modifier_field(1)))
        }
        'u' => {
            let codepoint = fields.first()?.split(':').next()?.parse::<u32>().ok()?;
            let event_type = fields
                .get(1)
                .and_then(|field| field.split(':').nth(1))
                .and_then(|value| value.parse::<u32>().ok());
            if event_type == Some(KITTY_EVENT_RELEASE) {
                return None;
            }
            decode_codepoint(codepoint, modifier_field(1))
        }
        _ => None,
    }
}

fn decode_codepoint(codepoint: u32, modifiers: Modifiers) -> Option<KeyEvent> {
    let key = match codepoint {
        CODEPOINT_ENTER | CODEPOINT_KP_ENTER => KeyCode::Enter,
        CODEPOINT_TAB => KeyCode::Tab,
        CODEPOINT_BACKSPACE | CODEPOINT_BACKSPACE_LEGACY => KeyCode::Backspace,
        CODEPOINT_ESCAPE => KeyCode::Escape,
        _ => {
            let ch = char::from_u32(codepoint).filter(|ch| !ch.is_control())?;
            let ch = if modifiers.shift() {
                ch.to_ascii_uppercase()
            } else {
                ch
            };
            let mut event = KeyEvent::new(KeyCode::for_char(ch), modifiers).with_char(ch);
            if codepoint == CODEPOINT_SPACE {
                event.key = KeyCode::Spacebar;
            }
            return Some(event);
        }
    };
    Some(KeyEvent::new(key, modifiers))
}
