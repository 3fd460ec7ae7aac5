//! Prompt keybindings.
//!
//! Two tables live here:
//! - [`KeyBindings`]: which chords trigger each built-in [`PromptAction`]. Defaults come from
//!   [`DEFAULT_KEY_BINDINGS`]; embedders override individual actions.
//! - [`KeyPressCallbacks`]: embedder commands keyed by chord, consulted before the built-ins.

use std::collections::HashMap;

use futures_util::future::BoxFuture;
use once_cell::sync::Lazy;

use crate::core::callbacks::CallbackResult;
use crate::core::input::{KeyCode, KeyPattern, Modifiers};
use crate::runtime::prompt::PromptResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PromptAction {
    Cancel,
    ClearScreen,
    NewLine,
    HardSubmit,
    Submit,
    LineStart,
    LineEnd,
    DocumentStart,
    DocumentEnd,
    CharLeft,
    CharRight,
    WordLeft,
    WordRight,
    LineUp,
    LineDown,
    DeleteWordBackward,
    DeleteWordForward,
    DeleteCharBackward,
    DeleteCharForward,
    Indent,
    Cut,
    CutAll,
    Copy,
    CopyAll,
    Paste,
    Undo,
    Redo,
    TriggerCompletion,
    CommitCompletion,
    CloseCompletion,
    CompletionPageUp,
    CompletionPageDown,
}

pub static DEFAULT_KEY_BINDINGS: Lazy<HashMap<PromptAction, Vec<KeyPattern>>> = Lazy::new(|| {
    use KeyCode::*;
    use PromptAction::*;

    let ctrl = Modifiers::CONTROL;
    let shift = Modifiers::SHIFT;
    let ctrl_shift = Modifiers::CONTROL | Modifiers::SHIFT;
    let ctrl_alt = Modifiers::CONTROL | Modifiers::ALT;
    let chord = KeyPattern::new;

    let mut map = HashMap::new();
    map.insert(Cancel, vec![chord(ctrl, Letter('C'))]);
    map.insert(ClearScreen, vec![chord(ctrl, Letter('L'))]);
    map.insert(NewLine, vec![chord(shift, Enter)]);
    map.insert(HardSubmit, vec![chord(ctrl, Enter), chord(ctrl_alt, Enter)]);
    map.insert(Submit, vec![KeyPattern::plain(Enter)]);
    map.insert(LineStart, vec![KeyPattern::plain(Home), chord(shift, Home)]);
    map.insert(LineEnd, vec![KeyPattern::plain(End), chord(shift, End)]);
    map.insert(DocumentStart, vec![chord(ctrl, Home), chord(ctrl_shift, Home)]);
    map.insert(DocumentEnd, vec![chord(ctrl, End), chord(ctrl_shift, End)]);
    map.insert(CharLeft, vec![KeyPattern::plain(LeftArrow), chord(shift, LeftArrow)]);
    map.insert(CharRight, vec![KeyPattern::plain(RightArrow), chord(shift, RightArrow)]);
    map.insert(WordLeft, vec![chord(ctrl, LeftArrow), chord(ctrl_shift, LeftArrow)]);
    map.insert(WordRight, vec![chord(ctrl, RightArrow), chord(ctrl_shift, RightArrow)]);
    map.insert(LineUp, vec![KeyPattern::plain(UpArrow), chord(shift, UpArrow)]);
    map.insert(LineDown, vec![KeyPattern::plain(DownArrow), chord(shift, DownArrow)]);
    map.insert(DeleteWordBackward, vec![chord(ctrl, Backspace)]);
    map.insert(DeleteWordForward, vec![chord(ctrl, Delete)]);
    map.insert(DeleteCharBackward, vec![KeyPattern::plain(Backspace)]);
    map.insert(DeleteCharForward, vec![KeyPattern::plain(Delete)]);
    map.insert(Indent, vec![KeyPattern::plain(Tab)]);
    map.insert(Cut, vec![chord(ctrl, Letter('X'))]);
    map.insert(CutAll, vec![chord(ctrl_shift, Letter('X'))]);
    map.insert(Copy, vec![chord(ctrl, Letter('C'))]);
    map.insert(CopyAll, vec![chord(ctrl_shift, Letter('C'))]);
    map.insert(
        Paste,
        vec![
            chord(ctrl, Letter('V')),
            chord(ctrl_shift, Letter('V')),
            chord(shift, Insert),
        ],
    );
    map.insert(Undo, vec![chord(ctrl, Letter('Z'))]);
    map.insert(Redo, vec![chord(ctrl, Letter('Y'))]);
    map.insert(TriggerCompletion, vec![chord(ctrl, Spacebar)]);
    map.insert(CommitCompletion, vec![KeyPattern::plain(Enter), KeyPattern::plain(Tab)]);
    map.insert(CloseCompletion, vec![KeyPattern::plain(Escape)]);
    map.insert(CompletionPageUp, vec![KeyPattern::plain(PageUp)]);
    map.insert(CompletionPageDown, vec![KeyPattern::plain(PageDown)]);

    map
});

/// Chord table for the built-in actions.
#[derive(Debug, Clone)]
pub struct KeyBindings {
    action_to_keys: HashMap<PromptAction, Vec<KeyPattern>>,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            action_to_keys: DEFAULT_KEY_BINDINGS.clone(),
        }
    }
}

impl KeyBindings {
    /// Replace the chords bound to `action`.
    pub fn set<I>(&mut self, action: PromptAction, keys: I)
    where
        I: IntoIterator<Item = KeyPattern>,
    {
        self.action_to_keys
            .insert(action, keys.into_iter().collect());
    }

    pub fn matches(&self, pattern: KeyPattern, action: PromptAction) -> bool {
        self.action_to_keys
            .get(&action)
            .is_some_and(|keys| keys.contains(&pattern))
    }

    pub fn keys(&self, action: PromptAction) -> &[KeyPattern] {
        self.action_to_keys
            .get(&action)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

/// Outcome of an embedder key command: `None` keeps editing, `Some` ends the session.
pub type KeyPressOutcome = Option<PromptResult>;

/// Embedder command invoked with the current text and caret.
pub type KeyPressCallback =
    Box<dyn Fn(&str, usize) -> BoxFuture<'static, CallbackResult<KeyPressOutcome>> + Send + Sync>;

/// Embedder overrides, consulted before the built-in dispatch table.
#[derive(Default)]
pub struct KeyPressCallbacks {
    entries: HashMap<KeyPattern, KeyPressCallback>,
}

impl KeyPressCallbacks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert<P, F>(&mut self, pattern: P, callback: F)
    where
        P: Into<KeyPattern>,
        F: Fn(&str, usize) -> BoxFuture<'static, CallbackResult<KeyPressOutcome>>
            + Send
            + Sync
            + 'static,
    {
        self.entries.insert(pattern.into(), Box::new(callback));
    }

    pub fn get(&self, pattern: KeyPattern) -> Option<&KeyPressCallback> {
        self.entries.get(&pattern)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::{KeyBindings, KeyPressCallbacks, PromptAction};
    use crate::core::input::{KeyCode, KeyPattern, Modifiers};
    use futures_util::FutureExt;

    #[test]
    fn defaults_match_expected_keys() {
        let bindings = KeyBindings::default();
        assert!(bindings.matches(KeyPattern::plain(KeyCode::Enter), PromptAction::Submit));
        assert!(bindings.matches(
            KeyPattern::shift(KeyCode::Enter),
            PromptAction::NewLine
        ));
        assert!(bindings.matches(
            KeyPattern::new(Modifiers::CONTROL | Modifiers::ALT, KeyCode::Enter),
            PromptAction::HardSubmit
        ));
        assert!(!bindings.matches(KeyPattern::plain(KeyCode::Enter), PromptAction::NewLine));
    }

    #[test]
    fn overrides_replace_defaults() {
        let mut bindings = KeyBindings::default();
        bindings.set(
            PromptAction::Submit,
            [KeyPattern::ctrl(KeyCode::Letter('S'))],
        );
        assert!(bindings.matches(KeyPattern::ctrl(KeyCode::Letter('S')), PromptAction::Submit));
        assert!(!bindings.matches(KeyPattern::plain(KeyCode::Enter), PromptAction::Submit));
        assert_eq!(bindings.keys(PromptAction::Submit).len(), 1);
    }

    #[test]
    fn callbacks_are_keyed_by_chord() {
        let mut callbacks = KeyPressCallbacks::new();
        callbacks.insert(KeyPattern::ctrl(KeyCode::F(1)), |_text: &str, _caret: usize| {
            async { Ok(None) }.boxed()
        });
        assert!(callbacks.get(KeyPattern::ctrl(KeyCode::F(1))).is_some());
        assert!(callbacks.get(KeyPattern::plain(KeyCode::F(1))).is_none());
    }
}
