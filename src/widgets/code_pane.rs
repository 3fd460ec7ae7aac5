//! Key dispatcher for the editing surface.
//!
//! Each key event goes through two entry points in a fixed order: [`CodePane::on_key_down`]
//! classifies the chord into an [`Intent`] and applies it, then [`CodePane::on_key_up`] runs
//! against the re-wrapped layout to resolve vertical motion.

use crate::core::callbacks::SoftEnterPredicate;
use crate::core::clipboard::Clipboard;
use crate::core::input::{KeyCode, KeyEvent};
use crate::core::keybindings::{KeyBindings, PromptAction};
use crate::core::terminal::Terminal;
use crate::document::{selection, Document};
use crate::error::PromptError;
use crate::runtime::cancel::{await_or_cancel, CancellationSignal};
use crate::runtime::prompt::PromptResult;

/// What a key-down event resolves to. Guards on selection state are evaluated during
/// classification, so the order of checks in [`classify`] is the priority order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    Cancel,
    ClearScreen,
    NewLine,
    HardSubmit,
    /// Plain Enter; the soft-enter predicate may still turn it into a newline.
    Submit,
    LineStart,
    LineEnd,
    DocumentStart,
    DocumentEnd,
    CharLeft,
    CharRight,
    WordLeft,
    WordRight,
    DeleteWordBackward,
    DeleteWordForward,
    DeleteCharBackward,
    DeleteCharForward,
    DeleteSelection,
    Indent,
    CutSelection,
    CopySelection,
    CopyAll,
    PasteText(String),
    PasteClipboard,
    Undo,
    Redo,
    Insert(char),
    Ignore,
}

/// Resolve `key` to an intent. Pure: depends only on the chord, the bindings and whether a
/// selection is active.
pub fn classify(key: &KeyEvent, bindings: &KeyBindings, has_selection: bool) -> Intent {
    use PromptAction as A;

    let pattern = key.pattern();
    let is = |action| bindings.matches(pattern, action);

    if is(A::Cancel) && !has_selection {
        return Intent::Cancel;
    }
    if is(A::ClearScreen) {
        return Intent::ClearScreen;
    }
    if is(A::NewLine) {
        return Intent::NewLine;
    }
    if is(A::HardSubmit) {
        return Intent::HardSubmit;
    }
    if is(A::Submit) {
        return Intent::Submit;
    }

    let navigation = [
        (A::LineStart, Intent::LineStart),
        (A::LineEnd, Intent::LineEnd),
        (A::DocumentStart, Intent::DocumentStart),
        (A::DocumentEnd, Intent::DocumentEnd),
        (A::CharLeft, Intent::CharLeft),
        (A::CharRight, Intent::CharRight),
        (A::WordLeft, Intent::WordLeft),
        (A::WordRight, Intent::WordRight),
    ];
    if let Some((_, intent)) = navigation.into_iter().find(|(action, _)| is(*action)) {
        return intent;
    }

    if !has_selection {
        let deletes = [
            (A::DeleteWordBackward, Intent::DeleteWordBackward),
            (A::DeleteWordForward, Intent::DeleteWordForward),
            (A::DeleteCharBackward, Intent::DeleteCharBackward),
            (A::DeleteCharForward, Intent::DeleteCharForward),
        ];
        if let Some((_, intent)) = deletes.into_iter().find(|(action, _)| is(*action)) {
            return intent;
        }
    } else if matches!(key.key, KeyCode::Delete | KeyCode::Backspace) {
        return Intent::DeleteSelection;
    }

    if is(A::Indent) {
        return Intent::Indent;
    }
    if is(A::Cut) && has_selection {
        return Intent::CutSelection;
    }
    if is(A::CutAll) || is(A::CopyAll) {
        return Intent::CopyAll;
    }
    if is(A::Copy) && has_selection {
        return Intent::CopySelection;
    }
    if is(A::Paste) {
        return match &key.pasted_text {
            Some(text) => Intent::PasteText(text.clone()),
            None => Intent::PasteClipboard,
        };
    }
    if is(A::Undo) {
        return Intent::Undo;
    }
    if is(A::Redo) {
        return Intent::Redo;
    }

    match key.printable() {
        Some(ch) => Intent::Insert(ch),
        None => Intent::Ignore,
    }
}

/// Collaborators a key-down may call out to. Borrowed for one event only.
pub struct PaneServices<'a> {
    pub bindings: &'a KeyBindings,
    pub clipboard: &'a dyn Clipboard,
    pub soft_enter: Option<&'a dyn SoftEnterPredicate>,
    pub cancel: Option<&'a CancellationSignal>,
    /// Inserted by Tab and substituted for pasted tabs.
    pub indent: &'a str,
}

#[derive(Debug, Default)]
pub struct CodePane {
    document: Document,
    result: Option<PromptResult>,
    top_coordinate: usize,
    code_area_width: usize,
    code_area_height: usize,
    window_top: usize,
    clear_screen_requested: bool,
}

impl CodePane {
    pub fn new(top_coordinate: usize) -> Self {
        Self {
            top_coordinate,
            ..Self::default()
        }
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.document
    }

    pub fn result(&self) -> Option<&PromptResult> {
        self.result.as_ref()
    }

    pub fn take_result(&mut self) -> Option<PromptResult> {
        self.result.take()
    }

    pub fn set_result(&mut self, result: PromptResult) {
        self.result = Some(result);
    }

    pub fn top_coordinate(&self) -> usize {
        self.top_coordinate
    }

    /// Follow the renderer when drawing scrolled the window.
    pub fn set_top_coordinate(&mut self, top_coordinate: usize) {
        self.top_coordinate = top_coordinate;
    }

    pub fn code_area_width(&self) -> usize {
        self.code_area_width
    }

    pub fn code_area_height(&self) -> usize {
        self.code_area_height
    }

    /// Whether Ctrl+L asked for the screen to be cleared; resets the request.
    pub fn take_clear_screen_request(&mut self) -> bool {
        std::mem::take(&mut self.clear_screen_requested)
    }

    /// Recompute the code area from the terminal geometry. Host scrolling since the last
    /// measurement shifts the prompt's top row up by the same amount. Returns whether the
    /// wrap width changed.
    pub fn measure_console<T: Terminal + ?Sized>(&mut self, terminal: &T, prompt_width: usize) -> bool {
        let window_top = terminal.window_top();
        let window_top_change = window_top as isize - self.window_top as isize;
        self.top_coordinate = (self.top_coordinate as isize - window_top_change).max(0) as usize;
        self.window_top = window_top;

        let width = (terminal.columns() as usize).saturating_sub(prompt_width);
        let height = (terminal.rows() as usize).saturating_sub(self.top_coordinate);
        let width_changed = width != self.code_area_width;
        self.code_area_width = width;
        self.code_area_height = height;
        width_changed
    }

    pub fn word_wrap(&mut self) {
        self.document.word_wrap(self.code_area_width);
    }

    pub async fn on_key_down(
        &mut self,
        key: &mut KeyEvent,
        services: &PaneServices<'_>,
    ) -> Result<(), PromptError> {
        if key.handled {
            return Ok(());
        }

        selection::on_key_down(&mut self.document, key);

        let intent = classify(key, services.bindings, self.document.selection().is_some());
        self.apply(intent, services).await
    }

    async fn apply(&mut self, intent: Intent, services: &PaneServices<'_>) -> Result<(), PromptError> {
        let document = &mut self.document;
        match intent {
            Intent::Cancel => {
                tracing::debug!("prompt cancelled by interrupt key");
                self.result = Some(PromptResult::cancelled());
            }
            Intent::ClearScreen => {
                self.top_coordinate = 0;
                self.clear_screen_requested = true;
            }
            Intent::NewLine => replace_selection_with(document, "\n"),
            Intent::HardSubmit => {
                tracing::debug!("hard submit");
                self.result = Some(PromptResult::submitted(document.text(), true));
            }
            Intent::Submit => {
                if should_force_soft_enter(document, services).await? {
                    replace_selection_with(&mut self.document, "\n");
                } else {
                    tracing::debug!("submit");
                    self.result = Some(PromptResult::submitted(self.document.text(), false));
                }
            }
            Intent::LineStart => document.move_to_line_boundary(-1),
            Intent::LineEnd => document.move_to_line_boundary(1),
            Intent::DocumentStart => document.set_caret(0),
            Intent::DocumentEnd => {
                let len = document.len();
                document.set_caret(len);
            }
            Intent::CharLeft => {
                let caret = document.caret().saturating_sub(1);
                document.set_caret(caret);
            }
            Intent::CharRight => {
                let caret = document.caret() + 1;
                document.set_caret(caret);
            }
            Intent::WordLeft => document.move_to_word_boundary(-1),
            Intent::WordRight => document.move_to_word_boundary(1),
            Intent::DeleteWordBackward => {
                let start = document.calculate_word_boundary_index_near_caret(-1);
                let count = document.caret() - start;
                document.remove(start, count);
            }
            Intent::DeleteWordForward => {
                let caret = document.caret();
                let end = document.calculate_word_boundary_index_near_caret(1);
                document.remove(caret, end - caret);
            }
            Intent::DeleteCharBackward => {
                if let Some(start) = document.caret().checked_sub(1) {
                    document.remove(start, 1);
                }
            }
            Intent::DeleteCharForward => {
                let caret = document.caret();
                document.remove(caret, 1);
            }
            Intent::DeleteSelection => document.delete_selected_text(),
            Intent::Indent => replace_selection_with(document, services.indent),
            Intent::CutSelection => {
                if let Some(span) = document.selection() {
                    let cut = document.slice(span.start, span.end);
                    document.remove(span.start, span.len());
                    set_clipboard(services, cut).await?;
                }
            }
            Intent::CopySelection => {
                if let Some(copied) = document.selected_text() {
                    set_clipboard(services, copied).await?;
                }
            }
            Intent::CopyAll => {
                let all = document.text();
                set_clipboard(services, all).await?;
            }
            Intent::PasteText(text) => paste_text(document, &text, services.indent),
            Intent::PasteClipboard => {
                let text = get_clipboard(services).await?;
                paste_text(&mut self.document, &text, services.indent);
            }
            Intent::Undo => {
                document.undo();
            }
            Intent::Redo => {
                document.redo();
            }
            Intent::Insert(ch) => {
                let mut buf = [0u8; 4];
                replace_selection_with(document, ch.encode_utf8(&mut buf));
            }
            Intent::Ignore => {}
        }
        Ok(())
    }

    /// Key-up phase: vertical motion against the current layout, then selection bookkeeping.
    pub fn on_key_up(&mut self, key: &mut KeyEvent, bindings: &KeyBindings) {
        if !key.handled {
            let pattern = key.pattern();
            let row = self.document.cursor().row;
            let rows = self.document.wrapped_lines().len();
            if bindings.matches(pattern, PromptAction::LineUp) && row > 0 {
                self.move_to_row(row - 1);
                key.handled = true;
            } else if bindings.matches(pattern, PromptAction::LineDown) && row + 1 < rows {
                self.move_to_row(row + 1);
                key.handled = true;
            }
        }
        selection::on_key_up(&mut self.document);
    }

    /// Move the caret to `row`, keeping the column but not past the row's trimmed length.
    fn move_to_row(&mut self, row: usize) {
        let column = self.document.cursor().column;
        let Some(line) = self.document.wrapped_lines().get(row) else {
            return;
        };
        let caret = line.start_index + column.min(line.trimmed_len());
        self.document.set_caret(caret);
    }
}

fn replace_selection_with(document: &mut Document, text: &str) {
    match document.selection() {
        Some(span) => document.replace_range(span.start, span.end, text),
        None => {
            document.clear_selection();
            document.insert_at_caret(text);
        }
    }
}

async fn should_force_soft_enter(
    document: &Document,
    services: &PaneServices<'_>,
) -> Result<bool, PromptError> {
    let Some(predicate) = services.soft_enter else {
        return Ok(false);
    };
    let text = document.text();
    match await_or_cancel(predicate.should_force_soft_enter(&text), services.cancel).await? {
        Ok(force) => {
            if force {
                tracing::debug!("soft enter forced by predicate");
            }
            Ok(force)
        }
        Err(error) => {
            tracing::warn!(%error, "soft-enter predicate failed; submitting");
            Ok(false)
        }
    }
}

async fn set_clipboard(services: &PaneServices<'_>, text: String) -> Result<(), PromptError> {
    if let Err(error) = await_or_cancel(services.clipboard.set_text(text), services.cancel).await? {
        tracing::warn!(%error, "clipboard write failed");
    }
    Ok(())
}

async fn get_clipboard(services: &PaneServices<'_>) -> Result<String, PromptError> {
    match await_or_cancel(services.clipboard.get_text(), services.cancel).await? {
        Ok(text) => Ok(text),
        Err(error) => {
            tracing::warn!(%error, "clipboard read failed");
            Ok(String::new())
        }
    }
}

fn paste_text(document: &mut Document, text: &str, indent: &str) {
    let normalized = normalize_paste(text, indent);
    if normalized.is_empty() {
        return;
    }
    let dedented = dedent(&normalized);
    replace_selection_with(document, &dedented);
}

/// Unify line endings, expand tabs and drop other control characters. Pastes without a line
/// break are returned unchanged.
pub fn normalize_paste(text: &str, indent: &str) -> String {
    if !text.contains(['\r', '\n']) {
        return text.to_string();
    }
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(ch) = chars.next() {
        match ch {
            '\r' => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
                out.push('\n');
            }
            '\n' => out.push('\n'),
            '\t' => out.push_str(indent),
            ch if ch.is_control() => {}
            ch => out.push(ch),
        }
    }
    out
}

/// Strip the leading whitespace shared by all non-empty lines. Single lines are unchanged.
pub fn dedent(text: &str) -> String {
    let lines: Vec<&str> = text.split('\n').collect();
    if lines.len() < 2 {
        return text.to_string();
    }

    let Some(indent) = lines
        .iter()
        .filter(|line| !line.is_empty())
        .map(|line| line.chars().take_while(|ch| ch.is_whitespace()).count())
        .min()
    else {
        return text.to_string();
    };

    lines
        .iter()
        .map(|line| line.chars().skip(indent).collect::<String>())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::{classify, dedent, normalize_paste, CodePane, Intent, PaneServices};
    use crate::core::clipboard::MemoryClipboard;
    use crate::core::input::{KeyCode, KeyEvent, Modifiers};
    use crate::core::keybindings::KeyBindings;
    use crate::core::terminal::MemoryTerminal;

    fn ctrl(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, Modifiers::CONTROL)
    }

    #[test]
    fn interrupt_cancels_only_without_selection() {
        let bindings = KeyBindings::default();
        let key = ctrl(KeyCode::Letter('C'));
        assert_eq!(classify(&key, &bindings, false), Intent::Cancel);
        assert_eq!(classify(&key, &bindings, true), Intent::CopySelection);
    }

    #[test]
    fn deletes_with_selection_collapse_to_delete_selection() {
        let bindings = KeyBindings::default();
        for key in [
            ctrl(KeyCode::Backspace),
            ctrl(KeyCode::Delete),
            KeyEvent::new(KeyCode::Backspace, Modifiers::NONE),
            KeyEvent::new(KeyCode::Delete, Modifiers::SHIFT),
        ] {
            assert_eq!(classify(&key, &bindings, true), Intent::DeleteSelection);
        }
        assert_eq!(
            classify(&ctrl(KeyCode::Backspace), &bindings, false),
            Intent::DeleteWordBackward
        );
    }

    #[test]
    fn cut_without_selection_does_nothing() {
        let bindings = KeyBindings::default();
        assert_eq!(classify(&ctrl(KeyCode::Letter('X')), &bindings, false), Intent::Ignore);
        let copy_all = KeyEvent::new(KeyCode::Letter('C'), Modifiers::CONTROL | Modifiers::SHIFT);
        assert_eq!(classify(&copy_all, &bindings, false), Intent::CopyAll);
    }

    #[test]
    fn enter_variants() {
        let bindings = KeyBindings::default();
        let enter = KeyEvent::new(KeyCode::Enter, Modifiers::NONE);
        assert_eq!(classify(&enter, &bindings, false), Intent::Submit);
        let shift_enter = KeyEvent::new(KeyCode::Enter, Modifiers::SHIFT);
        assert_eq!(classify(&shift_enter, &bindings, false), Intent::NewLine);
        let hard = KeyEvent::new(KeyCode::Enter, Modifiers::CONTROL | Modifiers::ALT);
        assert_eq!(classify(&hard, &bindings, false), Intent::HardSubmit);
    }

    #[test]
    fn pasted_text_wins_over_clipboard() {
        let bindings = KeyBindings::default();
        assert_eq!(
            classify(&KeyEvent::paste("x"), &bindings, false),
            Intent::PasteText("x".to_string())
        );
        assert_eq!(
            classify(&ctrl(KeyCode::Letter('V')), &bindings, false),
            Intent::PasteClipboard
        );
    }

    #[test]
    fn printable_characters_insert() {
        let bindings = KeyBindings::default();
        assert_eq!(classify(&KeyEvent::from_char('q'), &bindings, false), Intent::Insert('q'));
        let alt = KeyEvent::new(KeyCode::Letter('Q'), Modifiers::ALT).with_char('q');
        assert_eq!(classify(&alt, &bindings, false), Intent::Ignore);
    }

    #[test]
    fn dedent_strips_common_indent() {
        assert_eq!(dedent("    foo\n    bar"), "foo\nbar");
        assert_eq!(dedent("  a\n    b\n\n  c"), "a\n  b\n\nc");
        assert_eq!(dedent("foo\n  bar"), "foo\n  bar");
        assert_eq!(dedent("   single"), "   single");
    }

    #[test]
    fn paste_normalisation() {
        assert_eq!(normalize_paste("a\r\nb\rc\td\x07", "  "), "a\nb\nc  d");
    }

    #[test]
    fn single_line_paste_is_kept_verbatim() {
        assert_eq!(normalize_paste("\tx = 1\t# note", "    "), "\tx = 1\t# note");
        assert_eq!(normalize_paste("", "    "), "");
    }

    #[test]
    fn measure_console_tracks_host_scroll() {
        let mut pane = CodePane::new(5);
        let mut terminal = MemoryTerminal::new(40, 20);
        assert!(pane.measure_console(&terminal, 2));
        assert_eq!(pane.code_area_width(), 38);
        assert_eq!(pane.code_area_height(), 15);

        terminal.set_window_top(3);
        assert!(!pane.measure_console(&terminal, 2));
        assert_eq!(pane.top_coordinate(), 2);
        assert_eq!(pane.code_area_height(), 18);
    }

    #[tokio::test]
    async fn vertical_motion_clamps_to_trimmed_row() {
        let clipboard = MemoryClipboard::new();
        let bindings = KeyBindings::default();
        let services = PaneServices {
            bindings: &bindings,
            clipboard: &clipboard,
            soft_enter: None,
            cancel: None,
            indent: "    ",
        };
        let mut pane = CodePane::new(0);
        pane.measure_console(&MemoryTerminal::new(40, 10), 2);
        pane.document_mut().insert_at_caret("ab  \nlonger line");
        pane.word_wrap();

        let mut up = KeyEvent::new(KeyCode::UpArrow, Modifiers::NONE);
        pane.on_key_down(&mut up, &services).await.expect("key down");
        pane.on_key_up(&mut up, &bindings);
        assert!(up.handled);
        assert_eq!(pane.document().caret(), 2);

        let mut down = KeyEvent::new(KeyCode::DownArrow, Modifiers::NONE);
        pane.on_key_down(&mut down, &services).await.expect("key down");
        pane.on_key_up(&mut down, &bindings);
        assert_eq!(pane.document().caret(), 7);
    }
}
