//! Prompt session: the read-key, dispatch, render loop.

use tokio::sync::mpsc;

use crate::config::PromptConfig;
use crate::core::callbacks::PromptCallbacks;
use crate::core::clipboard::Clipboard;
use crate::core::highlight::resolve_formats;
use crate::core::input::{KeyCode, KeyEvent};
use crate::core::output::OutputGate;
use crate::core::terminal::Terminal;
use crate::core::text::ansi::ConsoleFormat;
use crate::core::text::width::visible_width;
use crate::error::PromptError;
use crate::render::{
    completion_overlay, render_code_rows, CodeStyle, CodeView, DiffRenderer, Frame, OverlayStyle,
    Viewport,
};
use crate::runtime::cancel::{await_or_cancel, is_cancelled, CancellationSignal};
use crate::runtime::history::{HistoryLog, HistoryStore};
use crate::widgets::code_pane::{CodePane, PaneServices};
use crate::widgets::completion_pane::{CompletionPane, CompletionServices};

/// Outcome of one `read_line` session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptResult {
    /// `false` when the user cancelled with the interrupt key.
    pub is_success: bool,
    pub text: String,
    /// Submitted with the hard-submit chord, bypassing the soft-enter predicate.
    pub is_hard_enter: bool,
}

impl PromptResult {
    pub fn cancelled() -> Self {
        Self {
            is_success: false,
            text: String::new(),
            is_hard_enter: false,
        }
    }

    pub fn submitted(text: String, is_hard_enter: bool) -> Self {
        Self {
            is_success: true,
            text,
            is_hard_enter,
        }
    }
}

/// Per-session editing state. Dropped when `read_line` returns.
struct Session {
    pane: CodePane,
    completion: CompletionPane,
    renderer: DiffRenderer,
    view: CodeView,
    output: OutputGate,
    formats: Vec<Option<ConsoleFormat>>,
    highlighted_text: Option<String>,
}

impl Session {
    fn new(top: usize) -> Self {
        Self {
            pane: CodePane::new(top),
            completion: CompletionPane::new(),
            renderer: DiffRenderer::new(top),
            view: CodeView::default(),
            output: OutputGate::new(),
            formats: Vec::new(),
            highlighted_text: None,
        }
    }
}

pub struct Prompt<T: Terminal, C: Clipboard> {
    terminal: T,
    clipboard: C,
    config: PromptConfig,
    callbacks: PromptCallbacks,
    history_store: Option<Box<dyn HistoryStore>>,
    history: HistoryLog,
    history_loaded: bool,
}

impl<T: Terminal, C: Clipboard> Prompt<T, C> {
    pub fn new(terminal: T, clipboard: C) -> Self {
        Self {
            terminal,
            clipboard,
            config: PromptConfig::default(),
            callbacks: PromptCallbacks::default(),
            history_store: None,
            history: HistoryLog::default(),
            history_loaded: false,
        }
    }

    pub fn with_config(mut self, config: PromptConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_callbacks(mut self, callbacks: PromptCallbacks) -> Self {
        self.callbacks = callbacks;
        self
    }

    /// Persist submissions to `store`; its entries are loaded by the next `read_line`.
    pub fn with_history_store(mut self, store: impl HistoryStore + 'static) -> Self {
        self.history_store = Some(Box::new(store));
        self.history_loaded = false;
        self
    }

    pub fn terminal(&self) -> &T {
        &self.terminal
    }

    pub fn terminal_mut(&mut self) -> &mut T {
        &mut self.terminal
    }

    pub fn clipboard(&self) -> &C {
        &self.clipboard
    }

    pub fn config(&self) -> &PromptConfig {
        &self.config
    }

    pub fn history(&self) -> &[String] {
        self.history.entries()
    }

    /// Edit one prompt entry. Key events are consumed from `keys` one at a time; each is fully
    /// dispatched and rendered before the next is read.
    ///
    /// Returns `Err(PromptError::Cancelled)` when `cancel` is raised and
    /// `Err(PromptError::InputClosed)` when the channel closes first. Edits made before either
    /// remain in the abandoned session only.
    pub async fn read_line(
        &mut self,
        keys: &mut mpsc::Receiver<KeyEvent>,
        cancel: Option<&CancellationSignal>,
    ) -> Result<PromptResult, PromptError> {
        self.load_history();
        self.history.reset_navigation();
        let mut session = Session::new(self.terminal.cursor_top());
        self.refresh_highlight(&mut session, cancel).await?;
        self.draw(&mut session);

        loop {
            if is_cancelled(cancel) {
                return Err(PromptError::Cancelled);
            }
            let Some(key) = await_or_cancel(keys.recv(), cancel).await? else {
                return Err(PromptError::InputClosed);
            };

            self.handle_key(&mut session, key, cancel).await?;

            if let Some(result) = session.pane.take_result() {
                self.finish(&mut session);
                self.record_history(&result);
                return Ok(result);
            }

            self.refresh_highlight(&mut session, cancel).await?;
            self.draw(&mut session);
        }
    }

    fn load_history(&mut self) {
        if self.history_loaded {
            return;
        }
        self.history_loaded = true;
        let Some(store) = self.history_store.as_mut() else {
            return;
        };
        match store.load() {
            Ok(entries) => self.history = HistoryLog::new(entries),
            Err(error) => tracing::warn!(%error, "history store load failed"),
        }
    }

    async fn handle_key(
        &mut self,
        session: &mut Session,
        mut key: KeyEvent,
        cancel: Option<&CancellationSignal>,
    ) -> Result<(), PromptError> {
        if let Some(callback) = self.callbacks.key_press.get(key.pattern()) {
            let document = session.pane.document();
            let pending = callback(&document.text(), document.caret());
            match await_or_cancel(pending, cancel).await? {
                Ok(Some(result)) => {
                    session.pane.set_result(result);
                    return Ok(());
                }
                Ok(None) => key.handled = true,
                Err(error) => tracing::warn!(%error, "key press callback failed"),
            }
        }

        let bindings = &self.config.key_bindings;
        let completion_services = CompletionServices {
            provider: self.callbacks.completion.as_deref(),
            bindings,
            cancel,
            rows: self.config.completion_rows(),
        };
        let pane_services = PaneServices {
            bindings,
            clipboard: &self.clipboard,
            soft_enter: self.callbacks.soft_enter.as_deref(),
            cancel,
            indent: &self.config.indent,
        };

        session
            .completion
            .on_key_down(&mut key, session.pane.document_mut(), &completion_services)
            .await?;
        session.pane.on_key_down(&mut key, &pane_services).await?;
        if session.pane.result().is_some() {
            return Ok(());
        }
        session.pane.word_wrap();

        session
            .completion
            .on_key_up(&key, session.pane.document(), &completion_services)
            .await?;
        session.pane.on_key_up(&mut key, bindings);

        if !key.handled && !session.completion.is_open() && key.modifiers.is_empty() {
            let document = session.pane.document();
            let row = document.cursor().row;
            let last_row = document.wrapped_lines().len().saturating_sub(1);
            let recalled = match key.key {
                KeyCode::UpArrow if row == 0 => self.history.previous(&document.text()),
                KeyCode::DownArrow if row == last_row => self.history.next(),
                _ => None,
            };
            if let Some(text) = recalled {
                session.pane.document_mut().set_text(&text);
                session.pane.word_wrap();
            }
        }
        Ok(())
    }

    async fn refresh_highlight(
        &self,
        session: &mut Session,
        cancel: Option<&CancellationSignal>,
    ) -> Result<(), PromptError> {
        let text = session.pane.document().text();
        if session.highlighted_text.as_deref() == Some(text.as_str()) {
            return Ok(());
        }
        let len = session.pane.document().len();
        session.formats = match self.callbacks.highlight.as_deref() {
            None => Vec::new(),
            Some(provider) => match await_or_cancel(provider.highlight(&text), cancel).await? {
                Ok(spans) => resolve_formats(&spans, len),
                Err(error) => {
                    tracing::warn!(%error, "highlight provider failed");
                    Vec::new()
                }
            },
        };
        session.highlighted_text = Some(text);
        Ok(())
    }

    fn draw(&mut self, session: &mut Session) {
        let prompt_width = visible_width(&self.config.prompt);
        if session.pane.measure_console(&self.terminal, prompt_width) {
            session.pane.word_wrap();
        }
        let clear_screen = session.pane.take_clear_screen_request();

        let width = self.terminal.columns().max(1) as usize;
        let height = self.terminal.rows().max(1) as usize;
        let document = session.pane.document();
        let total_rows = document.wrapped_lines().len();
        let visible_rows = total_rows.min(height);
        session
            .view
            .scroll_to_caret(document.cursor().row, total_rows, visible_rows);
        let range = session.view.visible_range(total_rows, visible_rows);

        let style = CodeStyle {
            prompt: &self.config.prompt,
            selection_format: self.config.selection_format,
            formats: &session.formats,
        };
        let (lines, mut cursor) = render_code_rows(document, &style, range);
        if let Some(position) = cursor.as_mut() {
            position.column = position.column.min(width - 1);
        }

        let overlay_style = OverlayStyle {
            prompt_width,
            width,
            item_rows: self.config.completion_rows(),
            description_lines: self.config.completion_description_lines,
            selected_format: self.config.selected_completion_format,
        };
        let overlay = completion_overlay(
            &session.completion,
            document,
            &overlay_style,
            height.saturating_sub(lines.len()),
        );

        let frame = Frame::new(lines).with_cursor(cursor).with_overlay(overlay);
        let viewport = Viewport {
            width,
            height,
            window_top: self.terminal.window_top(),
        };
        let cmds = session.renderer.render(frame, viewport, clear_screen);
        session.output.extend(cmds);
        session.output.flush(&mut self.terminal);
        session.pane.set_top_coordinate(session.renderer.top());
    }

    /// Final frame without popup or selection, then move the cursor below it.
    fn finish(&mut self, session: &mut Session) {
        session.completion.close();
        session.pane.document_mut().clear_selection();
        self.draw(session);
        let height = self.terminal.rows().max(1) as usize;
        let cmds = session.renderer.finish(height);
        session.output.extend(cmds);
        session.output.flush(&mut self.terminal);
    }

    fn record_history(&mut self, result: &PromptResult) {
        if !result.is_success || !self.history.record(&result.text) {
            return;
        }
        if let Some(store) = self.history_store.as_mut() {
            if let Err(error) = store.append(&result.text) {
                tracing::warn!(%error, "history store append failed");
            }
        }
    }
}
