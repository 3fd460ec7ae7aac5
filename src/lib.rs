//! Embeddable multi-line terminal prompt.
//!
//! Invariant: single output gate: only `core::output::OutputGate::flush(..)` writes to the
//! terminal.
//!
//! # Public API Overview
//! - Run a session with [`Prompt::read_line`], feeding it [`KeyEvent`]s decoded by
//!   [`parse_key_events`] from raw terminal input.
//! - Plug in completion, highlighting, soft-enter and key commands through [`PromptCallbacks`].
//! - Edit text headlessly with [`Document`]; render frames with [`DiffRenderer`].
//! - Use the ANSI codec and width helpers for formatted output.

#![allow(clippy::too_many_arguments, clippy::type_complexity)]

pub mod config;
pub mod error;
pub mod logging;

pub mod core;
pub mod document;
pub mod platform;
pub mod render;
pub mod runtime;
pub mod widgets;

/// Session entry point and result.
pub use crate::runtime::prompt::{Prompt, PromptResult};
pub use crate::runtime::cancel::CancellationSignal;
pub use crate::error::PromptError;

/// Configuration.
pub use crate::config::{env_config, EnvConfig, PromptConfig};

/// Host callbacks.
pub use crate::core::autocomplete::{CompletionItem, CompletionProvider};
pub use crate::core::callbacks::{
    CallbackError, CallbackResult, PromptCallbacks, SoftEnterPredicate,
};
pub use crate::core::clipboard::{Clipboard, MemoryClipboard};
pub use crate::core::highlight::{FormatSpan, HighlightProvider};
pub use crate::core::keybindings::{KeyBindings, KeyPressOutcome, PromptAction};

/// History.
pub use crate::runtime::history::{HistoryLog, HistoryStore, MemoryHistoryStore};

/// Keyboard input types and raw input decoding.
pub use crate::core::input::{KeyCode, KeyEvent, KeyPattern, Modifiers};
pub use crate::core::input_event::parse_key_events;

/// Terminal interfaces.
pub use crate::core::terminal::{MemoryTerminal, Terminal};
pub use crate::platform::StdoutTerminal;

/// Document model and dispatch.
pub use crate::document::{Document, SelectionSpan, WrappedLine};
pub use crate::widgets::{CodePane, CompletionPane};

/// Render-layer types.
pub use crate::render::{DiffRenderer, Frame, Line, Span, Viewport};

/// ANSI codec.
pub use crate::core::text::ansi::{AnsiColor, ConsoleFormat};
/// Visible width helper that ignores ANSI control sequences.
pub use crate::core::text::width::visible_width;
