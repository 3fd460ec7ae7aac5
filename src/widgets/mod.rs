//! Key handling panes.

pub mod code_pane;
pub mod completion_pane;

pub use code_pane::{CodePane, Intent, PaneServices};
pub use completion_pane::{CompletionPane, CompletionServices};
