//! Session orchestration: cancellation, history and the prompt loop.

pub mod cancel;
pub mod history;
pub mod prompt;

pub use cancel::CancellationSignal;
pub use history::{HistoryLog, HistoryStore, MemoryHistoryStore};
pub use prompt::{Prompt, PromptResult};
