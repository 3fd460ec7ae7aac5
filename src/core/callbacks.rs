//! Host callbacks bundled for a prompt session.

use futures_util::future::BoxFuture;

use crate::core::autocomplete::CompletionProvider;
use crate::core::highlight::HighlightProvider;
use crate::core::input::KeyPattern;
use crate::core::keybindings::{KeyPressCallbacks, KeyPressOutcome};

/// Error type host callbacks may fail with. Failures are logged and swallowed by the session.
pub type CallbackError = Box<dyn std::error::Error + Send + Sync>;

pub type CallbackResult<T> = Result<T, CallbackError>;

/// Decides whether a plain Enter inserts a newline instead of submitting.
pub trait SoftEnterPredicate: Send + Sync {
    fn should_force_soft_enter(&self, text: &str) -> BoxFuture<'static, CallbackResult<bool>>;
}

impl<F> SoftEnterPredicate for F
where
    F: Fn(&str) -> BoxFuture<'static, CallbackResult<bool>> + Send + Sync,
{
    fn should_force_soft_enter(&self, text: &str) -> BoxFuture<'static, CallbackResult<bool>> {
        self(text)
    }
}

/// Everything the embedder plugs into a session. All parts are optional.
#[derive(Default)]
pub struct PromptCallbacks {
    pub completion: Option<Box<dyn CompletionProvider>>,
    pub highlight: Option<Box<dyn HighlightProvider>>,
    pub soft_enter: Option<Box<dyn SoftEnterPredicate>>,
    pub key_press: KeyPressCallbacks,
}

impl PromptCallbacks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_completion(mut self, provider: impl CompletionProvider + 'static) -> Self {
        self.completion = Some(Box::new(provider));
        self
    }

    pub fn with_highlight(mut self, provider: impl HighlightProvider + 'static) -> Self {
        self.highlight = Some(Box::new(provider));
        self
    }

    pub fn with_soft_enter(mut self, predicate: impl SoftEnterPredicate + 'static) -> Self {
        self.soft_enter = Some(Box::new(predicate));
        self
    }

    pub fn with_key_press<P, F>(mut self, pattern: P, callback: F) -> Self
    where
        P: Into<KeyPattern>,
        F: Fn(&str, usize) -> BoxFuture<'static, CallbackResult<KeyPressOutcome>>
            + Send
            + Sync
            + 'static,
    {
        self.key_press.insert(pattern, callback);
        self
    }
}
