//! Clipboard access boundary.

use std::sync::{Arc, Mutex};

use futures_util::future::BoxFuture;
use futures_util::FutureExt;

use crate::core::callbacks::{CallbackError, CallbackResult};

/// System clipboard as seen by the prompt. Each call is one complete access.
pub trait Clipboard: Send + Sync {
    fn get_text(&self) -> BoxFuture<'static, CallbackResult<String>>;
    fn set_text(&self, text: String) -> BoxFuture<'static, CallbackResult<()>>;
}

/// Process-local clipboard. Clones share contents.
#[derive(Debug, Clone, Default)]
pub struct MemoryClipboard {
    contents: Arc<Mutex<String>>,
}

impl MemoryClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_text(text: impl Into<String>) -> Self {
        Self {
            contents: Arc::new(Mutex::new(text.into())),
        }
    }

    pub fn contents(&self) -> String {
        self.contents
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }
}

fn poisoned() -> CallbackError {
    "clipboard lock poisoned".into()
}

impl Clipboard for MemoryClipboard {
    fn get_text(&self) -> BoxFuture<'static, CallbackResult<String>> {
        let result = self
            .contents
            .lock()
            .map(|guard| guard.clone())
            .map_err(|_| poisoned());
        async move { result }.boxed()
    }

    fn set_text(&self, text: String) -> BoxFuture<'static, CallbackResult<()>> {
        let result = self
            .contents
            .lock()
            .map(|mut guard| *guard = text)
            .map_err(|_| poisoned());
        async move { result }.boxed()
    }
}
