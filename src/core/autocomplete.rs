//! Completion provider protocol.

use std::fmt;
use std::sync::Arc;

use futures_util::future::BoxFuture;
use futures_util::FutureExt;

use crate::core::callbacks::CallbackResult;

/// Deferred extended description, evaluated the first time the item is selected.
pub type LazyDescription = Arc<dyn Fn() -> BoxFuture<'static, CallbackResult<String>> + Send + Sync>;

#[derive(Clone)]
pub struct CompletionItem {
    /// Caret offset where the replaced word starts.
    pub start_index: usize,
    pub replacement_text: String,
    /// Text shown in the list. Empty means `replacement_text`.
    pub display_label: String,
    pub extended_description: Option<LazyDescription>,
}

impl CompletionItem {
    pub fn new(start_index: usize, replacement_text: impl Into<String>) -> Self {
        Self {
            start_index,
            replacement_text: replacement_text.into(),
            display_label: String::new(),
            extended_description: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.display_label = label.into();
        self
    }

    pub fn with_description<F>(mut self, describe: F) -> Self
    where
        F: Fn() -> BoxFuture<'static, CallbackResult<String>> + Send + Sync + 'static,
    {
        self.extended_description = Some(Arc::new(describe));
        self
    }

    /// Attach an already-known description.
    pub fn with_static_description(self, description: impl Into<String>) -> Self {
        let description = description.into();
        self.with_description(move || {
            let description = description.clone();
            async move { Ok(description) }.boxed()
        })
    }

    pub fn label(&self) -> &str {
        if self.display_label.is_empty() {
            &self.replacement_text
        } else {
            &self.display_label
        }
    }
}

impl fmt::Debug for CompletionItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompletionItem")
            .field("start_index", &self.start_index)
            .field("replacement_text", &self.replacement_text)
            .field("display_label", &self.display_label)
            .field(
                "extended_description",
                &self.extended_description.as_ref().map(|_| ".."),
            )
            .finish()
    }
}

/// Supplies completion items for `(text, caret)`. An empty list means no popup.
pub trait CompletionProvider: Send + Sync {
    fn complete(
        &self,
        text: &str,
        caret: usize,
    ) -> BoxFuture<'static, CallbackResult<Vec<CompletionItem>>>;
}

impl<F> CompletionProvider for F
where
    F: Fn(&str, usize) -> BoxFuture<'static, CallbackResult<Vec<CompletionItem>>> + Send + Sync,
{
    fn complete(
        &self,
        text: &str,
        caret: usize,
    ) -> BoxFuture<'static, CallbackResult<Vec<CompletionItem>>> {
        self(text, caret)
    }
}

/// Whether `item` still applies: its replacement starts with the typed prefix
/// `text[start_index..caret]`, compared case-insensitively.
pub fn matches_typed_prefix(item: &CompletionItem, text: &[char], caret: usize) -> bool {
    if item.start_index > caret || caret > text.len() {
        return false;
    }
    let typed: String = text[item.start_index..caret].iter().collect();
    starts_with_ignore_case(&item.replacement_text, &typed)
}

fn starts_with_ignore_case(candidate: &str, prefix: &str) -> bool {
    let mut candidate = candidate.chars().flat_map(char::to_lowercase);
    prefix
        .chars()
        .flat_map(char::to_lowercase)
        .all(|ch| candidate.next() == Some(ch))
}

#[cfg(test)]
mod tests {
    use super::{matches_typed_prefix, CompletionItem};

    #[test]
    fn filter_is_case_insensitive_prefix() {
        let items = vec![
            CompletionItem::new(0, "Print"),
            CompletionItem::new(0, "private"),
            CompletionItem::new(0, "match"),
        ];
        let text: Vec<char> = "pr".chars().collect();
        let labels: Vec<&str> = items
            .iter()
            .filter(|item| matches_typed_prefix(item, &text, 2))
            .map(|item| item.replacement_text.as_str())
            .collect();
        assert_eq!(labels, vec!["Print", "private"]);
    }

    #[test]
    fn items_starting_after_caret_are_dropped() {
        let items = vec![CompletionItem::new(3, "abc")];
        let text: Vec<char> = "ab".chars().collect();
        assert!(!matches_typed_prefix(&items[0], &text, 2));
    }

    #[test]
    fn label_defaults_to_replacement() {
        let item = CompletionItem::new(0, "value");
        assert_eq!(item.label(), "value");
        assert_eq!(item.with_label("Value()").label(), "Value()");
    }
}
