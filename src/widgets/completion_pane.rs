//! Completion popup state and key handling.
//!
//! The pane sits in front of the code pane: its key-down runs first and marks the keys it
//! consumes as handled. Its key-up runs after the document has been edited and refilters,
//! opens or closes the list accordingly.

use std::collections::HashMap;

use crate::core::autocomplete::{matches_typed_prefix, CompletionItem, CompletionProvider};
use crate::core::input::{KeyCode, KeyEvent};
use crate::core::keybindings::{KeyBindings, PromptAction};
use crate::document::{is_word_char, Document};
use crate::error::PromptError;
use crate::runtime::cancel::{await_or_cancel, CancellationSignal};

pub struct CompletionServices<'a> {
    pub provider: Option<&'a dyn CompletionProvider>,
    pub bindings: &'a KeyBindings,
    pub cancel: Option<&'a CancellationSignal>,
    /// Visible rows in the list; also the PageUp/PageDown step.
    pub rows: usize,
}

#[derive(Debug, Default)]
pub struct CompletionPane {
    /// Provider results for the current word, kept until the pane closes.
    items: Vec<CompletionItem>,
    /// Indices into `items` that match the typed prefix.
    filtered: Vec<usize>,
    selected: usize,
    scroll_top: usize,
    is_open: bool,
    descriptions: HashMap<usize, String>,
}

impl CompletionPane {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_open(&self) -> bool {
        self.is_open
    }

    pub fn close(&mut self) {
        *self = Self::default();
    }

    pub fn selected_item(&self) -> Option<&CompletionItem> {
        self.filtered
            .get(self.selected)
            .and_then(|&idx| self.items.get(idx))
    }

    /// Start of the word being completed.
    pub fn start_index(&self) -> Option<usize> {
        self.selected_item().map(|item| item.start_index)
    }

    /// Items inside the scroll window with their selection flag.
    pub fn visible_items(&self, rows: usize) -> Vec<(&CompletionItem, bool)> {
        self.filtered
            .iter()
            .enumerate()
            .skip(self.scroll_top)
            .take(rows)
            .filter_map(|(row, &idx)| self.items.get(idx).map(|item| (item, row == self.selected)))
            .collect()
    }

    /// Description of the selected item, once it has been fetched.
    pub fn selected_description(&self) -> Option<&str> {
        let idx = *self.filtered.get(self.selected)?;
        self.descriptions
            .get(&idx)
            .map(String::as_str)
            .filter(|text| !text.is_empty())
    }

    pub async fn on_key_down(
        &mut self,
        key: &mut KeyEvent,
        document: &mut Document,
        services: &CompletionServices<'_>,
    ) -> Result<(), PromptError> {
        if key.handled {
            return Ok(());
        }
        let pattern = key.pattern();
        let is = |action| services.bindings.matches(pattern, action);

        if !self.is_open {
            if is(PromptAction::TriggerCompletion) {
                key.handled = true;
                self.open(document, services).await?;
            }
            return Ok(());
        }

        if is(PromptAction::CommitCompletion) {
            if let Some(item) = self.selected_item() {
                let start = item.start_index;
                let replacement = item.replacement_text.clone();
                let caret = document.caret();
                document.replace_range(start, caret, &replacement);
            }
            self.close();
            key.handled = true;
        } else if is(PromptAction::CloseCompletion) {
            self.close();
            key.handled = true;
        } else if pattern.modifiers.is_empty() && key.key == KeyCode::UpArrow {
            self.move_selection(-1, true, services.rows);
            key.handled = true;
        } else if pattern.modifiers.is_empty() && key.key == KeyCode::DownArrow {
            self.move_selection(1, true, services.rows);
            key.handled = true;
        } else if is(PromptAction::CompletionPageUp) {
            self.move_selection(-(services.rows as isize), false, services.rows);
            key.handled = true;
        } else if is(PromptAction::CompletionPageDown) {
            self.move_selection(services.rows as isize, false, services.rows);
            key.handled = true;
        } else if matches!(
            key.key,
            KeyCode::LeftArrow | KeyCode::RightArrow | KeyCode::Home | KeyCode::End
        ) {
            self.close();
        }
        Ok(())
    }

    pub async fn on_key_up(
        &mut self,
        key: &KeyEvent,
        document: &Document,
        services: &CompletionServices<'_>,
    ) -> Result<(), PromptError> {
        if self.is_open {
            self.refilter(document);
        } else if !key.handled && key.printable().is_some_and(is_word_char) {
            self.open(document, services).await?;
        }
        if self.is_open {
            self.ensure_description(services.cancel).await?;
        }
        Ok(())
    }

    async fn open(
        &mut self,
        document: &Document,
        services: &CompletionServices<'_>,
    ) -> Result<(), PromptError> {
        self.close();
        let Some(provider) = services.provider else {
            return Ok(());
        };
        let text = document.text();
        let caret = document.caret();
        let items = match await_or_cancel(provider.complete(&text, caret), services.cancel).await? {
            Ok(items) => items,
            Err(error) => {
                tracing::warn!(%error, "completion provider failed");
                Vec::new()
            }
        };
        self.items = items;
        self.is_open = true;
        self.refilter(document);
        Ok(())
    }

    fn refilter(&mut self, document: &Document) {
        let caret = document.caret();
        let previous = self.selected_item().map(|item| item.replacement_text.clone());

        self.filtered = self
            .items
            .iter()
            .enumerate()
            .filter(|(_, item)| matches_typed_prefix(item, document.chars(), caret))
            .map(|(idx, _)| idx)
            .collect();

        if self.filtered.is_empty() {
            self.close();
            return;
        }

        self.selected = previous
            .and_then(|text| {
                self.filtered
                    .iter()
                    .position(|&idx| self.items[idx].replacement_text == text)
            })
            .unwrap_or(0);
        self.scroll_top = self.scroll_top.min(self.selected);
    }

    fn move_selection(&mut self, delta: isize, wrap: bool, rows: usize) {
        let count = self.filtered.len() as isize;
        if count == 0 {
            return;
        }
        let target = self.selected as isize + delta;
        let target = if wrap {
            target.rem_euclid(count)
        } else {
            target.clamp(0, count - 1)
        };
        self.selected = target as usize;

        let rows = rows.max(1);
        if self.selected < self.scroll_top {
            self.scroll_top = self.selected;
        } else if self.selected >= self.scroll_top + rows {
            self.scroll_top = self.selected + 1 - rows;
        }
    }

    async fn ensure_description(
        &mut self,
        cancel: Option<&CancellationSignal>,
    ) -> Result<(), PromptError> {
        let Some(&idx) = self.filtered.get(self.selected) else {
            return Ok(());
        };
        if self.descriptions.contains_key(&idx) {
            return Ok(());
        }
        let Some(describe) = self.items[idx].extended_description.clone() else {
            self.descriptions.insert(idx, String::new());
            return Ok(());
        };
        let description = match await_or_cancel(describe(), cancel).await? {
            Ok(text) => text,
            Err(error) => {
                tracing::warn!(%error, "completion description failed");
                String::new()
            }
        };
        self.descriptions.insert(idx, description);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{CompletionPane, CompletionServices};
    use crate::core::autocomplete::{CompletionItem, CompletionProvider};
    use crate::core::callbacks::CallbackResult;
    use crate::core::input::{KeyCode, KeyEvent, Modifiers};
    use crate::core::keybindings::KeyBindings;
    use crate::document::Document;
    use futures_util::future::BoxFuture;
    use futures_util::FutureExt;

    struct Words;

    impl CompletionProvider for Words {
        fn complete(
            &self,
            text: &str,
            caret: usize,
        ) -> BoxFuture<'static, CallbackResult<Vec<CompletionItem>>> {
            let chars: Vec<char> = text.chars().collect();
            let mut start = caret;
            while start > 0 && chars[start - 1].is_alphanumeric() {
                start -= 1;
            }
            let items = ["apple", "apricot", "banana"]
                .into_iter()
                .map(|word| CompletionItem::new(start, word).with_static_description(format!("about {word}")))
                .collect();
            async move { Ok(items) }.boxed()
        }
    }

    async fn type_char(
        pane: &mut CompletionPane,
        document: &mut Document,
        services: &CompletionServices<'_>,
        ch: char,
    ) {
        let mut key = KeyEvent::from_char(ch);
        pane.on_key_down(&mut key, document, services).await.expect("down");
        if !key.handled {
            document.insert_at_caret(&ch.to_string());
        }
        pane.on_key_up(&key, document, services).await.expect("up");
    }

    #[tokio::test]
    async fn typing_opens_and_filters() {
        let bindings = KeyBindings::default();
        let services = CompletionServices {
            provider: Some(&Words),
            bindings: &bindings,
            cancel: None,
            rows: 8,
        };
        let mut pane = CompletionPane::new();
        let mut document = Document::new();

        type_char(&mut pane, &mut document, &services, 'a').await;
        assert!(pane.is_open());
        assert_eq!(pane.visible_items(8).len(), 2);
        assert_eq!(pane.selected_description(), Some("about apple"));

        type_char(&mut pane, &mut document, &services, 'p').await;
        type_char(&mut pane, &mut document, &services, 'r').await;
        assert_eq!(pane.visible_items(8).len(), 1);
        assert_eq!(pane.selected_item().map(|i| i.replacement_text.as_str()), Some("apricot"));

        type_char(&mut pane, &mut document, &services, 'x').await;
        assert!(!pane.is_open());
    }

    #[tokio::test]
    async fn commit_replaces_word_as_one_undo_step() {
        let bindings = KeyBindings::default();
        let services = CompletionServices {
            provider: Some(&Words),
            bindings: &bindings,
            cancel: None,
            rows: 8,
        };
        let mut pane = CompletionPane::new();
        let mut document = Document::new();
        type_char(&mut pane, &mut document, &services, 'a').await;

        let mut down = KeyEvent::new(KeyCode::DownArrow, Modifiers::NONE);
        pane.on_key_down(&mut down, &mut document, &services).await.expect("down");
        assert!(down.handled);

        let mut tab = KeyEvent::new(KeyCode::Tab, Modifiers::NONE);
        pane.on_key_down(&mut tab, &mut document, &services).await.expect("tab");
        assert!(tab.handled);
        assert!(!pane.is_open());
        assert_eq!(document.text(), "apricot");

        document.undo();
        assert_eq!(document.text(), "a");
    }

    #[tokio::test]
    async fn selection_wraps_and_escape_closes() {
        let bindings = KeyBindings::default();
        let services = CompletionServices {
            provider: Some(&Words),
            bindings: &bindings,
            cancel: None,
            rows: 8,
        };
        let mut pane = CompletionPane::new();
        let mut document = Document::new();

        let mut trigger = KeyEvent::new(KeyCode::Spacebar, Modifiers::CONTROL);
        pane.on_key_down(&mut trigger, &mut document, &services).await.expect("trigger");
        assert!(trigger.handled);
        assert_eq!(pane.visible_items(8).len(), 3);

        let mut up = KeyEvent::new(KeyCode::UpArrow, Modifiers::NONE);
        pane.on_key_down(&mut up, &mut document, &services).await.expect("up");
        assert_eq!(pane.selected_item().map(|i| i.replacement_text.as_str()), Some("banana"));

        let mut escape = KeyEvent::new(KeyCode::Escape, Modifiers::NONE);
        pane.on_key_down(&mut escape, &mut document, &services).await.expect("escape");
        assert!(escape.handled);
        assert!(!pane.is_open());
    }

    #[tokio::test]
    async fn horizontal_motion_closes_without_consuming() {
        let bindings = KeyBindings::default();
        let services = CompletionServices {
            provider: Some(&Words),
            bindings: &bindings,
            cancel: None,
            rows: 8,
        };
        let mut pane = CompletionPane::new();
        let mut document = Document::new();
        type_char(&mut pane, &mut document, &services, 'b').await;
        assert!(pane.is_open());

        let mut left = KeyEvent::new(KeyCode::LeftArrow, Modifiers::NONE);
        pane.on_key_down(&mut left, &mut document, &services).await.expect("left");
        assert!(!left.handled);
        assert!(!pane.is_open());
    }
}
