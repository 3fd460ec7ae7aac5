//! Submission history: recall with Up/Down and the persistence boundary.

use crate::core::callbacks::CallbackResult;

/// Append-only storage for submitted entries, read once per session.
pub trait HistoryStore: Send {
    fn load(&mut self) -> CallbackResult<Vec<String>>;
    fn append(&mut self, entry: &str) -> CallbackResult<()>;
}

/// In-session history with a navigation cursor.
#[derive(Debug, Default)]
pub struct HistoryLog {
    entries: Vec<String>,
    /// Entry currently recalled into the document, `None` while editing fresh input.
    position: Option<usize>,
    /// Text that was being typed when navigation began.
    stash: Option<String>,
}

impl HistoryLog {
    pub fn new(entries: Vec<String>) -> Self {
        Self {
            entries,
            position: None,
            stash: None,
        }
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn is_navigating(&self) -> bool {
        self.position.is_some()
    }

    /// Step back one entry. `current` is stashed when navigation starts.
    pub fn previous(&mut self, current: &str) -> Option<String> {
        let target = match self.position {
            None => {
                let last = self.entries.len().checked_sub(1)?;
                self.stash = Some(current.to_string());
                last
            }
            Some(0) => return None,
            Some(position) => position - 1,
        };
        self.position = Some(target);
        self.entries.get(target).cloned()
    }

    /// Step forward one entry; past the newest entry the stashed text comes back.
    pub fn next(&mut self) -> Option<String> {
        let position = self.position?;
        if position + 1 < self.entries.len() {
            self.position = Some(position + 1);
            return self.entries.get(position + 1).cloned();
        }
        self.position = None;
        Some(self.stash.take().unwrap_or_default())
    }

    /// Leave navigation mode and forget the stashed draft.
    pub fn reset_navigation(&mut self) {
        self.position = None;
        self.stash = None;
    }

    /// Append `text` unless it is blank or repeats the newest entry.
    pub fn record(&mut self, text: &str) -> bool {
        self.reset_navigation();
        if text.trim().is_empty() || self.entries.last().is_some_and(|last| last == text) {
            return false;
        }
        self.entries.push(text.to_string());
        true
    }
}

/// Volatile store, mostly useful in tests and headless embedders.
#[derive(Debug, Clone, Default)]
pub struct MemoryHistoryStore {
    pub entries: Vec<String>,
}

impl HistoryStore for MemoryHistoryStore {
    fn load(&mut self) -> CallbackResult<Vec<String>> {
        Ok(self.entries.clone())
    }

    fn append(&mut self, entry: &str) -> CallbackResult<()> {
        self.entries.push(entry.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::HistoryLog;

    fn log() -> HistoryLog {
        HistoryLog::new(vec!["one".to_string(), "two".to_string()])
    }

    #[test]
    fn previous_walks_back_and_stops_at_oldest() {
        let mut history = log();
        assert_eq!(history.previous("draft").as_deref(), Some("two"));
        assert_eq!(history.previous("two").as_deref(), Some("one"));
        assert_eq!(history.previous("one"), None);
        assert!(history.is_navigating());
    }

    #[test]
    fn next_restores_stashed_draft() {
        let mut history = log();
        history.previous("draft");
        history.previous("two");
        assert_eq!(history.next().as_deref(), Some("two"));
        assert_eq!(history.next().as_deref(), Some("draft"));
        assert!(!history.is_navigating());
        assert_eq!(history.next(), None);
    }

    #[test]
    fn empty_history_does_not_navigate() {
        let mut history = HistoryLog::default();
        assert_eq!(history.previous("x"), None);
        assert!(!history.is_navigating());
    }

    #[test]
    fn reset_navigation_starts_again_from_newest() {
        let mut history = log();
        history.previous("draft");
        history.previous("two");
        history.reset_navigation();
        assert!(!history.is_navigating());
        assert_eq!(history.next(), None);
        assert_eq!(history.previous("").as_deref(), Some("two"));
    }

    #[test]
    fn record_skips_blank_and_repeated_entries() {
        let mut history = log();
        assert!(!history.record("  \n"));
        assert!(!history.record("two"));
        assert!(history.record("three"));
        assert_eq!(history.entries().len(), 3);
    }
}
