use serde::{Deserialize, Serialize};

/// One submitted entry, stored as a single JSON line so multi-line text survives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HistoryRecord {
    pub text: String,
}

impl HistoryRecord {
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}
