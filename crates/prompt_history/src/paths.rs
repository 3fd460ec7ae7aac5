use std::path::{Path, PathBuf};

pub const HISTORY_DIR: &str = ".tape_prompt";
pub const HISTORY_FILE_NAME: &str = "history.jsonl";

/// Default history file location under `root` (typically the user's home directory).
#[must_use]
pub fn history_file(root: &Path) -> PathBuf {
    root.join(HISTORY_DIR).join(HISTORY_FILE_NAME)
}
