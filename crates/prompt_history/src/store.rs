use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, ErrorKind, Write};
use std::path::{Path, PathBuf};

use tape_prompt::{CallbackResult, HistoryStore};

use crate::error::HistoryStoreError;
use crate::schema::HistoryRecord;

/// Append-only JSON-lines history file.
pub struct FileHistoryStore {
    path: PathBuf,
    entries: Vec<String>,
}

impl FileHistoryStore {
    /// Read all records from `path`. A missing file is an empty history; it is created by the
    /// first append.
    pub fn open(path: &Path) -> Result<Self, HistoryStoreError> {
        let path = path.to_path_buf();
        let read_file = match File::open(&path) {
            Ok(file) => file,
            Err(source) if source.kind() == ErrorKind::NotFound => {
                return Ok(Self {
                    path,
                    entries: Vec::new(),
                });
            }
            Err(source) => {
                return Err(HistoryStoreError::io("opening history file", &path, source));
            }
        };

        let mut entries = Vec::new();
        for (line_index, line_result) in BufReader::new(read_file).lines().enumerate() {
            let line_number = line_index + 1;
            let line = line_result
                .map_err(|source| HistoryStoreError::io_line(&path, line_number, source))?;
            if line.trim().is_empty() {
                continue;
            }
            entries.push(parse_json_line(&path, line_number, &line)?.text);
        }

        Ok(Self { path, entries })
    }

    pub fn append_entry(&mut self, text: &str) -> Result<(), HistoryStoreError> {
        let mut line = serde_json::to_string(&HistoryRecord::new(text))
            .map_err(|source| HistoryStoreError::json_serialize(&self.path, source))?;
        line.push('\n');

        if let Some(parent) = self.path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| {
                HistoryStoreError::io("creating history directory", parent, source)
            })?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|source| {
                HistoryStoreError::io("opening history file for append", &self.path, source)
            })?;
        file.write_all(line.as_bytes())
            .map_err(|source| HistoryStoreError::io("appending history entry", &self.path, source))?;

        self.entries.push(text.to_string());
        Ok(())
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn entries(&self) -> &[String] {
        &self.entries
    }
}

impl HistoryStore for FileHistoryStore {
    fn load(&mut self) -> CallbackResult<Vec<String>> {
        Ok(self.entries.clone())
    }

    fn append(&mut self, entry: &str) -> CallbackResult<()> {
        self.append_entry(entry)?;
        Ok(())
    }
}

pub(crate) fn parse_json_line(
    path: &Path,
    line_number: usize,
    line: &str,
) -> Result<HistoryRecord, HistoryStoreError> {
    serde_json::from_str::<HistoryRecord>(line)
        .map_err(|source| HistoryStoreError::json_line(path, line_number, source))
}
