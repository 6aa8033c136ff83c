use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("output directory missing or not writable: {0}")]
    OutputDir(String),
    #[error("failed to serialize notes cache: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

/// One cached entry describing a single language version's notes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseRecord {
    pub language: String,
    pub version: String,
    pub url: String,
    pub notes: String,
}

/// In-memory accumulator of release records keyed by `<language-key>-<version>`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NotesCache {
    entries: IndexMap<String, ReleaseRecord>,
}

impl NotesCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn key(language_key: &str, version: &str) -> String {
        format!("{language_key}-{version}")
    }

    /// Insert a record; an existing entry with the same key is replaced in place.
    pub fn insert(&mut self, language_key: &str, record: ReleaseRecord) {
        let key = Self::key(language_key, &record.version);
        self.entries.insert(key, record);
    }

    pub fn get(&self, key: &str) -> Option<&ReleaseRecord> {
        self.entries.get(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Pretty JSON with two-space indentation.
    pub fn to_json(&self) -> Result<String, PersistError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Overwrite `path` with the whole cache.
    pub fn save(&self, path: &Path) -> Result<PathBuf, PersistError> {
        write_atomically(path, &self.to_json()?)
    }
}

/// Ensure output directory exists; create if missing.
pub fn ensure_output_dir(dir: &Path) -> Result<(), PersistError> {
    if dir.exists() {
        let meta = fs::metadata(dir).map_err(|e| PersistError::OutputDir(e.to_string()))?;
        if !meta.is_dir() {
            return Err(PersistError::OutputDir("path is not a directory".into()));
        }
    } else {
        fs::create_dir_all(dir).map_err(|e| PersistError::OutputDir(e.to_string()))?;
    }
    Ok(())
}

/// Write `content` to `target` through a temp file in the same directory, then rename.
pub fn write_atomically(target: &Path, content: &str) -> Result<PathBuf, PersistError> {
    let dir = match target.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    ensure_output_dir(&dir)?;

    let mut tmp = NamedTempFile::new_in(&dir)?;
    tmp.write_all(content.as_bytes())?;
    tmp.flush()?;
    tmp.as_file_mut().sync_all()?;

    // Windows refuses to rename onto an existing file.
    if target.exists() {
        fs::remove_file(target)?;
    }
    tmp.persist(target).map_err(|e| PersistError::Io(e.error))?;
    Ok(target.to_path_buf())
}
