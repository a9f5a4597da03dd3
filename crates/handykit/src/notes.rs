//! Flat-file note store

use crate::error::ToolError;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const NOTE_SAVED_MESSAGE: &str = "A note was saved!";
pub const NO_NOTES_READ_MESSAGE: &str = "No notes could be read!";
pub const NO_NOTES_YET_MESSAGE: &str = "No notes yet!";

/// Notes kept one per line in a text file
///
/// The file is created empty on first use.
#[derive(Debug, Clone)]
pub struct NotesStore {
    path: PathBuf,
}

impl NotesStore {
    /// Create a store backed by `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create the backing file if it does not exist
    pub fn ensure_exists(&self) -> Result<(), ToolError> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "Creating notes file");
            fs::write(&self.path, "")?;
        }
        Ok(())
    }

    /// Append a note
    pub fn add_note(&self, message: &str) -> Result<&'static str, ToolError> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(format!("{message}\n").as_bytes())?;
        Ok(NOTE_SAVED_MESSAGE)
    }

    /// All notes, trimmed
    pub fn read_notes(&self) -> Result<String, ToolError> {
        let content = self.content()?;
        if content.is_empty() {
            Ok(NO_NOTES_READ_MESSAGE.to_string())
        } else {
            Ok(content)
        }
    }

    /// The most recent note
    pub fn latest_note(&self) -> Result<String, ToolError> {
        let content = self.content()?;
        Ok(content
            .lines()
            .rev()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .unwrap_or(NO_NOTES_YET_MESSAGE)
            .to_string())
    }

    /// Prompt asking for a summary of every note
    pub fn summary_prompt(&self) -> Result<String, ToolError> {
        let content = self.content()?;
        if content.is_empty() {
            Ok(NO_NOTES_YET_MESSAGE.to_string())
        } else {
            Ok(format!("Summarize the current notes: {content}"))
        }
    }

    fn content(&self) -> Result<String, ToolError> {
        self.ensure_exists()?;
        Ok(fs::read_to_string(&self.path)?.trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store() -> (TempDir, NotesStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = NotesStore::new(dir.path().join("test_notes.txt"));
        (dir, store)
    }

    #[test]
    fn test_ensure_exists_creates_empty_file() {
        let (_dir, store) = store();
        store.ensure_exists().unwrap();
        assert!(store.path().exists());
        assert_eq!(fs::read_to_string(store.path()).unwrap(), "");
    }

    #[test]
    fn test_ensure_exists_keeps_content() {
        let (_dir, store) = store();
        fs::write(store.path(), "kept\n").unwrap();
        store.ensure_exists().unwrap();
        assert_eq!(fs::read_to_string(store.path()).unwrap(), "kept\n");
    }

    #[test]
    fn test_add_note_appends() {
        let (_dir, store) = store();
        assert_eq!(store.add_note("Test note").unwrap(), NOTE_SAVED_MESSAGE);
        assert_eq!(fs::read_to_string(store.path()).unwrap(), "Test note\n");

        store.add_note("Second note").unwrap();
        assert_eq!(
            fs::read_to_string(store.path()).unwrap(),
            "Test note\nSecond note\n"
        );
    }

    #[test]
    fn test_read_notes() {
        let (_dir, store) = store();
        assert_eq!(store.read_notes().unwrap(), NO_NOTES_READ_MESSAGE);

        fs::write(store.path(), "Test note\nSecond note\n").unwrap();
        assert_eq!(store.read_notes().unwrap(), "Test note\nSecond note");
    }

    #[test]
    fn test_latest_note() {
        let (_dir, store) = store();
        assert_eq!(store.latest_note().unwrap(), NO_NOTES_YET_MESSAGE);

        store.add_note("first").unwrap();
        store.add_note("  second  ").unwrap();
        assert_eq!(store.latest_note().unwrap(), "second");
    }

    #[test]
    fn test_summary_prompt() {
        let (_dir, store) = store();
        assert_eq!(store.summary_prompt().unwrap(), NO_NOTES_YET_MESSAGE);

        store.add_note("buy milk").unwrap();
        assert_eq!(
            store.summary_prompt().unwrap(),
            "Summarize the current notes: buy milk"
        );
    }

    #[test]
    fn test_unwritable_path_is_error() {
        let (dir, _) = store();
        let store = NotesStore::new(dir.path().join("missing").join("notes.txt"));
        let err = store.add_note("x").unwrap_err();
        assert_eq!(err.kind(), "InternalFailure");
    }
}
