//! The `Note` value type.
//!
//! A note is a plain-text file described by its logical identity: a title
//! (the extension-stripped path relative to the notebook root), an
//! extension, and the absolute path the two resolve to. Contents and
//! modification time are never cached — the filesystem is the durable
//! source of truth, so both are read through to disk on every access.

use chrono::{DateTime, Utc};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

/// One note, backed by exactly one file on disk.
///
/// Notes are cheap values derived from a path; they hold no file handle and
/// need no explicit release. Two notes are equal when they point at the
/// same absolute path.
#[derive(Debug, Clone)]
pub struct Note {
    title: String,
    extension: String,
    path: PathBuf,
}

impl Note {
    pub(crate) fn new(title: String, extension: String, path: PathBuf) -> Self {
        Note {
            title,
            extension,
            path,
        }
    }

    /// The extension-stripped path of the note relative to the notebook
    /// root, e.g. `meetings/2025-standup`.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// The file extension, always with a leading dot (e.g. `.txt`).
    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// Absolute path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read and return the note's contents.
    ///
    /// Bytes are decoded as UTF-8 with invalid sequences replaced. A read
    /// failure (e.g. the file was deleted between index lookup and this
    /// call) is logged and degrades to an empty string so that callers
    /// rendering or searching a list never have to handle per-note I/O
    /// errors.
    pub fn contents(&self) -> String {
        match fs::read(&self.path) {
            Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
            Err(error) => {
                warn!(path = %self.path.display(), %error, "failed to read note contents");
                String::new()
            }
        }
    }

    /// The modification time of the backing file.
    ///
    /// A stat failure is logged and degrades to the Unix epoch.
    pub fn mtime(&self) -> DateTime<Utc> {
        match fs::metadata(&self.path).and_then(|meta| meta.modified()) {
            Ok(modified) => DateTime::<Utc>::from(modified),
            Err(error) => {
                warn!(path = %self.path.display(), %error, "failed to stat note");
                DateTime::<Utc>::from(std::time::UNIX_EPOCH)
            }
        }
    }
}

impl PartialEq for Note {
    fn eq(&self, other: &Self) -> bool {
        self.path == other.path
    }
}

impl Eq for Note {}

impl std::fmt::Display for Note {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.title, self.extension)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn make_note(dir: &TempDir, title: &str, contents: &[u8]) -> Note {
        let path = dir.path().join(format!("{title}.txt"));
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(contents).unwrap();
        Note::new(title.to_string(), ".txt".to_string(), path)
    }

    #[test]
    fn test_contents_read_through() {
        let dir = TempDir::new().unwrap();
        let note = make_note(&dir, "greeting", b"hello world");
        assert_eq!(note.contents(), "hello world");

        // No caching: a rewrite is visible on the next access
        fs::write(note.path(), "rewritten").unwrap();
        assert_eq!(note.contents(), "rewritten");
    }

    #[test]
    fn test_contents_lossy_utf8() {
        let dir = TempDir::new().unwrap();
        let note = make_note(&dir, "binary", b"caf\xc3\xa9 \xff");
        let contents = note.contents();
        assert!(contents.starts_with("café"));
    }

    #[test]
    fn test_contents_missing_file_degrades_to_empty() {
        let dir = TempDir::new().unwrap();
        let note = make_note(&dir, "gone", b"soon deleted");
        fs::remove_file(note.path()).unwrap();
        assert_eq!(note.contents(), "");
    }

    #[test]
    fn test_mtime_missing_file_degrades_to_epoch() {
        let dir = TempDir::new().unwrap();
        let note = make_note(&dir, "gone", b"");
        fs::remove_file(note.path()).unwrap();
        assert_eq!(note.mtime(), DateTime::<Utc>::from(std::time::UNIX_EPOCH));
    }

    #[test]
    fn test_mtime_tracks_file() {
        let dir = TempDir::new().unwrap();
        let note = make_note(&dir, "stamped", b"x");
        assert!(note.mtime() > DateTime::<Utc>::from(std::time::UNIX_EPOCH));
    }

    #[test]
    fn test_equality_by_path() {
        let dir = TempDir::new().unwrap();
        let a = make_note(&dir, "same", b"");
        let b = Note::new(
            "different-title".to_string(),
            ".txt".to_string(),
            dir.path().join("same.txt"),
        );
        let c = make_note(&dir, "other", b"");
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_display() {
        let dir = TempDir::new().unwrap();
        let note = make_note(&dir, "ideas", b"");
        assert_eq!(note.to_string(), "ideas.txt");
    }
}
