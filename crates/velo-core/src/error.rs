//! Error types for Velo core operations.
//!
//! This module defines well-structured error types using `thiserror`.
//! Validation failures (`AlreadyExists`, `InvalidTitle`) are part of the
//! `add` contract and are meant to be matched on by callers; everything
//! else is an environment failure.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using VeloError
pub type Result<T> = std::result::Result<T, VeloError>;

/// Core error types for Velo operations.
#[derive(Error, Debug)]
pub enum VeloError {
    /// The notebook root directory could not be created or resolved.
    /// Fatal: the notebook cannot operate without its root.
    #[error("notebook root {path} could not be initialized: {reason}")]
    Initialization { path: PathBuf, reason: String },

    /// A note with the same title and extension is already indexed
    #[error("note already in notebook: {title}{extension}")]
    AlreadyExists { title: String, extension: String },

    /// The requested note name violates naming or containment rules
    #[error("invalid note title {name:?}: {reason}")]
    InvalidTitle { name: String, reason: String },

    /// The filesystem watcher could not be started or has failed
    #[error("watcher error: {reason}")]
    Watcher { reason: String },

    /// Configuration file parsing or serialization failed
    #[error("configuration error: {reason}")]
    Config { reason: String },

    /// Generic I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl VeloError {
    /// Returns true for errors that are expected outcomes of races or of
    /// filtered-out files, which the watch bridge logs and swallows.
    pub fn is_benign(&self) -> bool {
        matches!(
            self,
            VeloError::AlreadyExists { .. } | VeloError::InvalidTitle { .. }
        )
    }

    /// Create an initialization error
    pub fn initialization(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        VeloError::Initialization {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create an invalid-title error
    pub fn invalid_title(name: impl Into<String>, reason: impl Into<String>) -> Self {
        VeloError::InvalidTitle {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Create a watcher error
    pub fn watcher(reason: impl Into<String>) -> Self {
        VeloError::Watcher {
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_benign() {
        let err = VeloError::AlreadyExists {
            title: "todo".to_string(),
            extension: ".txt".to_string(),
        };
        assert!(err.is_benign());

        let err = VeloError::invalid_title("../escape.txt", "path escapes the notebook root");
        assert!(err.is_benign());

        let err = VeloError::initialization("/nowhere", "permission denied");
        assert!(!err.is_benign());

        let err = VeloError::watcher("inotify limit reached");
        assert!(!err.is_benign());
    }

    #[test]
    fn test_display_includes_identity() {
        let err = VeloError::AlreadyExists {
            title: "meetings/standup".to_string(),
            extension: ".md".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "note already in notebook: meetings/standup.md"
        );
    }
}
