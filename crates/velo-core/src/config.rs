//! Configuration for Velo.
//!
//! This module provides configuration loading, saving, and defaults.
//! Configuration is stored in TOML format in a platform-appropriate
//! location and is consumed by [`crate::Notebook::open`].

use crate::error::{Result, VeloError};
use directories::{ProjectDirs, UserDirs};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Main configuration structure for Velo.
///
/// ## Example Configuration File (velo.toml)
///
/// ```toml
/// notes_dir = "/home/user/Notes"
/// extension = "txt"
/// extensions = [".txt", ".md", ".markdown", ".rst"]
/// exclude = ["src", "backup", "ignore", "tmp", "old"]
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory tree that holds the notes
    pub notes_dir: PathBuf,

    /// Filename extension for newly created notes (leading dot optional)
    pub extension: String,

    /// Filename extensions recognized as notes during scanning
    pub extensions: Vec<String>,

    /// File/directory basenames skipped during traversal and creation
    pub exclude: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        let notes_dir = UserDirs::new()
            .map(|dirs| dirs.home_dir().join("Notes"))
            .unwrap_or_else(|| PathBuf::from("Notes"));
        Config {
            notes_dir,
            extension: "txt".to_string(),
            extensions: vec![
                ".txt".to_string(),
                ".md".to_string(),
                ".markdown".to_string(),
                ".rst".to_string(),
            ],
            exclude: vec![
                "src".to_string(),
                "backup".to_string(),
                "ignore".to_string(),
                "tmp".to_string(),
                "old".to_string(),
            ],
        }
    }
}

impl Config {
    /// Load configuration from the default location.
    ///
    /// Returns default config if no config file exists.
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path()?;
        Self::load_from(&config_path)
    }

    /// Load configuration from a specific path.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "config file not found, using defaults");
            return Ok(Config::default());
        }

        info!(path = %path.display(), "loading configuration");
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents).map_err(|e| VeloError::Config {
            reason: format!("failed to parse {}: {e}", path.display()),
        })?;
        Ok(config)
    }

    /// Save configuration to the default location.
    pub fn save(&self) -> Result<()> {
        let config_path = Self::default_config_path()?;
        self.save_to(&config_path)
    }

    /// Save configuration to a specific path.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        info!(path = %path.display(), "saving configuration");
        let contents = toml::to_string_pretty(self).map_err(|e| VeloError::Config {
            reason: format!("failed to serialize config: {e}"),
        })?;
        fs::write(path, contents)?;
        Ok(())
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("", "", "velo").ok_or_else(|| VeloError::Config {
            reason: "could not determine config directory".to_string(),
        })?;
        Ok(dirs.config_dir().join("velo.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.extension, "txt");
        assert_eq!(config.extensions.len(), 4);
        assert!(config.extensions.iter().all(|e| e.starts_with('.')));
        assert!(config.exclude.contains(&"backup".to_string()));
        assert!(config.notes_dir.ends_with("Notes"));
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("velo.toml");

        let mut config = Config::default();
        config.notes_dir = PathBuf::from("/srv/notes");
        config.extension = "md".to_string();
        config.exclude = vec!["attic".to_string()];

        config.save_to(&config_path).unwrap();
        let loaded = Config::load_from(&config_path).unwrap();

        assert_eq!(loaded.notes_dir, PathBuf::from("/srv/notes"));
        assert_eq!(loaded.extension, "md");
        assert_eq!(loaded.exclude, vec!["attic".to_string()]);
    }

    #[test]
    fn test_load_nonexistent_uses_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("missing.toml");

        let config = Config::load_from(&config_path).unwrap();
        assert_eq!(config.extension, "txt");
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("velo.toml");
        fs::write(&config_path, "extension = \"rst\"\n").unwrap();

        let config = Config::load_from(&config_path).unwrap();
        assert_eq!(config.extension, "rst");
        assert_eq!(config.extensions.len(), 4);
    }

    #[test]
    fn test_invalid_toml_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("velo.toml");
        fs::write(&config_path, "extensions = \"not-a-list").unwrap();

        let result = Config::load_from(&config_path);
        assert!(matches!(result, Err(VeloError::Config { .. })));
    }
}
