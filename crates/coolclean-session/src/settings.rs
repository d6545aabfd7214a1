//! Persistent session settings.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use coolclean_core::DEFAULT_DUPLICATE_MIN_SIZE;

use crate::constants::{
    CONFIG_DIR_NAME, DEFAULT_LARGE_FILE_MIN_SIZE, MAX_RESULTS, SETTINGS_FILE_NAME,
};

/// Settings stored in the user's config directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionSettings {
    /// Threshold for the large-file scan, in bytes.
    pub large_file_min_size: u64,
    /// Smallest file considered by the duplicate scan, in bytes.
    pub duplicate_min_size: u64,
    /// Scan hidden files and folders too.
    pub include_hidden: bool,
    /// Size files by logical length instead of allocated blocks.
    pub apparent_size: bool,
    /// Move to the trash when a direct delete fails.
    pub use_trash: bool,
    /// Compare full content with a kept copy before deleting a duplicate.
    pub verify_before_delete: bool,
    /// Large-file results to keep, at most [`MAX_RESULTS`].
    pub max_results: usize,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            large_file_min_size: DEFAULT_LARGE_FILE_MIN_SIZE,
            duplicate_min_size: DEFAULT_DUPLICATE_MIN_SIZE,
            include_hidden: false,
            apparent_size: false,
            use_trash: true,
            verify_before_delete: true,
            max_results: MAX_RESULTS,
        }
    }
}

impl SessionSettings {
    /// Get the config file path.
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join(CONFIG_DIR_NAME).join(SETTINGS_FILE_NAME))
    }

    /// Load settings from disk, or return defaults.
    pub fn load() -> Self {
        Self::config_path()
            .map(|path| Self::load_from(&path))
            .unwrap_or_default()
    }

    /// Load settings from `path`. A missing or malformed file gives defaults.
    pub fn load_from(path: &Path) -> Self {
        std::fs::read_to_string(path)
            .ok()
            .and_then(|content| toml::from_str(&content).ok())
            .unwrap_or_default()
    }

    /// Save settings to the config directory.
    pub fn save(&self) -> std::io::Result<()> {
        let path = Self::config_path().ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::NotFound, "No config directory")
        })?;
        self.save_to(&path)
    }

    /// Save settings to `path`, creating its parent directory if needed.
    pub fn save_to(&self, path: &Path) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;

        std::fs::write(path, content)
    }

    /// Large-file results to keep, between one and [`MAX_RESULTS`].
    pub fn result_cap(&self) -> usize {
        self.max_results.clamp(1, MAX_RESULTS)
    }
}
