//! Scan configuration types.

use std::path::PathBuf;

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

use crate::node::is_hidden_name;

/// Default minimum size for duplicate candidates (1 KiB).
pub const DEFAULT_DUPLICATE_MIN_SIZE: u64 = 1024;

/// Files up to this size are fingerprinted in full (256 KiB).
pub const DEFAULT_SMALL_FILE_LIMIT: u64 = 256 * 1024;

/// Length of each head/middle/tail sample for larger files (64 KiB).
pub const DEFAULT_SAMPLE_SIZE: u64 = 64 * 1024;

/// Configuration for a large-file scan.
#[derive(Debug, Clone, Builder, Serialize, Deserialize)]
#[builder(setter(into), build_fn(validate = "Self::validate"))]
pub struct ScanConfig {
    /// Root path to scan.
    pub root: PathBuf,

    /// Entries smaller than this are never reported.
    #[builder(default = "0")]
    #[serde(default)]
    pub min_size: u64,

    /// Include hidden files (starting with .).
    #[builder(default = "false")]
    #[serde(default)]
    pub include_hidden: bool,

    /// Use apparent (logical) size instead of allocated size.
    #[builder(default = "false")]
    #[serde(default)]
    pub apparent_size: bool,
}

impl ScanConfigBuilder {
    fn validate(&self) -> Result<(), String> {
        validate_root(self.root.as_ref())
    }
}

fn validate_root(root: Option<&PathBuf>) -> Result<(), String> {
    match root {
        Some(root) if root.as_os_str().is_empty() => Err("Root path cannot be empty".to_string()),
        Some(_) => Ok(()),
        None => Err("Root path is required".to_string()),
    }
}

impl ScanConfig {
    /// Create a new scan config builder.
    pub fn builder() -> ScanConfigBuilder {
        ScanConfigBuilder::default()
    }

    /// Create a simple config for scanning a path.
    pub fn new(root: impl Into<PathBuf>, min_size: u64) -> Self {
        Self {
            root: root.into(),
            min_size,
            include_hidden: false,
            apparent_size: false,
        }
    }

    /// Check if hidden files should be skipped.
    pub fn should_skip_hidden(&self, name: &str) -> bool {
        !self.include_hidden && is_hidden_name(name)
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self::new(".", 0)
    }
}

/// Configuration for a duplicate scan.
#[derive(Debug, Clone, Builder, Serialize, Deserialize)]
#[builder(setter(into), build_fn(validate = "Self::validate"))]
pub struct DuplicateConfig {
    /// Root path to scan.
    pub root: PathBuf,

    /// Minimum file size to consider (skip tiny files).
    #[builder(default = "DEFAULT_DUPLICATE_MIN_SIZE")]
    #[serde(default = "default_duplicate_min_size")]
    pub min_size: u64,

    /// Include hidden files (starting with .).
    #[builder(default = "false")]
    #[serde(default)]
    pub include_hidden: bool,

    /// Number of threads for enumeration (0 = auto-detect).
    #[builder(default = "0")]
    #[serde(default)]
    pub threads: usize,

    /// Files up to this size are hashed in full.
    #[builder(default = "DEFAULT_SMALL_FILE_LIMIT")]
    #[serde(default = "default_small_file_limit")]
    pub small_file_limit: u64,

    /// Bytes read from each sampled region of larger files.
    #[builder(default = "DEFAULT_SAMPLE_SIZE")]
    #[serde(default = "default_sample_size")]
    pub sample_size: u64,
}

fn default_duplicate_min_size() -> u64 {
    DEFAULT_DUPLICATE_MIN_SIZE
}

fn default_small_file_limit() -> u64 {
    DEFAULT_SMALL_FILE_LIMIT
}

fn default_sample_size() -> u64 {
    DEFAULT_SAMPLE_SIZE
}

impl DuplicateConfigBuilder {
    fn validate(&self) -> Result<(), String> {
        validate_root(self.root.as_ref())?;
        if self.sample_size == Some(0) {
            return Err("Sample size must be positive".to_string());
        }
        Ok(())
    }
}

impl DuplicateConfig {
    /// Create a new config builder.
    pub fn builder() -> DuplicateConfigBuilder {
        DuplicateConfigBuilder::default()
    }

    /// Create a config for `root` with the given minimum size.
    pub fn new(root: impl Into<PathBuf>, min_size: u64) -> Self {
        Self {
            root: root.into(),
            min_size,
            include_hidden: false,
            threads: 0,
            small_file_limit: DEFAULT_SMALL_FILE_LIMIT,
            sample_size: DEFAULT_SAMPLE_SIZE,
        }
    }
}

impl Default for DuplicateConfig {
    fn default() -> Self {
        Self::new(".", DEFAULT_DUPLICATE_MIN_SIZE)
    }
}
