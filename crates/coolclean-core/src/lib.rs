//! Core types and configuration for coolclean.
//!
//! This crate provides the data model shared by the scanning, analysis and
//! session crates: scanned entries, duplicate groups, scan configuration and
//! the error types that cross crate boundaries.

mod config;
mod error;
mod group;
mod node;

pub use config::{
    DEFAULT_DUPLICATE_MIN_SIZE, DEFAULT_SAMPLE_SIZE, DEFAULT_SMALL_FILE_LIMIT, DuplicateConfig,
    DuplicateConfigBuilder, ScanConfig, ScanConfigBuilder,
};
pub use error::{DeleteError, ScanError, ScanWarning, WarningKind};
pub use group::{DuplicateGroup, GroupId};
pub use node::{ContentHash, FileId, InodeInfo, ScannedFile, Timestamps, is_hidden_name};
