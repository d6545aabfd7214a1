//! Error types for scanning and deletion.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that end a scan.
///
/// Only failures at the scan root surface here; problems with individual
/// entries become [`ScanWarning`]s.
#[derive(Debug, Error)]
pub enum ScanError {
    /// Permission denied for a path.
    #[error("Permission denied: {path}")]
    PermissionDenied { path: PathBuf },

    /// Access refused by the folder-access manager.
    #[error("No access to {path}; grant access to this folder first")]
    AccessDenied { path: PathBuf },

    /// Path not found.
    #[error("Path not found: {path}")]
    NotFound { path: PathBuf },

    /// Generic I/O error.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Root path is not a directory.
    #[error("Root path is not a directory: {path}")]
    NotADirectory { path: PathBuf },
}

impl ScanError {
    /// Create an I/O error with path context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        match source.kind() {
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied { path },
            std::io::ErrorKind::NotFound => Self::NotFound { path },
            _ => Self::Io { path, source },
        }
    }
}

/// Kind of scan warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WarningKind {
    /// Permission was denied.
    PermissionDenied,
    /// Error reading a directory.
    ReadError,
    /// Error reading metadata.
    MetadataError,
    /// File content could not be read for fingerprinting.
    HashError,
}

/// Non-fatal problem encountered during a scan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanWarning {
    /// Path where the warning occurred.
    pub path: PathBuf,
    /// Human-readable message.
    pub message: String,
    /// Kind of warning.
    pub kind: WarningKind,
}

impl ScanWarning {
    /// Create a new scan warning.
    pub fn new(path: impl Into<PathBuf>, message: impl Into<String>, kind: WarningKind) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
            kind,
        }
    }

    /// Create a warning from an I/O error, classifying permission errors.
    pub fn from_io(path: impl Into<PathBuf>, error: &std::io::Error, kind: WarningKind) -> Self {
        let kind = if error.kind() == std::io::ErrorKind::PermissionDenied {
            WarningKind::PermissionDenied
        } else {
            kind
        };
        Self::new(path, error.to_string(), kind)
    }
}

/// Errors from deleting a scanned entry.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DeleteError {
    /// Direct removal and the fallback both failed.
    #[error("Could not delete {name}: {reason}")]
    Failed { name: String, reason: String },

    /// Full-content comparison showed the file is not a true duplicate.
    #[error("{name} differs from the kept copy and was not deleted")]
    VerificationFailed { name: String },

    /// The entry is no longer part of the current results.
    #[error("{name} is no longer in the scan results")]
    Stale { name: String },
}

impl DeleteError {
    /// Name of the file the error refers to.
    pub fn name(&self) -> &str {
        match self {
            Self::Failed { name, .. }
            | Self::VerificationFailed { name }
            | Self::Stale { name } => name,
        }
    }
}
