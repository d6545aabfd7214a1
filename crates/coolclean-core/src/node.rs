//! Scanned entry types.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::SystemTime;

use compact_str::CompactString;
use serde::{Deserialize, Serialize};

static NEXT_FILE_ID: AtomicU64 = AtomicU64::new(1);

/// Process-local identifier of a scanned entry.
///
/// Ids are handed out from a global counter, so the same path scanned twice
/// yields two distinct ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FileId(pub u64);

impl FileId {
    /// Allocate a fresh id.
    pub fn next() -> Self {
        Self(NEXT_FILE_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// BLAKE3 content fingerprint for duplicate detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentHash(pub [u8; 32]);

impl ContentHash {
    /// Create a new ContentHash from raw bytes.
    pub fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Get the hash as a hex string.
    pub fn to_hex(&self) -> String {
        self.0.iter().map(|b| format!("{b:02x}")).collect()
    }
}

impl std::fmt::Display for ContentHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for b in &self.0 {
            write!(f, "{b:02x}")?;
        }
        Ok(())
    }
}

/// Inode information for hardlink detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InodeInfo {
    /// Inode number.
    pub inode: u64,
    /// Device ID.
    pub device: u64,
}

impl InodeInfo {
    /// Create new inode info.
    pub fn new(inode: u64, device: u64) -> Self {
        Self { inode, device }
    }
}

/// Timestamps reported for a scanned entry. Either may be missing on
/// platforms or filesystems that don't record it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timestamps {
    /// Last modification time.
    pub modified: Option<SystemTime>,
    /// Creation time.
    pub created: Option<SystemTime>,
}

impl Timestamps {
    /// Create timestamps from optional values.
    pub fn new(modified: Option<SystemTime>, created: Option<SystemTime>) -> Self {
        Self { modified, created }
    }

    /// Read timestamps from metadata, ignoring unsupported fields.
    pub fn from_metadata(metadata: &std::fs::Metadata) -> Self {
        Self {
            modified: metadata.modified().ok(),
            created: metadata.created().ok(),
        }
    }
}

/// One filesystem entry found by a scan.
///
/// Created the moment an entry qualifies and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScannedFile {
    /// Unique identifier for this entry.
    pub id: FileId,

    /// Display name (last path component).
    pub name: CompactString,

    /// Absolute path.
    pub path: PathBuf,

    /// Size in bytes (aggregate for directories).
    pub size: u64,

    /// Whether the entry is a directory reported as a single unit.
    pub is_dir: bool,

    /// Entry timestamps.
    pub timestamps: Timestamps,
}

impl ScannedFile {
    /// Create a new file entry with a fresh id.
    pub fn new_file(path: impl Into<PathBuf>, size: u64, timestamps: Timestamps) -> Self {
        Self::new(path.into(), size, false, timestamps)
    }

    /// Create a new directory entry with a fresh id.
    pub fn new_directory(path: impl Into<PathBuf>, size: u64, timestamps: Timestamps) -> Self {
        Self::new(path.into(), size, true, timestamps)
    }

    fn new(path: PathBuf, size: u64, is_dir: bool, timestamps: Timestamps) -> Self {
        let name = display_name(&path);
        Self {
            id: FileId::next(),
            name,
            path,
            size,
            is_dir,
            timestamps,
        }
    }
}

/// Last component of `path`, or the whole path for roots like `/`.
fn display_name(path: &Path) -> CompactString {
    match path.file_name() {
        Some(name) => CompactString::new(name.to_string_lossy()),
        None => CompactString::new(path.to_string_lossy()),
    }
}

/// Dotfile convention for hidden entries.
pub fn is_hidden_name(name: &str) -> bool {
    name.starts_with('.') && name != "." && name != ".."
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_ids_are_unique() {
        let a = ScannedFile::new_file("/tmp/a.bin", 10, Timestamps::default());
        let b = ScannedFile::new_file("/tmp/a.bin", 10, Timestamps::default());
        assert_ne!(a.id, b.id);
        assert_eq!(a.name, "a.bin");
    }

    #[test]
    fn test_content_hash_hex() {
        let hash = ContentHash::new([0xab; 32]);
        assert_eq!(hash.to_hex().len(), 64);
        assert!(hash.to_hex().starts_with("abab"));
        assert_eq!(hash.to_string(), hash.to_hex());
    }

    #[test]
    fn test_directory_entry() {
        let dir = ScannedFile::new_directory("/data/Big", 50, Timestamps::default());
        assert!(dir.is_dir);
        assert_eq!(dir.name, "Big");
    }

    #[test]
    fn test_hidden_names() {
        assert!(is_hidden_name(".git"));
        assert!(!is_hidden_name("src"));
        assert!(!is_hidden_name(".."));
    }
}
