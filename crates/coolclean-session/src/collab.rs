//! Collaborators the session consults before scanning.
//!
//! Folder access and scan quota are decided by the embedding application;
//! the defaults here suit a headless process with no sandbox and no store.

use std::fs;
use std::path::{Path, PathBuf};

/// Decides whether the process may scan a folder.
pub trait AccessManager: Send {
    /// Whether `path` may be traversed.
    fn has_access(&self, path: &Path) -> bool;

    /// Ask the user for a folder to grant access to.
    fn request_access(&mut self) -> Option<PathBuf>;
}

/// Access is whatever the filesystem allows: a folder we can list.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsAccess;

impl AccessManager for FsAccess {
    fn has_access(&self, path: &Path) -> bool {
        fs::read_dir(path).is_ok()
    }

    fn request_access(&mut self) -> Option<PathBuf> {
        None
    }
}

/// Decides whether another top-level scan may start.
pub trait Entitlement: Send {
    fn can_scan(&self) -> bool;

    /// Record that a top-level scan started.
    fn consume_one_scan(&mut self);
}

/// A count of free scans, unlimited once unlocked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanQuota {
    pub free_scans_remaining: u32,
    pub unlocked: bool,
}

impl ScanQuota {
    /// A quota of `free_scans` scans.
    pub fn limited(free_scans: u32) -> Self {
        Self {
            free_scans_remaining: free_scans,
            unlocked: false,
        }
    }

    /// No limit.
    pub fn unlimited() -> Self {
        Self {
            free_scans_remaining: 0,
            unlocked: true,
        }
    }
}

impl Default for ScanQuota {
    fn default() -> Self {
        Self::unlimited()
    }
}

impl Entitlement for ScanQuota {
    fn can_scan(&self) -> bool {
        self.unlocked || self.free_scans_remaining > 0
    }

    fn consume_one_scan(&mut self) {
        if !self.unlocked {
            self.free_scans_remaining = self.free_scans_remaining.saturating_sub(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_limited_quota_runs_out() {
        let mut quota = ScanQuota::limited(2);
        assert!(quota.can_scan());
        quota.consume_one_scan();
        quota.consume_one_scan();
        assert!(!quota.can_scan());
        quota.consume_one_scan();
        assert_eq!(quota.free_scans_remaining, 0);
    }

    #[test]
    fn test_unlocked_quota_never_runs_out() {
        let mut quota = ScanQuota::unlimited();
        for _ in 0..10 {
            quota.consume_one_scan();
        }
        assert!(quota.can_scan());
    }

    #[test]
    fn test_fs_access() {
        let temp = TempDir::new().unwrap();
        let access = FsAccess;
        assert!(access.has_access(temp.path()));
        assert!(!access.has_access(&temp.path().join("missing")));
    }
}
