//! Inode tracking for hardlink deduplication.

use coolclean_core::InodeInfo;
use dashmap::DashSet;

/// Tracks seen inodes so hardlinks to one file are only considered once.
///
/// Two hardlinks share their data blocks, so treating them as duplicates of
/// each other would promise space that deleting one of them never frees.
#[derive(Debug, Default)]
pub struct InodeTracker {
    seen: DashSet<InodeInfo>,
}

impl InodeTracker {
    /// Create a new inode tracker.
    pub fn new() -> Self {
        Self {
            seen: DashSet::new(),
        }
    }

    /// Track an inode. Returns `true` if this is the first time seeing it.
    pub fn track(&self, info: InodeInfo) -> bool {
        self.seen.insert(info)
    }

    /// Get the number of unique inodes tracked.
    pub fn len(&self) -> usize {
        self.seen.len()
    }

    /// Check if no inodes have been tracked.
    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_track_new_inode() {
        let tracker = InodeTracker::new();
        let info = InodeInfo::new(12345, 1);

        assert!(tracker.track(info));
        assert!(!tracker.track(info)); // Second time returns false
        assert_eq!(tracker.len(), 1);
    }

    #[test]
    fn test_different_devices() {
        let tracker = InodeTracker::new();
        let info1 = InodeInfo::new(12345, 1);
        let info2 = InodeInfo::new(12345, 2); // Same inode, different device

        assert!(tracker.track(info1));
        assert!(tracker.track(info2));
    }
}
