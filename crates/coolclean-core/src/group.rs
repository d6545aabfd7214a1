//! Duplicate group type.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

use crate::node::{ContentHash, FileId, ScannedFile};

static NEXT_GROUP_ID: AtomicU64 = AtomicU64::new(1);

/// Process-local identifier of a duplicate group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GroupId(pub u64);

impl GroupId {
    /// Allocate a fresh id.
    pub fn next() -> Self {
        Self(NEXT_GROUP_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// A set of files sharing one content fingerprint.
///
/// Members are kept in discovery order; the first member is the one kept
/// when a whole group is cleaned up.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DuplicateGroup {
    /// Unique identifier for this group.
    pub id: GroupId,

    /// Fingerprint shared by all members.
    pub fingerprint: ContentHash,

    /// Size of each member in bytes.
    pub size: u64,

    /// Members in discovery order.
    pub files: Vec<ScannedFile>,
}

impl DuplicateGroup {
    /// Create a new group with a fresh id.
    pub fn new(fingerprint: ContentHash, size: u64, files: Vec<ScannedFile>) -> Self {
        Self {
            id: GroupId::next(),
            fingerprint,
            size,
            files,
        }
    }

    /// Number of members.
    pub fn count(&self) -> usize {
        self.files.len()
    }

    /// Members that could be removed while keeping one copy.
    pub fn duplicate_count(&self) -> usize {
        self.files.len().saturating_sub(1)
    }

    /// Bytes reclaimable by keeping one copy: `size * (count - 1)`.
    pub fn potential_savings(&self) -> u64 {
        self.size * self.duplicate_count() as u64
    }

    /// Whether the group still has at least two members.
    pub fn is_valid(&self) -> bool {
        self.files.len() >= 2
    }

    /// The member treated as the original.
    pub fn keeper(&self) -> Option<&ScannedFile> {
        self.files.first()
    }

    /// Check membership by file id.
    pub fn contains(&self, id: FileId) -> bool {
        self.files.iter().any(|f| f.id == id)
    }

    /// Remove a member. Returns the removed entry if it was present.
    pub fn remove_file(&mut self, id: FileId) -> Option<ScannedFile> {
        let pos = self.files.iter().position(|f| f.id == id)?;
        Some(self.files.remove(pos))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Timestamps;

    fn group_of(n: usize, size: u64) -> DuplicateGroup {
        let files = (0..n)
            .map(|i| ScannedFile::new_file(format!("/d/f{i}"), size, Timestamps::default()))
            .collect();
        DuplicateGroup::new(ContentHash::new([1; 32]), size, files)
    }

    #[test]
    fn test_potential_savings() {
        let group = group_of(3, 4096);
        assert_eq!(group.duplicate_count(), 2);
        assert_eq!(group.potential_savings(), 8192);
    }

    #[test]
    fn test_remove_file_invalidates_pair() {
        let mut group = group_of(2, 100);
        let second = group.files[1].id;
        assert!(group.remove_file(second).is_some());
        assert!(!group.is_valid());
        assert_eq!(group.potential_savings(), 0);
        assert!(group.remove_file(second).is_none());
    }
}
