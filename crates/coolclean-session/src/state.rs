//! Result state owned by a scan session.

use std::path::{Path, PathBuf};

use coolclean_analyze::{DuplicatePhase, DuplicateSummary};
use coolclean_core::{DuplicateGroup, FileId, GroupId, ScannedFile};
use coolclean_scan::ScanSummary;

/// State of the large-file scan.
#[derive(Debug, Clone, Default)]
pub struct LargeFileState {
    /// A scan is in flight.
    pub is_scanning: bool,
    /// Path the scan reported last.
    pub current_path: Option<PathBuf>,
    /// Last user-visible failure (access or deletion).
    pub last_error: Option<String>,
    /// Results, largest first.
    pub files: Vec<ScannedFile>,
    /// Totals of the last finished scan.
    pub summary: Option<ScanSummary>,
}

impl LargeFileState {
    /// Reset for a new scan.
    pub(crate) fn reset(&mut self) {
        self.current_path = None;
        self.last_error = None;
        self.files.clear();
        self.summary = None;
    }

    /// Insert keeping size-descending order and at most `cap` entries.
    pub(crate) fn insert(&mut self, file: ScannedFile, cap: usize) {
        let pos = self.files.partition_point(|f| f.size >= file.size);
        if pos >= cap {
            return;
        }
        self.files.insert(pos, file);
        self.files.truncate(cap);
    }

    /// Look up a result by id.
    pub fn get(&self, id: FileId) -> Option<&ScannedFile> {
        self.files.iter().find(|f| f.id == id)
    }

    pub(crate) fn remove(&mut self, id: FileId) -> Option<ScannedFile> {
        let pos = self.files.iter().position(|f| f.id == id)?;
        Some(self.files.remove(pos))
    }

    /// Drop results at `path` or inside it.
    pub(crate) fn forget_path(&mut self, path: &Path) {
        self.files.retain(|f| !f.path.starts_with(path));
    }

    /// Combined size of the results.
    pub fn total_size(&self) -> u64 {
        self.files.iter().map(|f| f.size).sum()
    }
}

/// State of the duplicate scan.
#[derive(Debug, Clone, Default)]
pub struct DuplicateState {
    /// A scan is in flight.
    pub is_scanning: bool,
    /// Phase the scan reported last.
    pub phase: DuplicatePhase,
    /// Progress in `[0, 1]`.
    pub progress: f64,
    /// Path the scan reported last.
    pub current_path: Option<PathBuf>,
    /// Last user-visible failure (access or deletion).
    pub last_error: Option<String>,
    /// Groups, largest potential savings first.
    pub groups: Vec<DuplicateGroup>,
    /// Totals of the last finished scan.
    pub summary: Option<DuplicateSummary>,
}

impl DuplicateState {
    /// Reset for a new scan.
    pub(crate) fn reset(&mut self) {
        self.phase = DuplicatePhase::Idle;
        self.progress = 0.0;
        self.current_path = None;
        self.last_error = None;
        self.groups.clear();
        self.summary = None;
    }

    /// Insert keeping potential-savings-descending order.
    pub(crate) fn insert(&mut self, group: DuplicateGroup) {
        let savings = group.potential_savings();
        let pos = self
            .groups
            .partition_point(|g| g.potential_savings() >= savings);
        self.groups.insert(pos, group);
    }

    /// Look up a group by id.
    pub fn get(&self, id: GroupId) -> Option<&DuplicateGroup> {
        self.groups.iter().find(|g| g.id == id)
    }

    pub(crate) fn take(&mut self, id: GroupId) -> Option<DuplicateGroup> {
        let pos = self.groups.iter().position(|g| g.id == id)?;
        Some(self.groups.remove(pos))
    }

    /// Put a group back after its members changed. Groups with fewer than
    /// two members are dropped.
    pub(crate) fn restore(&mut self, group: DuplicateGroup) {
        if group.is_valid() {
            self.insert(group);
        }
    }

    /// Drop members at `path` or inside it from every group.
    pub(crate) fn forget_path(&mut self, path: &Path) {
        for group in &mut self.groups {
            group.files.retain(|f| !f.path.starts_with(path));
        }
        self.groups.retain(DuplicateGroup::is_valid);
    }

    /// Space reclaimable by keeping one copy per group.
    pub fn total_savings(&self) -> u64 {
        self.groups.iter().map(DuplicateGroup::potential_savings).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use coolclean_core::{ContentHash, Timestamps};

    fn file(name: &str, size: u64) -> ScannedFile {
        ScannedFile::new_file(format!("/data/{name}"), size, Timestamps::default())
    }

    fn group(size: u64, members: usize) -> DuplicateGroup {
        let files = (0..members).map(|i| file(&format!("copy{i}"), size)).collect();
        DuplicateGroup::new(ContentHash::new([size as u8; 32]), size, files)
    }

    #[test]
    fn test_insert_orders_by_size() {
        let mut state = LargeFileState::default();
        for (name, size) in [("b", 20), ("a", 50), ("c", 10), ("d", 30)] {
            state.insert(file(name, size), 10);
        }

        let sizes: Vec<_> = state.files.iter().map(|f| f.size).collect();
        assert_eq!(sizes, vec![50, 30, 20, 10]);
    }

    #[test]
    fn test_insert_respects_cap() {
        let mut state = LargeFileState::default();
        for size in [5, 1, 9, 3, 7, 2] {
            state.insert(file("f", size), 3);
        }

        let sizes: Vec<_> = state.files.iter().map(|f| f.size).collect();
        assert_eq!(sizes, vec![9, 7, 5]);
    }

    #[test]
    fn test_forget_path_covers_children() {
        let mut state = LargeFileState::default();
        state.insert(ScannedFile::new_file("/data/dir/x", 5, Timestamps::default()), 10);
        state.insert(ScannedFile::new_file("/data/dirx", 6, Timestamps::default()), 10);
        state.forget_path(Path::new("/data/dir"));

        assert_eq!(state.files.len(), 1);
        assert_eq!(state.files[0].name, "dirx");
    }

    #[test]
    fn test_groups_ordered_by_savings() {
        let mut state = DuplicateState::default();
        state.insert(group(100, 2));
        state.insert(group(100, 5));
        state.insert(group(300, 2));

        let savings: Vec<_> = state.groups.iter().map(|g| g.potential_savings()).collect();
        assert_eq!(savings, vec![400, 300, 100]);
        assert_eq!(state.total_savings(), 800);
    }

    #[test]
    fn test_restore_drops_singletons() {
        let mut state = DuplicateState::default();
        let mut g = group(100, 2);
        let id = g.id;
        let victim = g.files[1].id;
        g.remove_file(victim);

        state.restore(g);
        assert!(state.get(id).is_none());
        assert_eq!(state.total_savings(), 0);
    }
}
