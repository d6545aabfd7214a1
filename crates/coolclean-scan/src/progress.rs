//! Scan events and progress reporting.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use coolclean_core::{ScanError, ScannedFile};

/// Events streamed from a large-file scan, in traversal order.
#[derive(Debug)]
pub enum ScanEvent {
    /// An entry at or above the threshold.
    FileFound(ScannedFile),
    /// The path currently being processed.
    PathUpdate(PathBuf),
    /// The traversal ended, naturally or by cancellation.
    Completed(ScanSummary),
    /// The scan could not run at all.
    Failed(ScanError),
}

/// Totals for a finished large-file scan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanSummary {
    /// Entries the traversal looked at.
    pub entries_visited: u64,
    /// Entries reported as found.
    pub files_found: u64,
    /// Entries skipped because they could not be read.
    pub warnings: u64,
    /// Wall time of the scan.
    pub elapsed: Duration,
    /// The scan stopped before covering the whole tree.
    pub cancelled: bool,
}

/// Running counters for a scan, with timing.
#[derive(Debug)]
pub struct ProgressTracker {
    start_time: Instant,
    entries_visited: u64,
    files_found: u64,
    warnings: u64,
}

impl ProgressTracker {
    pub fn new() -> Self {
        Self {
            start_time: Instant::now(),
            entries_visited: 0,
            files_found: 0,
            warnings: 0,
        }
    }

    pub fn record_visit(&mut self) {
        self.entries_visited += 1;
    }

    pub fn record_found(&mut self) {
        self.files_found += 1;
    }

    pub fn record_warning(&mut self) {
        self.warnings += 1;
    }

    pub fn entries_visited(&self) -> u64 {
        self.entries_visited
    }

    pub fn finish(&self, cancelled: bool) -> ScanSummary {
        ScanSummary {
            entries_visited: self.entries_visited,
            files_found: self.files_found,
            warnings: self.warnings,
            elapsed: self.start_time.elapsed(),
            cancelled,
        }
    }
}

impl Default for ProgressTracker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tracker_counts() {
        let mut tracker = ProgressTracker::new();
        tracker.record_visit();
        tracker.record_visit();
        tracker.record_found();
        tracker.record_warning();

        let summary = tracker.finish(true);
        assert_eq!(summary.entries_visited, 2);
        assert_eq!(summary.files_found, 1);
        assert_eq!(summary.warnings, 1);
        assert!(summary.cancelled);
    }
}
