//! Duplicate detection for coolclean.
//!
//! Finding duplicates takes three phases:
//!
//! 1. Bucket files by exact size (no file content is read)
//! 2. Fingerprint every file whose size is shared (small files whole,
//!    larger ones by head, middle and tail samples)
//! 3. Group files sharing a fingerprint
//!
//! ```rust,no_run
//! use coolclean_analyze::{DuplicateConfig, DuplicateEvent, DuplicateScanner};
//!
//! # async fn run() {
//! let mut scanner = DuplicateScanner::new();
//! let mut handle = scanner.start(DuplicateConfig::new("/path/to/scan", 1024));
//!
//! while let Some(event) = handle.recv().await {
//!     match event {
//!         DuplicateEvent::GroupFound(group) => {
//!             let savings = group.potential_savings();
//!             println!("{} copies, {savings} bytes reclaimable", group.count());
//!         }
//!         DuplicateEvent::Completed(summary) => println!("{} groups", summary.groups_found),
//!         _ => {}
//!     }
//! }
//! # }
//! ```
//!
//! Fingerprints of large files are sampled and can collide. Confirm with
//! [`full_hash`] before deleting anything on the strength of a group.

mod duplicates;
mod fingerprint;

pub use duplicates::{
    DuplicateEvent, DuplicatePhase, DuplicateScanner, DuplicateSummary, DuplicateVisitor,
    HASH_BATCH_SIZE, find_duplicates,
};
pub use fingerprint::{Fingerprinter, fingerprint, full_hash};

// Re-export core types
pub use coolclean_core::{ContentHash, DuplicateConfig, DuplicateGroup};
pub use coolclean_scan::ScanHandle;
