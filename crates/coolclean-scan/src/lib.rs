//! Large-file scanning engine for coolclean.
//!
//! This crate finds the entries under a root that are at least a given size.
//! A directory whose total size crosses the threshold is reported once, as a
//! unit, and its contents are not reported separately.
//!
//! # Overview
//!
//! - [`SizeResolver`] sizes files (allocated size, falling back to logical
//!   length) and directories (recursive sum, cancellable).
//! - [`traverse`] walks a tree depth-first and hands qualifying entries to a
//!   [`TraversalVisitor`].
//! - [`LargeFileScanner`] runs the traversal on a blocking worker and streams
//!   [`ScanEvent`]s over a channel.
//!
//! # Example
//!
//! ```rust,no_run
//! use coolclean_scan::{LargeFileScanner, ScanConfig, ScanEvent};
//!
//! # async fn run() {
//! let mut scanner = LargeFileScanner::new();
//! let mut handle = scanner.start(ScanConfig::new("/path/to/scan", 100 * 1024 * 1024));
//!
//! while let Some(event) = handle.recv().await {
//!     match event {
//!         ScanEvent::FileFound(file) => println!("{} {}", file.size, file.path.display()),
//!         ScanEvent::Completed(summary) => println!("done: {} found", summary.files_found),
//!         _ => {}
//!     }
//! }
//! # }
//! ```

mod handle;
mod inode;
mod meta;
mod progress;
mod scanner;
mod size;
mod traverse;

pub use handle::{EVENT_CHANNEL_SIZE, ScanHandle};
pub use inode::InodeTracker;
pub use meta::{inode_info, link_count};
pub use progress::{ProgressTracker, ScanEvent, ScanSummary};
pub use scanner::LargeFileScanner;
pub use size::{ResolvedSize, SizeResolver};
pub use traverse::{PROGRESS_INTERVAL, TraversalVisitor, check_root, traverse};

// Re-export core types for convenience
pub use coolclean_core::{ScanConfig, ScanError, ScanWarning, ScannedFile, Timestamps, WarningKind};
