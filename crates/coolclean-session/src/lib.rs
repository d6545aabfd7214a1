//! Scan session coordinator for coolclean.
//!
//! A [`ScanSession`] owns one large-file scanner and one duplicate scanner,
//! applies their events to its result state, and performs deletions against
//! that state. It consults an [`AccessManager`] before every scan and an
//! [`Entitlement`] before every top-level scan.

mod collab;
mod constants;
mod session;
mod settings;
mod state;

pub use collab::{AccessManager, Entitlement, FsAccess, ScanQuota};
pub use constants::{DEFAULT_LARGE_FILE_MIN_SIZE, MAX_RESULTS};
pub use session::ScanSession;
pub use settings::SessionSettings;
pub use state::{DuplicateState, LargeFileState};

// Re-export the types found in session state
pub use coolclean_analyze::{DuplicatePhase, DuplicateSummary};
pub use coolclean_core::{DuplicateGroup, FileId, GroupId, ScannedFile};
pub use coolclean_ops::{DeletionComplete, FallbackDeleter, NoFallback, TrashDeleter};
pub use coolclean_scan::ScanSummary;
