//! Deletion engine for coolclean.
//!
//! Entries are removed directly first. When that fails, a
//! [`FallbackDeleter`] gets a second attempt (the trash, or a privileged
//! helper supplied by the embedding application). Duplicates can be checked
//! against a surviving copy by full content before they are removed.

mod batch;
mod delete;
mod verify;

pub use batch::{DeletionComplete, DeletionEvent, DeletionProgress, DeletionTarget, start_deletion};
pub use delete::{FallbackDeleter, NoFallback, TrashDeleter, delete_entry, remove_path};
pub use verify::confirm_duplicate;

/// Default channel buffer size for deletion progress updates.
pub const DELETION_CHANNEL_SIZE: usize = 100;
