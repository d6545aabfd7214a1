//! Background deletion of many entries with progress reporting.

use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::info;

use coolclean_core::{DeleteError, FileId, ScannedFile};

use crate::delete::{FallbackDeleter, delete_entry};
use crate::verify::confirm_duplicate;
use crate::DELETION_CHANNEL_SIZE;

/// One entry to delete.
#[derive(Debug, Clone)]
pub struct DeletionTarget {
    /// The entry to remove.
    pub file: ScannedFile,
    /// Paths that must hold an identical copy before the entry is removed.
    /// Empty means no check.
    pub verify_against: Vec<PathBuf>,
}

impl DeletionTarget {
    /// Delete without any content check.
    pub fn new(file: ScannedFile) -> Self {
        Self {
            file,
            verify_against: Vec::new(),
        }
    }

    /// Delete only if one of `survivors` has identical content.
    pub fn verified(file: ScannedFile, survivors: Vec<PathBuf>) -> Self {
        Self {
            file,
            verify_against: survivors,
        }
    }

    /// Remove this target from disk, checking its content first if asked.
    ///
    /// Blocks on filesystem work.
    pub fn execute(&self, fallback: &dyn FallbackDeleter) -> Result<(), DeleteError> {
        if !self.verify_against.is_empty() {
            confirm_duplicate(&self.file, self.verify_against.iter().map(PathBuf::as_path))?;
        }
        delete_entry(&self.file, fallback)
    }
}

/// Progress of a running batch deletion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeletionProgress {
    /// Entries in the batch.
    pub total: usize,
    /// Entries removed so far.
    pub deleted: usize,
    /// Entries that could not be removed so far.
    pub failed: usize,
    /// Bytes reclaimed so far.
    pub bytes_freed: u64,
    /// The entry about to be processed.
    pub current: Option<PathBuf>,
}

/// Outcome of a batch deletion.
#[derive(Debug, Clone, Default)]
pub struct DeletionComplete {
    /// Entries that were removed.
    pub deleted: Vec<FileId>,
    /// Bytes reclaimed.
    pub bytes_freed: u64,
    /// One error per entry that was kept.
    pub errors: Vec<DeleteError>,
}

impl DeletionComplete {
    /// Number of entries that could not be removed.
    pub fn failed(&self) -> usize {
        self.errors.len()
    }

    /// Check if every entry was removed.
    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }

    /// Get a human-readable summary of the batch.
    pub fn summary(&self) -> String {
        if self.errors.is_empty() {
            format!("Deleted {} items", self.deleted.len())
        } else {
            format!(
                "Deleted {} items, {} failed",
                self.deleted.len(),
                self.errors.len()
            )
        }
    }
}

/// Events streamed from a batch deletion.
#[derive(Debug, Clone)]
pub enum DeletionEvent {
    Progress(DeletionProgress),
    Complete(DeletionComplete),
}

/// Start deleting `targets` in the background, one at a time.
///
/// Returns a receiver for progress updates, ending with
/// [`DeletionEvent::Complete`].
pub fn start_deletion(
    targets: Vec<DeletionTarget>,
    fallback: Arc<dyn FallbackDeleter>,
) -> mpsc::Receiver<DeletionEvent> {
    let (tx, rx) = mpsc::channel(DELETION_CHANNEL_SIZE);
    let total = targets.len();

    tokio::spawn(async move {
        let mut result = DeletionComplete::default();

        for target in targets {
            let _ = tx
                .send(DeletionEvent::Progress(DeletionProgress {
                    total,
                    deleted: result.deleted.len(),
                    failed: result.failed(),
                    bytes_freed: result.bytes_freed,
                    current: Some(target.file.path.clone()),
                }))
                .await;

            // Perform deletion in blocking task to not block the async runtime
            let fallback = Arc::clone(&fallback);
            let id = target.file.id;
            let size = target.file.size;
            let name = target.file.name.to_string();
            let outcome =
                tokio::task::spawn_blocking(move || target.execute(fallback.as_ref())).await;

            match outcome {
                Ok(Ok(())) => {
                    result.deleted.push(id);
                    result.bytes_freed += size;
                }
                Ok(Err(err)) => result.errors.push(err),
                Err(join_err) => result.errors.push(DeleteError::Failed {
                    name,
                    reason: join_err.to_string(),
                }),
            }
        }

        info!("{}", result.summary());
        let _ = tx.send(DeletionEvent::Complete(result)).await;
    });

    rx
}
