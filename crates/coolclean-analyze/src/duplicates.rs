//! Duplicate file detection.
//!
//! Runs in three phases:
//! 1. Enumerate every regular file and bucket it by exact size
//! 2. Fingerprint the members of buckets holding two or more files
//! 3. Group files sharing a fingerprint
//!
//! Files with a unique size are never read.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use indexmap::IndexMap;
use jwalk::{Parallelism, WalkDir};
use rayon::prelude::*;
use serde::Serialize;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use coolclean_core::{
    ContentHash, DuplicateConfig, DuplicateGroup, ScanError, ScanWarning, ScannedFile,
    Timestamps, WarningKind,
};
use coolclean_scan::{
    EVENT_CHANNEL_SIZE, InodeTracker, PROGRESS_INTERVAL, ScanHandle, check_root, inode_info,
    link_count,
};

use crate::fingerprint::Fingerprinter;

/// Files fingerprinted per parallel batch.
pub const HASH_BATCH_SIZE: usize = 10;

/// Progress fraction reached when enumeration ends.
const ENUMERATION_WEIGHT: f64 = 0.10;

/// Progress fraction spanned by hashing.
const HASHING_WEIGHT: f64 = 0.85;

/// Where a duplicate scan is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum DuplicatePhase {
    #[default]
    Idle,
    Enumerating,
    Hashing,
    Grouping,
}

/// Events streamed from a duplicate scan.
#[derive(Debug)]
pub enum DuplicateEvent {
    /// The scan moved to another phase.
    PhaseChanged(DuplicatePhase),
    /// The path currently being enumerated.
    PathUpdate(PathBuf),
    /// Overall progress in `[0, 1]`.
    Progress(f64),
    /// A confirmed-by-fingerprint group of two or more files.
    GroupFound(DuplicateGroup),
    /// The scan ended, naturally or by cancellation.
    Completed(DuplicateSummary),
    /// The scan could not run at all.
    Failed(ScanError),
}

/// Totals for a finished duplicate scan.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DuplicateSummary {
    /// Regular files at or above the minimum size.
    pub files_enumerated: u64,
    /// Files that shared their size with another and were fingerprinted.
    pub candidates_hashed: u64,
    /// Groups emitted.
    pub groups_found: u64,
    /// Sum of potential savings over emitted groups.
    pub total_savings: u64,
    /// Entries skipped because they could not be read.
    pub warnings: u64,
    /// Wall time of the scan.
    pub elapsed: Duration,
    /// The scan stopped before finishing.
    pub cancelled: bool,
}

/// Receives the output of [`find_duplicates`].
pub trait DuplicateVisitor {
    /// Polled at every entry, hashing batch and emitted group.
    fn should_stop(&self) -> bool;

    fn on_phase(&mut self, _phase: DuplicatePhase) {}

    fn on_path(&mut self, _path: &Path) {}

    fn on_progress(&mut self, _fraction: f64) {}

    fn on_group(&mut self, group: DuplicateGroup);

    /// A file was left out because it could not be read.
    fn on_warning(&mut self, _warning: ScanWarning) {}
}

/// Run a duplicate scan of `config.root` synchronously.
///
/// Groups are handed to the visitor as soon as hashing is done, so a scan
/// stopped during grouping still keeps the groups emitted before the stop.
pub fn find_duplicates<V: DuplicateVisitor>(
    config: &DuplicateConfig,
    visitor: &mut V,
) -> Result<DuplicateSummary, ScanError> {
    let start = Instant::now();
    check_root(&config.root)?;

    let mut summary = DuplicateSummary::default();

    visitor.on_phase(DuplicatePhase::Enumerating);
    let Some(buckets) = enumerate(config, visitor, &mut summary) else {
        return Ok(finish(summary, start, true));
    };
    visitor.on_progress(ENUMERATION_WEIGHT);

    // A size nobody else shares can't be duplicated.
    let candidates: Vec<ScannedFile> = buckets
        .into_values()
        .filter(|bucket| bucket.len() >= 2)
        .flatten()
        .collect();
    debug!(
        "{} of {} files share a size with another file",
        candidates.len(),
        summary.files_enumerated
    );

    visitor.on_phase(DuplicatePhase::Hashing);
    let fingerprinter = Fingerprinter::from_config(config);
    let total = candidates.len();
    let mut fingerprints: Vec<Option<ContentHash>> = Vec::with_capacity(total);

    for batch in candidates.chunks(HASH_BATCH_SIZE) {
        if visitor.should_stop() {
            return Ok(finish(summary, start, true));
        }

        let hashes: Vec<Option<ContentHash>> = batch
            .par_iter()
            .map(|file| fingerprinter.fingerprint(&file.path, file.size))
            .collect();
        fingerprints.extend(hashes);

        summary.candidates_hashed = fingerprints.len() as u64;
        visitor.on_progress(
            ENUMERATION_WEIGHT + (fingerprints.len() as f64 / total as f64) * HASHING_WEIGHT,
        );
    }

    visitor.on_phase(DuplicatePhase::Grouping);
    let mut by_fingerprint: IndexMap<ContentHash, Vec<ScannedFile>> = IndexMap::new();
    for (file, fingerprint) in candidates.into_iter().zip(fingerprints) {
        match fingerprint {
            Some(hash) => by_fingerprint.entry(hash).or_default().push(file),
            None => {
                debug!("Could not fingerprint {}", file.path.display());
                summary.warnings += 1;
                visitor.on_warning(ScanWarning::new(
                    file.path,
                    "could not read file content",
                    WarningKind::HashError,
                ));
            }
        }
    }

    for (fingerprint, files) in by_fingerprint {
        if files.len() < 2 {
            continue;
        }
        if visitor.should_stop() {
            return Ok(finish(summary, start, true));
        }

        let size = files[0].size;
        let group = DuplicateGroup::new(fingerprint, size, files);
        summary.groups_found += 1;
        summary.total_savings += group.potential_savings();
        visitor.on_group(group);
    }

    visitor.on_progress(1.0);
    Ok(finish(summary, start, false))
}

/// Bucket regular files by exact size, in discovery order.
///
/// Returns `None` if the visitor asked to stop.
fn enumerate<V: DuplicateVisitor>(
    config: &DuplicateConfig,
    visitor: &mut V,
    summary: &mut DuplicateSummary,
) -> Option<IndexMap<u64, Vec<ScannedFile>>> {
    // Never the global pool; fingerprinting keeps it busy.
    let parallelism = match config.threads {
        1 => Parallelism::Serial,
        n => Parallelism::RayonNewPool(n),
    };

    let walker = WalkDir::new(&config.root)
        .parallelism(parallelism)
        .skip_hidden(!config.include_hidden)
        .follow_links(false)
        .min_depth(1);

    let inode_tracker = InodeTracker::new();
    let mut buckets: IndexMap<u64, Vec<ScannedFile>> = IndexMap::new();
    let mut visited: u64 = 0;

    for entry_result in walker {
        if visitor.should_stop() {
            return None;
        }

        let entry = match entry_result {
            Ok(e) => e,
            Err(err) => {
                debug!("Skipping unreadable entry: {err}");
                summary.warnings += 1;
                visitor.on_warning(walk_warning(&err, WarningKind::ReadError));
                continue;
            }
        };

        visited += 1;
        let path = entry.path();
        if visited % PROGRESS_INTERVAL == 0 {
            visitor.on_path(&path);
        }

        if !entry.file_type().is_file() {
            continue;
        }

        let metadata = match entry.metadata() {
            Ok(m) => m,
            Err(err) => {
                debug!("Skipping {}: {err}", path.display());
                summary.warnings += 1;
                visitor.on_warning(walk_warning(&err, WarningKind::MetadataError));
                continue;
            }
        };

        let size = metadata.len();
        if size < config.min_size {
            continue;
        }

        // Hardlinks share storage; only the first path to an inode counts.
        if link_count(&metadata) > 1 {
            if let Some(info) = inode_info(&metadata) {
                if !inode_tracker.track(info) {
                    continue;
                }
            }
        }

        summary.files_enumerated += 1;
        let file = ScannedFile::new_file(path, size, Timestamps::from_metadata(&metadata));
        buckets.entry(size).or_default().push(file);
    }

    Some(buckets)
}

fn finish(mut summary: DuplicateSummary, start: Instant, cancelled: bool) -> DuplicateSummary {
    summary.elapsed = start.elapsed();
    summary.cancelled = cancelled;
    summary
}

/// Runs duplicate scans on a blocking worker, one at a time.
#[derive(Debug, Default)]
pub struct DuplicateScanner {
    current: Option<CancellationToken>,
}

impl DuplicateScanner {
    /// Create a new scanner.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a duplicate scan in the background, cancelling any previous one.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(&mut self, config: DuplicateConfig) -> ScanHandle<DuplicateEvent> {
        self.stop();

        let cancel = CancellationToken::new();
        self.current = Some(cancel.clone());

        let (tx, rx) = mpsc::channel(EVENT_CHANNEL_SIZE);
        let worker_cancel = cancel.clone();

        tokio::task::spawn_blocking(move || {
            info!(
                "Duplicate scan of {} (min size {} bytes)",
                config.root.display(),
                config.min_size
            );

            let mut visitor = ChannelVisitor {
                tx: tx.clone(),
                cancel: worker_cancel,
            };

            let event = match find_duplicates(&config, &mut visitor) {
                Ok(summary) => {
                    info!(
                        "Duplicate scan finished: {} groups, {} bytes reclaimable ({:?}{})",
                        summary.groups_found,
                        summary.total_savings,
                        summary.elapsed,
                        if summary.cancelled { ", cancelled" } else { "" }
                    );
                    DuplicateEvent::Completed(summary)
                }
                Err(err) => {
                    warn!("Duplicate scan failed: {err}");
                    DuplicateEvent::Failed(err)
                }
            };

            let _ = tx.blocking_send(event);
        });

        ScanHandle::new(rx, cancel)
    }

    /// Cancel the running scan, if any.
    pub fn stop(&mut self) {
        if let Some(token) = self.current.take() {
            token.cancel();
        }
    }

    /// Whether a scan started by this scanner has not been stopped.
    pub fn is_running(&self) -> bool {
        self.current.as_ref().is_some_and(|t| !t.is_cancelled())
    }
}

fn walk_warning(err: &jwalk::Error, kind: WarningKind) -> ScanWarning {
    let path = err.path().map(Path::to_path_buf).unwrap_or_default();
    match err.io_error() {
        Some(io) => ScanWarning::from_io(path, io, kind),
        None => ScanWarning::new(path, err.to_string(), kind),
    }
}

struct ChannelVisitor {
    tx: mpsc::Sender<DuplicateEvent>,
    cancel: CancellationToken,
}

impl ChannelVisitor {
    fn send(&self, event: DuplicateEvent) {
        let _ = self.tx.blocking_send(event);
    }
}

impl DuplicateVisitor for ChannelVisitor {
    fn should_stop(&self) -> bool {
        self.cancel.is_cancelled() || self.tx.is_closed()
    }

    fn on_phase(&mut self, phase: DuplicatePhase) {
        debug!("Duplicate scan phase: {phase:?}");
        self.send(DuplicateEvent::PhaseChanged(phase));
    }

    fn on_path(&mut self, path: &Path) {
        self.send(DuplicateEvent::PathUpdate(path.to_path_buf()));
    }

    fn on_progress(&mut self, fraction: f64) {
        self.send(DuplicateEvent::Progress(fraction));
    }

    fn on_group(&mut self, group: DuplicateGroup) {
        self.send(DuplicateEvent::GroupFound(group));
    }

    fn on_warning(&mut self, warning: ScanWarning) {
        debug!("{:?} at {}: {}", warning.kind, warning.path.display(), warning.message);
    }
}
