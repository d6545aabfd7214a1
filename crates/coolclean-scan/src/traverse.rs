//! Depth-first traversal that reports entries at or above a size threshold.

use std::fs;
use std::path::Path;

use tracing::debug;
use walkdir::WalkDir;

use coolclean_core::{ScanConfig, ScanError, ScanWarning, ScannedFile, Timestamps, WarningKind};

use crate::progress::{ProgressTracker, ScanSummary};
use crate::size::SizeResolver;

/// Entries between two progress callbacks.
pub const PROGRESS_INTERVAL: u64 = 50;

/// Receives the output of [`traverse`].
pub trait TraversalVisitor {
    /// Polled before each entry and during directory sizing.
    fn should_stop(&self) -> bool;

    /// An entry qualified.
    fn on_entry(&mut self, entry: ScannedFile);

    /// Periodic notice of the path being processed.
    fn on_progress(&mut self, path: &Path);

    /// An entry was skipped because it could not be read.
    fn on_warning(&mut self, _warning: ScanWarning) {}
}

/// Walk `config.root`, reporting every entry whose size is at least
/// `config.min_size`.
///
/// A qualifying directory is reported as one unit and its subtree is not
/// enumerated further, so nothing inside it is reported again. Hidden
/// entries are skipped (with their subtrees) unless `include_hidden` is set,
/// and entries that can't be stat'd are skipped with a warning.
///
/// Returns early, with whatever was already reported, as soon as the visitor
/// asks to stop. Fails only when the root itself cannot be enumerated.
pub fn traverse<V: TraversalVisitor>(
    config: &ScanConfig,
    visitor: &mut V,
) -> Result<ScanSummary, ScanError> {
    let root = config.root.as_path();
    check_root(root)?;

    let resolver = SizeResolver::new(config);
    let mut tracker = ProgressTracker::new();
    let mut walker = WalkDir::new(root).min_depth(1).follow_links(false).into_iter();

    loop {
        if visitor.should_stop() {
            return Ok(tracker.finish(true));
        }

        let entry = match walker.next() {
            None => break,
            Some(Ok(entry)) => entry,
            Some(Err(err)) => {
                let warning = walk_warning(&err, WarningKind::ReadError);
                debug!("Skipping unreadable entry {}: {err}", warning.path.display());
                tracker.record_warning();
                visitor.on_warning(warning);
                continue;
            }
        };

        tracker.record_visit();
        if tracker.entries_visited() % PROGRESS_INTERVAL == 0 {
            visitor.on_progress(entry.path());
        }

        let file_type = entry.file_type();
        if config.should_skip_hidden(&entry.file_name().to_string_lossy()) {
            if file_type.is_dir() {
                walker.skip_current_dir();
            }
            continue;
        }

        let metadata = match entry.metadata() {
            Ok(m) => m,
            Err(err) => {
                debug!("Skipping {}: {err}", entry.path().display());
                tracker.record_warning();
                visitor.on_warning(walk_warning(&err, WarningKind::MetadataError));
                continue;
            }
        };
        let timestamps = Timestamps::from_metadata(&metadata);

        if file_type.is_dir() {
            let size = resolver.dir_size(entry.path(), || visitor.should_stop());
            if size.interrupted {
                // A partial directory size is an undercount; never report it.
                return Ok(tracker.finish(true));
            }
            if size.bytes >= config.min_size {
                walker.skip_current_dir();
                tracker.record_found();
                visitor.on_entry(ScannedFile::new_directory(entry.path(), size.bytes, timestamps));
            }
        } else if file_type.is_file() {
            let size = resolver.file_size(&metadata);
            if size >= config.min_size {
                tracker.record_found();
                visitor.on_entry(ScannedFile::new_file(entry.path(), size, timestamps));
            }
        }
    }

    Ok(tracker.finish(false))
}

/// Classify a walk error, keeping permission failures apart.
fn walk_warning(err: &walkdir::Error, kind: WarningKind) -> ScanWarning {
    let path = err.path().map(Path::to_path_buf).unwrap_or_default();
    match err.io_error() {
        Some(io) => ScanWarning::from_io(path, io, kind),
        None => ScanWarning::new(path, err.to_string(), kind),
    }
}

/// The root must be a directory we can open for enumeration.
pub fn check_root(root: &Path) -> Result<(), ScanError> {
    let metadata = fs::metadata(root).map_err(|e| ScanError::io(root, e))?;
    if !metadata.is_dir() {
        return Err(ScanError::NotADirectory {
            path: root.to_path_buf(),
        });
    }
    fs::read_dir(root).map_err(|e| ScanError::io(root, e))?;
    Ok(())
}
