//! Entry sizing.

use std::fs::Metadata;
use std::path::Path;

use walkdir::WalkDir;

use coolclean_core::{ScanConfig, is_hidden_name};

use crate::meta::allocated_size;

/// How often directory sizing checks its stop predicate, in descendants.
const STOP_CHECK_INTERVAL: u64 = 100;

/// Result of sizing an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedSize {
    /// Bytes accumulated.
    pub bytes: u64,
    /// Sizing stopped early; `bytes` is a lower bound.
    pub interrupted: bool,
}

impl ResolvedSize {
    fn complete(bytes: u64) -> Self {
        Self {
            bytes,
            interrupted: false,
        }
    }
}

/// Computes on-disk sizes for files and directories.
#[derive(Debug, Clone, Copy, Default)]
pub struct SizeResolver {
    apparent_size: bool,
    include_hidden: bool,
}

impl SizeResolver {
    /// Create a resolver following the sizing options of `config`.
    pub fn new(config: &ScanConfig) -> Self {
        Self {
            apparent_size: config.apparent_size,
            include_hidden: config.include_hidden,
        }
    }

    /// Size of a regular file: allocated bytes when known, else logical length.
    pub fn file_size(&self, metadata: &Metadata) -> u64 {
        if self.apparent_size {
            return metadata.len();
        }
        allocated_size(metadata).unwrap_or_else(|| metadata.len())
    }

    /// Size of any entry. Unreadable entries count as 0.
    pub fn resolve(&self, path: &Path, should_stop: impl Fn() -> bool) -> ResolvedSize {
        match std::fs::symlink_metadata(path) {
            Ok(m) if m.is_dir() => self.dir_size(path, should_stop),
            Ok(m) if m.is_file() => ResolvedSize::complete(self.file_size(&m)),
            _ => ResolvedSize::complete(0),
        }
    }

    /// Recursive size of a directory's regular files.
    ///
    /// Hidden entries are skipped unless configured otherwise, and entries
    /// that fail to stat contribute nothing. `should_stop` is polled every
    /// [`STOP_CHECK_INTERVAL`] descendants; once it returns true the partial
    /// sum is returned with `interrupted` set.
    pub fn dir_size(&self, path: &Path, should_stop: impl Fn() -> bool) -> ResolvedSize {
        let include_hidden = self.include_hidden;
        let walker = WalkDir::new(path)
            .min_depth(1)
            .follow_links(false)
            .into_iter()
            .filter_entry(move |e| {
                include_hidden || !is_hidden_name(&e.file_name().to_string_lossy())
            });

        let mut total: u64 = 0;
        let mut visited: u64 = 0;

        for entry in walker {
            visited += 1;
            if visited % STOP_CHECK_INTERVAL == 0 && should_stop() {
                return ResolvedSize {
                    bytes: total,
                    interrupted: true,
                };
            }

            let Ok(entry) = entry else {
                continue;
            };
            if !entry.file_type().is_file() {
                continue;
            }
            if let Ok(metadata) = entry.metadata() {
                total = total.saturating_add(self.file_size(&metadata));
            }
        }

        ResolvedSize::complete(total)
    }
}
