// Cross-platform metadata helpers

use std::fs::Metadata;

#[cfg(unix)]
use std::os::unix::fs::MetadataExt;

use coolclean_core::InodeInfo;

/// Bytes actually allocated on disk, when the platform reports it.
#[cfg(unix)]
pub(crate) fn allocated_size(metadata: &Metadata) -> Option<u64> {
    // st_blocks is always in 512-byte units, regardless of the fs block size
    Some(metadata.blocks().saturating_mul(512))
}

#[cfg(not(unix))]
pub(crate) fn allocated_size(_metadata: &Metadata) -> Option<u64> {
    None
}

/// Inode identity of a file, used to spot hardlinks.
#[cfg(unix)]
pub fn inode_info(metadata: &Metadata) -> Option<InodeInfo> {
    Some(InodeInfo::new(metadata.ino(), metadata.dev()))
}

#[cfg(not(unix))]
pub fn inode_info(_metadata: &Metadata) -> Option<InodeInfo> {
    None
}

/// Number of hard links to the file.
#[cfg(unix)]
pub fn link_count(metadata: &Metadata) -> u64 {
    metadata.nlink()
}

#[cfg(not(unix))]
pub fn link_count(_metadata: &Metadata) -> u64 {
    1
}
