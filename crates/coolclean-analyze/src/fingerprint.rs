//! Content fingerprints for duplicate detection.
//!
//! Small files are hashed whole. Larger files are reduced to three samples
//! (head, middle, tail) plus their length, which keeps hashing cost flat no
//! matter how big a file gets. Sampled fingerprints can collide, so any
//! destructive use should confirm with [`full_hash`] first.

use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::Path;

use blake3::Hasher;

use coolclean_core::{ContentHash, DEFAULT_SAMPLE_SIZE, DEFAULT_SMALL_FILE_LIMIT, DuplicateConfig};

/// Read buffer for whole-file hashing.
const READ_BUFFER_SIZE: usize = 64 * 1024;

/// Computes sampled content fingerprints.
#[derive(Debug, Clone, Copy)]
pub struct Fingerprinter {
    small_file_limit: u64,
    sample_size: u64,
}

impl Fingerprinter {
    /// Create a fingerprinter with the default limits.
    pub fn new() -> Self {
        Self {
            small_file_limit: DEFAULT_SMALL_FILE_LIMIT,
            sample_size: DEFAULT_SAMPLE_SIZE,
        }
    }

    /// Create a fingerprinter using the limits of a duplicate scan.
    pub fn from_config(config: &DuplicateConfig) -> Self {
        Self {
            small_file_limit: config.small_file_limit,
            sample_size: config.sample_size.max(1),
        }
    }

    /// Fingerprint the file at `path`, whose size is already known.
    ///
    /// Returns `None` if the file can't be opened or read.
    pub fn fingerprint(&self, path: &Path, size: u64) -> Option<ContentHash> {
        let mut file = File::open(path).ok()?;
        let mut hasher = Hasher::new();

        if size <= self.small_file_limit {
            hash_reader(&mut hasher, &mut file).ok()?;
        } else {
            let middle = size / 2;
            let tail = size.saturating_sub(self.sample_size);
            for offset in [0, middle, tail] {
                let sample = self.read_sample(&mut file, offset).ok()?;
                hasher.update(&sample);
            }
            hasher.update(&size.to_le_bytes());
        }

        Some(ContentHash::new(*hasher.finalize().as_bytes()))
    }

    /// Read up to `sample_size` bytes starting at `offset`.
    fn read_sample(&self, file: &mut File, offset: u64) -> io::Result<Vec<u8>> {
        file.seek(SeekFrom::Start(offset))?;
        let mut sample = Vec::with_capacity(self.sample_size as usize);
        file.by_ref().take(self.sample_size).read_to_end(&mut sample)?;
        Ok(sample)
    }
}

impl Default for Fingerprinter {
    fn default() -> Self {
        Self::new()
    }
}

/// Fingerprint `path` with the default limits.
pub fn fingerprint(path: &Path, size: u64) -> Option<ContentHash> {
    Fingerprinter::new().fingerprint(path, size)
}

/// BLAKE3 digest of a file's entire content.
///
/// Large files are memory-mapped and hashed on the rayon pool.
pub fn full_hash(path: &Path) -> io::Result<ContentHash> {
    let mut hasher = Hasher::new();
    hasher.update_mmap_rayon(path)?;
    Ok(ContentHash::new(*hasher.finalize().as_bytes()))
}

fn hash_reader(hasher: &mut Hasher, reader: &mut impl Read) -> io::Result<()> {
    let mut buffer = vec![0u8; READ_BUFFER_SIZE];
    loop {
        let bytes_read = reader.read(&mut buffer)?;
        if bytes_read == 0 {
            return Ok(());
        }
        hasher.update(&buffer[..bytes_read]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_small_file_hashes_whole_content() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("small.txt");
        fs::write(&path, b"hello duplicate").unwrap();

        let hash = fingerprint(&path, 15).unwrap();
        assert_eq!(hash.0, *blake3::hash(b"hello duplicate").as_bytes());
    }

    #[test]
    fn test_fingerprint_is_stable() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("data.bin");
        let data: Vec<u8> = (0..400 * 1024).map(|i| (i % 251) as u8).collect();
        fs::write(&path, &data).unwrap();

        let size = data.len() as u64;
        assert_eq!(fingerprint(&path, size), fingerprint(&path, size));
    }

    #[test]
    fn test_unsampled_region_is_ignored() {
        let temp = TempDir::new().unwrap();
        let size = 512 * 1024;
        let mut a = vec![7u8; size];
        let mut b = a.clone();
        // Between the head and middle samples.
        a[100 * 1024] = 1;
        b[100 * 1024] = 2;
        fs::write(temp.path().join("a"), &a).unwrap();
        fs::write(temp.path().join("b"), &b).unwrap();

        let fa = fingerprint(&temp.path().join("a"), size as u64);
        let fb = fingerprint(&temp.path().join("b"), size as u64);
        assert!(fa.is_some());
        assert_eq!(fa, fb);

        // The full digest tells them apart.
        let ha = full_hash(&temp.path().join("a")).unwrap();
        let hb = full_hash(&temp.path().join("b")).unwrap();
        assert_ne!(ha, hb);

        a[size / 2] = 9;
        fs::write(temp.path().join("a"), &a).unwrap();
        assert_ne!(fingerprint(&temp.path().join("a"), size as u64), fb);
    }

    #[test]
    fn test_size_is_part_of_sampled_fingerprint() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("data.bin");
        fs::write(&path, vec![3u8; 300 * 1024]).unwrap();

        let fingerprinter = Fingerprinter::new();
        let a = fingerprinter.fingerprint(&path, 300 * 1024);
        let b = fingerprinter.fingerprint(&path, 300 * 1024 + 1);
        assert_ne!(a, b);
    }

    #[test]
    fn test_unreadable_file_has_no_fingerprint() {
        let temp = TempDir::new().unwrap();
        assert!(fingerprint(&temp.path().join("missing"), 10).is_none());
        assert!(full_hash(&temp.path().join("missing")).is_err());
    }

    #[test]
    fn test_full_hash_matches_small_fingerprint() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("file");
        fs::write(&path, vec![42u8; 2000]).unwrap();

        assert_eq!(full_hash(&path).ok(), fingerprint(&path, 2000));
    }
}
