//! Removing entries from disk.

use std::fs;
use std::io;
use std::path::Path;

use tracing::{debug, info, warn};

use coolclean_core::{DeleteError, ScannedFile};

/// Second attempt at deleting a path after direct removal failed.
///
/// Implementations may move the path to the trash, ask a privileged helper,
/// or anything else. Only the outcome matters: `Err` carries a
/// human-readable reason.
pub trait FallbackDeleter: Send + Sync {
    fn delete(&self, path: &Path) -> Result<(), String>;
}

/// Moves the path to the platform trash.
#[derive(Debug, Clone, Copy, Default)]
pub struct TrashDeleter;

impl FallbackDeleter for TrashDeleter {
    fn delete(&self, path: &Path) -> Result<(), String> {
        trash::delete(path).map_err(|e| e.to_string())
    }
}

/// Gives up immediately.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoFallback;

impl FallbackDeleter for NoFallback {
    fn delete(&self, _path: &Path) -> Result<(), String> {
        Err("no fallback deletion available".to_string())
    }
}

/// Remove a file, or a directory with everything in it.
pub fn remove_path(path: &Path) -> io::Result<()> {
    let metadata = fs::symlink_metadata(path)?;
    if metadata.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    }
}

/// Delete a scanned entry, trying `fallback` if direct removal fails.
///
/// This blocks on filesystem work; run it off the async runtime.
pub fn delete_entry(file: &ScannedFile, fallback: &dyn FallbackDeleter) -> Result<(), DeleteError> {
    let direct = match remove_path(&file.path) {
        Ok(()) => {
            info!("Deleted {} ({} bytes)", file.path.display(), file.size);
            return Ok(());
        }
        Err(err) => err,
    };

    debug!(
        "Direct delete of {} failed ({direct}), trying fallback",
        file.path.display()
    );

    match fallback.delete(&file.path) {
        Ok(()) => {
            info!("Deleted {} via fallback ({} bytes)", file.path.display(), file.size);
            Ok(())
        }
        Err(reason) => {
            warn!("Could not delete {}: {direct}; {reason}", file.path.display());
            Err(DeleteError::Failed {
                name: file.name.to_string(),
                reason,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use coolclean_core::Timestamps;
    use std::path::PathBuf;
    use std::sync::Mutex;
    use tempfile::TempDir;

    /// Records what it was asked to delete and reports success.
    #[derive(Default)]
    struct Recording {
        paths: Mutex<Vec<PathBuf>>,
    }

    impl FallbackDeleter for Recording {
        fn delete(&self, path: &Path) -> Result<(), String> {
            self.paths.lock().unwrap().push(path.to_path_buf());
            Ok(())
        }
    }

    #[test]
    fn test_direct_delete_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("old.iso");
        fs::write(&path, b"data").unwrap();
        let file = ScannedFile::new_file(&path, 4, Timestamps::default());

        let fallback = Recording::default();
        delete_entry(&file, &fallback).unwrap();

        assert!(!path.exists());
        assert!(fallback.paths.lock().unwrap().is_empty());
    }

    #[test]
    fn test_direct_delete_directory() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("Big");
        fs::create_dir_all(dir.join("inner")).unwrap();
        fs::write(dir.join("inner/a"), b"aaaa").unwrap();
        let file = ScannedFile::new_directory(&dir, 4, Timestamps::default());

        delete_entry(&file, &NoFallback).unwrap();
        assert!(!dir.exists());
    }

    #[test]
    fn test_fallback_used_when_direct_fails() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("vanished");
        let file = ScannedFile::new_file(&path, 10, Timestamps::default());

        let fallback = Recording::default();
        delete_entry(&file, &fallback).unwrap();

        assert_eq!(*fallback.paths.lock().unwrap(), vec![path]);
    }

    #[test]
    fn test_failure_names_file() {
        let temp = TempDir::new().unwrap();
        let file = ScannedFile::new_file(temp.path().join("ghost.bin"), 10, Timestamps::default());

        let err = delete_entry(&file, &NoFallback).unwrap_err();
        assert_eq!(err.name(), "ghost.bin");
        assert!(err.to_string().contains("ghost.bin"));
    }
}
