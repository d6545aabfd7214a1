//! Full-content confirmation before deleting a duplicate.

use std::path::Path;

use tracing::debug;

use coolclean_analyze::full_hash;
use coolclean_core::{DeleteError, ScannedFile};

/// Check that `target` has exactly the content of one of `survivors`.
///
/// Group fingerprints of large files are sampled, so two files can share
/// one without being identical. Deleting `target` is only safe once a full
/// digest shows a copy of it will remain on disk. Survivors that can't be
/// read don't count.
///
/// This reads whole files; run it off the async runtime.
pub fn confirm_duplicate<'a>(
    target: &ScannedFile,
    survivors: impl IntoIterator<Item = &'a Path>,
) -> Result<(), DeleteError> {
    let failed = || DeleteError::VerificationFailed {
        name: target.name.to_string(),
    };

    let target_hash = full_hash(&target.path).map_err(|err| {
        debug!("Could not hash {}: {err}", target.path.display());
        failed()
    })?;

    for survivor in survivors {
        if survivor == target.path.as_path() {
            continue;
        }
        match full_hash(survivor) {
            Ok(hash) if hash == target_hash => return Ok(()),
            Ok(_) => debug!(
                "{} differs from {}",
                target.path.display(),
                survivor.display()
            ),
            Err(err) => debug!("Could not hash {}: {err}", survivor.display()),
        }
    }

    Err(failed())
}
