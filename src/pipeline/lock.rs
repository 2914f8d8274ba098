//! Destination probe: is the output file free to be overwritten?
//!
//! The usual failure in practice is a `.docx` still open in Word from the
//! previous run. Checking up front gives a clear "file in use" message
//! instead of whatever the converter prints when its write fails.
//!
//! Two checks run against an existing file:
//!
//! 1. Open it for writing without truncating. Windows refuses this while
//!    Word holds the file; read-only files fail everywhere.
//! 2. Take and immediately release a non-blocking exclusive advisory lock
//!    (`fs4`). Editors that lock on Unix hold this lock while open.

use crate::error::DocumentError;
use fs4::fs_std::FileExt as Fs4FileExt;
use std::fs::OpenOptions;
use std::path::Path;
use tracing::debug;

/// `Ok(())` when `path` does not exist yet or can be overwritten now.
pub fn ensure_output_writable(path: &Path) -> Result<(), DocumentError> {
    if !path.exists() {
        return Ok(());
    }

    let file = OpenOptions::new().write(true).open(path).map_err(|e| {
        debug!("Open-for-write on {} failed: {}", path.display(), e);
        DocumentError::OutputLocked {
            path: path.to_path_buf(),
        }
    })?;

    match Fs4FileExt::try_lock_exclusive(&file) {
        // Dropping `file` releases the lock.
        Ok(true) => Ok(()),
        Ok(false) => Err(DocumentError::OutputLocked {
            path: path.to_path_buf(),
        }),
        Err(e) => {
            // Some network filesystems do not support advisory locks at all.
            debug!("Lock probe unsupported on {}: {}", path.display(), e);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_writable() {
        let dir = tempfile::tempdir().unwrap();
        assert!(ensure_output_writable(&dir.path().join("new.docx")).is_ok());
    }

    #[test]
    fn unlocked_existing_file_is_writable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("old.docx");
        std::fs::write(&path, b"PK").unwrap();
        assert!(ensure_output_writable(&path).is_ok());
        // Probe must not truncate.
        assert_eq!(std::fs::read(&path).unwrap(), b"PK");
    }

    #[cfg(unix)]
    #[test]
    fn locked_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("open.docx");
        std::fs::write(&path, b"PK").unwrap();

        let holder = std::fs::File::open(&path).unwrap();
        assert!(Fs4FileExt::try_lock_exclusive(&holder).unwrap());

        let err = ensure_output_writable(&path).unwrap_err();
        assert_eq!(err, DocumentError::OutputLocked { path: path.clone() });

        drop(holder);
        assert!(ensure_output_writable(&path).is_ok());
    }
}
