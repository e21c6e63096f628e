//! Single-instance lock
//!
//! [`LockGuard::acquire`] takes an exclusive, non-blocking advisory lock on a
//! file. The lock is held until the guard is dropped, so every return path
//! of the workflow releases it, including error paths.
//!
//! The lock belongs to the open file handle, not to the file's existence:
//! the file is left in place on release, and a file left behind by a crashed
//! run is simply locked again by the next one.

use crate::error::{Error, Result};
use std::fs::{File, TryLockError};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Held lock; released on drop
#[derive(Debug)]
pub struct LockGuard {
    path: PathBuf,
    file: File,
}

impl LockGuard {
    /// Try to take the lock at `path` without waiting
    ///
    /// Returns [`Error::Locked`] if another holder has it. The current PID is
    /// written to the file for operators; it is never read back.
    pub fn acquire(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        // Not truncated on open: the current holder's PID stays until we own the lock
        let mut file = std::fs::OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)?;

        match file.try_lock() {
            Ok(()) => {}
            Err(TryLockError::WouldBlock) => return Err(Error::Locked { path }),
            Err(TryLockError::Error(e)) => return Err(Error::Lock(e)),
        }

        file.set_len(0)?;
        writeln!(file, "{}", std::process::id())?;
        file.flush()?;

        tracing::debug!("Acquired lock {}", path.display());
        Ok(Self { path, file })
    }

    /// Path of the held lock
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        if let Err(e) = self.file.unlock() {
            tracing::warn!("Failed to unlock {}: {}", self.path.display(), e);
        }

        tracing::debug!("Released lock {}", self.path.display());
    }
}
