//! File-based locking to prevent concurrent mutation of a corpus.
//!
//! Uses flock-style advisory locking so two admirror invocations cannot
//! rewrite the same lists directory at the same time.

use anyhow::{Context, Result};
use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::path::Path;

/// Lock file kept inside the directory being worked on.
pub const LOCK_FILE_NAME: &str = ".admirror.lock";

/// A guard holding an exclusive lock on a lists directory.
/// The lock is released automatically when the guard is dropped.
pub struct LockGuard {
    _file: File,
}

impl LockGuard {
    /// Acquire the lock for `dir`, failing fast if another instance holds it.
    ///
    /// The file is opened with create+read+write (not truncate) to avoid a
    /// TOCTOU race between creation and lock acquisition.
    pub fn acquire(dir: &Path) -> Result<Self> {
        let path = dir.join(LOCK_FILE_NAME);
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)
            .with_context(|| format!("Failed to open lock file: {}", path.display()))?;

        file.try_lock_exclusive().map_err(|_| {
            anyhow::anyhow!(
                "Another admirror instance is already working on {}",
                dir.display()
            )
        })?;

        Ok(Self { _file: file })
    }
}
