//! Exclusive lock guarding one inventory against concurrent runs.
//!
//! The lock file sits next to the database and is held for the whole
//! open-scan-reconcile-report sequence. It is released when dropped.

use fs4::fs_std::FileExt;
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LockError {
    #[error(
        "another run is already using this inventory; wait for it to finish or remove the stale lock at {}",
        path.display()
    )]
    Held { path: PathBuf },

    #[error("failed to create lock file {}: {source}", path.display())]
    Create {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to lock {}: {source}", path.display())]
    Lock {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub struct RunLock {
    _file: File,
}

impl RunLock {
    /// Take the lock for the inventory at `db_path` without waiting.
    pub fn acquire(db_path: &Path) -> Result<Self, LockError> {
        let path = lock_path(db_path);

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| LockError::Create {
                path: path.clone(),
                source,
            })?;
        }

        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&path)
            .map_err(|source| LockError::Create {
                path: path.clone(),
                source,
            })?;

        lock_outcome(FileExt::try_lock_exclusive(&file), &path)?;
        tracing::debug!(path = %path.display(), "acquired run lock");
        Ok(RunLock { _file: file })
    }
}

// `Ok(false)` means another holder; an I/O error (e.g. ENOLCK) is not contention
fn lock_outcome(result: std::io::Result<bool>, path: &Path) -> Result<(), LockError> {
    match result {
        Ok(true) => Ok(()),
        Ok(false) => Err(LockError::Held { path: path.to_path_buf() }),
        Err(source) => Err(LockError::Lock {
            path: path.to_path_buf(),
            source,
        }),
    }
}

fn lock_path(db_path: &Path) -> PathBuf {
    let mut name = db_path.file_name().map(|n| n.to_os_string()).unwrap_or_else(|| "inventory".into());
    name.push(".lock");
    db_path.with_file_name(name)
}
