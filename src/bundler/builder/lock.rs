//! Exclusive build lock.
//!
//! Clearing the export folder and post-processing both mutate shared state, so
//! only one build may run per asset folder. The lock is an advisory `flock`
//! on unix and a create-new marker file elsewhere. It is released on drop.

use crate::bundler::{Error, Result, error::ErrorExt};
use std::path::{Path, PathBuf};

/// Lock file created inside the asset folder.
pub const LOCK_FILE_NAME: &str = ".bundle-build.lock";

/// Held for the duration of one build.
pub struct BuildLock {
    path: PathBuf,
    #[cfg(unix)]
    _lock: nix::fcntl::Flock<std::fs::File>,
}

impl std::fmt::Debug for BuildLock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BuildLock").field("path", &self.path).finish()
    }
}

impl BuildLock {
    /// Takes the lock for `asset_folder` without waiting.
    ///
    /// # Errors
    ///
    /// [`Error::BuildInProgress`] when another build holds it.
    pub fn acquire(asset_folder: &Path) -> Result<Self> {
        std::fs::create_dir_all(asset_folder).fs_context("creating asset folder", asset_folder)?;
        let path = asset_folder.join(LOCK_FILE_NAME);
        Self::acquire_at(path, asset_folder)
    }

    #[cfg(unix)]
    fn acquire_at(path: PathBuf, asset_folder: &Path) -> Result<Self> {
        use nix::{
            errno::Errno,
            fcntl::{Flock, FlockArg},
        };

        let file = std::fs::OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&path)
            .fs_context("opening build lock", &path)?;

        match Flock::lock(file, FlockArg::LockExclusiveNonblock) {
            Ok(lock) => {
                log::debug!("Acquired build lock {}", path.display());
                Ok(Self { path, _lock: lock })
            }
            Err((_, Errno::EWOULDBLOCK)) => {
                Err(Error::BuildInProgress(asset_folder.to_path_buf()))
            }
            Err((_, errno)) => {
                Err(std::io::Error::from(errno)).fs_context("locking build lock", &path)
            }
        }
    }

    #[cfg(not(unix))]
    fn acquire_at(path: PathBuf, asset_folder: &Path) -> Result<Self> {
        match std::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
        {
            Ok(_) => {
                log::debug!("Acquired build lock {}", path.display());
                Ok(Self { path })
            }
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                Err(Error::BuildInProgress(asset_folder.to_path_buf()))
            }
            Err(e) => Err(e).fs_context("creating build lock", &path),
        }
    }

    /// Path of the lock file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(not(unix))]
impl Drop for BuildLock {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_file(&self.path) {
            log::warn!("Failed to remove build lock {}: {}", self.path.display(), e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_acquire_is_rejected_until_release() {
        let dir = tempfile::tempdir().unwrap();

        let first = BuildLock::acquire(dir.path()).unwrap();
        assert!(matches!(
            BuildLock::acquire(dir.path()),
            Err(Error::BuildInProgress(_))
        ));

        drop(first);
        assert!(BuildLock::acquire(dir.path()).is_ok());
    }
}
