//! Cross-process exclusive lock guarding catalog mutations.

use std::fs::{File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::debug;

use crate::error::PluginError;

use super::store::CATALOG_TARGET;

/// Held for the duration of a catalog mutation.
///
/// The lock is released when the guard is dropped, on every exit path.
#[derive(Debug)]
pub(crate) struct CatalogLock {
    #[cfg(unix)]
    _guard: nix::fcntl::Flock<File>,
    #[cfg(not(unix))]
    _guard: File,
    path: PathBuf,
}

impl CatalogLock {
    /// Blocks until the exclusive lock on `path` is held.
    pub(crate) fn acquire(path: &Path) -> Result<Self, PluginError> {
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .read(true)
            .write(true)
            .open(path)
            .map_err(|source| lock_error(path, source))?;

        let guard = lock_exclusive(file).map_err(|source| lock_error(path, source))?;
        debug!(target: CATALOG_TARGET, path = %path.display(), "catalog lock acquired");
        Ok(Self {
            _guard: guard,
            path: path.to_path_buf(),
        })
    }
}

impl Drop for CatalogLock {
    fn drop(&mut self) {
        debug!(target: CATALOG_TARGET, path = %self.path.display(), "catalog lock released");
    }
}

#[cfg(unix)]
fn lock_exclusive(file: File) -> io::Result<nix::fcntl::Flock<File>> {
    use nix::fcntl::{Flock, FlockArg};

    Flock::lock(file, FlockArg::LockExclusive).map_err(|(_, errno)| io::Error::from(errno))
}

#[cfg(not(unix))]
fn lock_exclusive(file: File) -> io::Result<File> {
    file.lock()?;
    Ok(file)
}

fn lock_error(path: &Path, source: io::Error) -> PluginError {
    PluginError::Lock {
        path: path.to_path_buf(),
        source: Arc::new(source),
    }
}
