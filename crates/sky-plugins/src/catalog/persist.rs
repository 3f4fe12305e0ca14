//! JSON persistence for catalog collections.

use std::fs;
use std::io::{self, Write};
use std::path::Path;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tempfile::Builder;
use tracing::{debug, warn};

use crate::error::PluginError;

use super::store::CATALOG_TARGET;

/// Reads a JSON array from `path`.
///
/// A missing or blank file is an empty collection. A file that fails to
/// decode is also treated as empty, with a warning, so a damaged catalog never
/// blocks the host from starting.
pub(crate) fn read_collection<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, PluginError> {
    let data = match fs::read(path) {
        Ok(data) => data,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(err) => return Err(PluginError::io("read", path, err)),
    };
    if data.iter().all(u8::is_ascii_whitespace) {
        return Ok(Vec::new());
    }
    match serde_json::from_slice::<Option<Vec<T>>>(&data) {
        Ok(items) => Ok(items.unwrap_or_default()),
        Err(err) => {
            warn!(
                target: CATALOG_TARGET,
                path = %path.display(),
                error = %err,
                "ignoring unreadable catalog file"
            );
            Ok(Vec::new())
        }
    }
}

/// Writes `items` to `path` as pretty-printed JSON with a trailing newline.
///
/// The data is written to a temporary file in the same directory, restricted
/// to the owner, flushed to disk, and renamed over `path`.
pub(crate) fn write_collection<T: Serialize>(path: &Path, items: &[T]) -> Result<(), PluginError> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let mut tmp = Builder::new()
        .prefix(".tmp-")
        .suffix(".json")
        .tempfile_in(dir)
        .map_err(|err| PluginError::io("create temporary file in", dir, err))?;

    serde_json::to_writer_pretty(&mut tmp, items).map_err(|source| PluginError::Encode {
        path: path.to_path_buf(),
        source,
    })?;
    tmp.write_all(b"\n")
        .and_then(|()| tmp.as_file().sync_all())
        .map_err(|err| PluginError::io("write", tmp.path().to_path_buf(), err))?;
    restrict_to_owner(tmp.path())?;

    tmp.persist(path)
        .map_err(|err| PluginError::io("replace", path, err.error))?;
    debug!(
        target: CATALOG_TARGET,
        path = %path.display(),
        entries = items.len(),
        "catalog file written"
    );
    Ok(())
}

#[cfg(unix)]
fn restrict_to_owner(path: &Path) -> Result<(), PluginError> {
    use std::os::unix::fs::PermissionsExt;

    fs::set_permissions(path, fs::Permissions::from_mode(0o600))
        .map_err(|err| PluginError::io("set permissions on", path, err))
}

#[cfg(not(unix))]
fn restrict_to_owner(_path: &Path) -> Result<(), PluginError> {
    Ok(())
}
