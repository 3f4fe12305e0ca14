//! Workspace root discovery.

use std::env;
use std::path::{Path, PathBuf};

/// Files or directories marking a workspace root, in lookup order.
pub const WORKSPACE_MARKERS: [&str; 3] = [".sky.yaml", ".sky.yml", ".git"];

/// Locates the workspace root starting from the current directory.
///
/// Returns `None` only when the current directory cannot be determined.
#[must_use]
pub fn find_workspace_root() -> Option<PathBuf> {
    env::current_dir()
        .ok()
        .map(|cwd| find_workspace_root_from(&cwd))
}

/// Walks upward from `start` and returns the first directory containing any
/// of the [`WORKSPACE_MARKERS`].
///
/// When the filesystem root is reached without a match, `start` itself is
/// returned. A relative `start` whose markers sit in the current directory
/// resolves to `.`.
///
/// ```
/// use sky_plugins::workspace::find_workspace_root_from;
///
/// let dir = tempfile::tempdir().expect("tempdir");
/// let nested = dir.path().join("a/b");
/// std::fs::create_dir_all(&nested).expect("mkdir");
/// std::fs::write(dir.path().join(".sky.yaml"), "").expect("marker");
/// assert_eq!(find_workspace_root_from(&nested), dir.path());
/// ```
#[must_use]
pub fn find_workspace_root_from(start: &Path) -> PathBuf {
    nearest_marked(start, has_marker)
}

fn nearest_marked(start: &Path, marked: impl Fn(&Path) -> bool) -> PathBuf {
    match start.ancestors().find(|dir| marked(dir)) {
        Some(dir) if dir.as_os_str().is_empty() => PathBuf::from("."),
        Some(dir) => dir.to_path_buf(),
        None => start.to_path_buf(),
    }
}

fn has_marker(dir: &Path) -> bool {
    WORKSPACE_MARKERS
        .iter()
        .any(|marker| dir.join(marker).exists())
}

#[cfg(test)]
mod tests;
