use std::path::PathBuf;

use crate::logging::LogFormat;

/// Default log filter expression used by the `sky` binary.
pub const DEFAULT_LOG_FILTER: &str = "warn";

/// Directory name appended to the platform configuration directory.
pub const CONFIG_DIR_NAME: &str = "sky";

/// Default log filter expression used by the `sky` binary.
#[must_use]
pub const fn default_log_filter() -> &'static str {
    DEFAULT_LOG_FILTER
}

/// Default logging format for the `sky` binary.
#[must_use]
pub const fn default_log_format() -> LogFormat {
    LogFormat::Compact
}

/// Platform default catalog root: `<config dir>/sky`.
///
/// Returns `None` when the platform exposes no configuration directory.
#[must_use]
pub fn default_config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|base| base.join(CONFIG_DIR_NAME))
}
