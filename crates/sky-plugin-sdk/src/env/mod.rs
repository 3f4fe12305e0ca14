//! Typed view of the environment `sky` hands to a plugin.

use std::env;
use std::path::PathBuf;

use sky_plugin_protocol::PluginMode;
use sky_plugin_protocol::env::{
    CONFIG_DIR, NO_COLOR, OUTPUT_FORMAT, PLUGIN, PLUGIN_MODE, PLUGIN_NAME, VERBOSE,
    WORKSPACE_ROOT,
};

/// The cross-tool `NO_COLOR` convention, honoured alongside `SKY_NO_COLOR`.
pub const STANDARD_NO_COLOR: &str = "NO_COLOR";

/// Output format assumed when the host does not request one.
pub const DEFAULT_OUTPUT_FORMAT: &str = "text";

/// Highest verbosity level a plugin is asked for.
pub const MAX_VERBOSITY: u8 = 3;

/// Snapshot of the protocol variables for one plugin invocation.
///
/// ```
/// use sky_plugin_sdk::{PluginEnv, PluginMode};
///
/// let env = PluginEnv::from_lookup(|key| match key {
///     "SKY_PLUGIN" => Some(String::from("1")),
///     "SKY_PLUGIN_MODE" => Some(String::from("metadata")),
///     "SKY_VERBOSE" => Some(String::from("9")),
///     _ => None,
/// });
/// assert!(env.is_plugin());
/// assert_eq!(env.mode(), PluginMode::Metadata);
/// assert_eq!(env.verbosity(), 3);
/// assert_eq!(env.output_format(), "text");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PluginEnv {
    plugin: bool,
    mode: PluginMode,
    plugin_name: Option<String>,
    workspace_root: Option<PathBuf>,
    config_dir: Option<PathBuf>,
    output_format: Option<String>,
    no_color: bool,
    verbosity: u8,
}

impl PluginEnv {
    /// Reads the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Reads variables through `lookup`; empty values count as unset.
    #[must_use]
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.is_empty());
        Self {
            plugin: get(PLUGIN).is_some_and(|value| value == "1"),
            mode: get(PLUGIN_MODE)
                .and_then(|value| value.parse().ok())
                .unwrap_or_default(),
            plugin_name: get(PLUGIN_NAME),
            workspace_root: get(WORKSPACE_ROOT).map(PathBuf::from),
            config_dir: get(CONFIG_DIR).map(PathBuf::from),
            output_format: get(OUTPUT_FORMAT),
            no_color: get(NO_COLOR).is_some_and(|value| value == "1")
                || lookup(STANDARD_NO_COLOR).is_some(),
            verbosity: get(VERBOSE).map_or(0, |value| parse_verbosity(&value)),
        }
    }

    /// Whether the process was launched by `sky` (`SKY_PLUGIN=1`).
    #[must_use]
    pub const fn is_plugin(&self) -> bool {
        self.plugin
    }

    /// Requested mode; anything unrecognised means [`PluginMode::Exec`].
    #[must_use]
    pub const fn mode(&self) -> PluginMode {
        self.mode
    }

    /// Whether the host asked for the metadata document.
    #[must_use]
    pub fn is_metadata_mode(&self) -> bool {
        self.mode == PluginMode::Metadata
    }

    /// Name the plugin is registered under.
    #[must_use]
    pub fn plugin_name(&self) -> Option<&str> {
        self.plugin_name.as_deref()
    }

    /// Workspace root, falling back to the current directory.
    #[must_use]
    pub fn workspace_root(&self) -> Option<PathBuf> {
        self.workspace_root
            .clone()
            .or_else(|| env::current_dir().ok())
    }

    /// Host configuration directory, falling back to `<config dir>/sky`.
    #[must_use]
    pub fn config_dir(&self) -> Option<PathBuf> {
        self.config_dir
            .clone()
            .or_else(|| dirs::config_dir().map(|base| base.join("sky")))
    }

    /// Requested output format, `text` unless the host says otherwise.
    #[must_use]
    pub fn output_format(&self) -> &str {
        self.output_format
            .as_deref()
            .unwrap_or(DEFAULT_OUTPUT_FORMAT)
    }

    /// Whether JSON output was requested.
    #[must_use]
    pub fn is_json_output(&self) -> bool {
        self.output_format() == "json"
    }

    /// Whether colour output should be suppressed.
    #[must_use]
    pub const fn no_color(&self) -> bool {
        self.no_color
    }

    /// Verbosity level between 0 and [`MAX_VERBOSITY`].
    #[must_use]
    pub const fn verbosity(&self) -> u8 {
        self.verbosity
    }
}

fn parse_verbosity(value: &str) -> u8 {
    value
        .trim()
        .parse::<i64>()
        .ok()
        .filter(|level| *level >= 0)
        .map_or(0, |level| {
            u8::try_from(level.min(i64::from(MAX_VERBOSITY))).unwrap_or(MAX_VERBOSITY)
        })
}

#[cfg(test)]
mod tests;
