//! Invocation modes understood by plugins.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, IntoStaticStr};

/// Selects what a plugin is asked to do for a single invocation.
///
/// ```
/// use sky_plugin_protocol::PluginMode;
///
/// let mode: PluginMode = "metadata".parse().expect("known mode");
/// assert_eq!(mode, PluginMode::Metadata);
/// assert_eq!(PluginMode::Exec.as_str(), "exec");
/// ```
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    EnumString,
    Display,
    IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PluginMode {
    /// Run the plugin command with the forwarded arguments.
    #[default]
    Exec,
    /// Emit a metadata document on standard output.
    Metadata,
}

impl PluginMode {
    /// Returns the value placed in `SKY_PLUGIN_MODE`.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        self.into()
    }
}

/// Error returned when a mode string is not recognised.
pub type ParseModeError = strum::ParseError;

#[cfg(test)]
mod tests;
