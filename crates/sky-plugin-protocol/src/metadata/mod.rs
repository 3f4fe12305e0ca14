//! Metadata document emitted by plugins in metadata mode.

use serde::{Deserialize, Serialize};

/// The only metadata document version this protocol understands.
pub const METADATA_API_VERSION: u32 = 1;

/// Self-description a plugin writes to standard output in metadata mode.
///
/// Missing `api_version` and `name` fields decode as `0` and the empty string
/// so that the host can report a precise protocol violation instead of a
/// generic decode failure.
///
/// ```
/// use sky_plugin_protocol::{CommandMetadata, Metadata};
///
/// let metadata = Metadata::new("hello")
///     .with_version("0.1.0")
///     .with_summary("Greets the workspace")
///     .with_command(CommandMetadata::new("hello").with_summary("Say hello"));
/// let json = serde_json::to_string(&metadata).expect("serialise");
/// assert!(json.contains("\"api_version\":1"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    #[serde(default)]
    api_version: u32,
    #[serde(default)]
    name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    summary: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    commands: Vec<CommandMetadata>,
}

impl Metadata {
    /// Creates a metadata document at the current API version.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            api_version: METADATA_API_VERSION,
            name: name.into(),
            ..Self::default()
        }
    }

    /// Overrides the declared API version.
    #[must_use]
    pub const fn with_api_version(mut self, api_version: u32) -> Self {
        self.api_version = api_version;
        self
    }

    /// Sets the plugin version string.
    #[must_use]
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Sets the one-line summary.
    #[must_use]
    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    /// Appends a sub-command description.
    #[must_use]
    pub fn with_command(mut self, command: CommandMetadata) -> Self {
        self.commands.push(command);
        self
    }

    /// Replaces the declared name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Declared protocol version.
    #[must_use]
    pub const fn api_version(&self) -> u32 {
        self.api_version
    }

    /// Declared plugin name, empty when the plugin omitted it.
    #[must_use]
    pub const fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Declared plugin version.
    #[must_use]
    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    /// Declared summary.
    #[must_use]
    pub fn summary(&self) -> Option<&str> {
        self.summary.as_deref()
    }

    /// Declared sub-commands.
    #[must_use]
    pub fn commands(&self) -> &[CommandMetadata] {
        &self.commands
    }
}

/// Description of a single plugin sub-command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandMetadata {
    name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    summary: Option<String>,
}

impl CommandMetadata {
    /// Creates a command description.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            summary: None,
        }
    }

    /// Sets the command summary.
    #[must_use]
    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    /// Command name.
    #[must_use]
    pub const fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Command summary.
    #[must_use]
    pub fn summary(&self) -> Option<&str> {
        self.summary.as_deref()
    }
}
