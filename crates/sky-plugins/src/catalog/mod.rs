//! On-disk catalog of installed plugins and configured marketplaces.
//!
//! The catalog lives under a single root directory:
//!
//! ```text
//! <root>/plugins.json        installed plugin records
//! <root>/marketplaces.json   configured marketplaces
//! <root>/lock                advisory lock sentinel
//! <root>/plugins/            plugin binaries and modules
//! ```
//!
//! [`CatalogStore`] exclusively owns both collections. Mutations run under
//! one exclusive cross-process lock and publish by atomic rename, so readers
//! never observe a partially written file.

mod lock;
mod persist;
mod store;

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sky_plugin_protocol::Metadata;
use time::OffsetDateTime;

use crate::error::PluginError;
use crate::protocol::PluginType;

pub use self::store::CatalogStore;

/// An installed plugin as recorded in `plugins.json`.
///
/// ```
/// use sky_plugins::{Plugin, PluginType};
///
/// let plugin = Plugin::new("hello", PluginType::Sandboxed)
///     .with_version("0.1.0")
///     .with_source("/tmp/hello.wasm");
/// assert_eq!(plugin.declared_type(), "wasm");
/// assert_eq!(plugin.effective_type()?, PluginType::Sandboxed);
/// assert_eq!(plugin.version(), Some("0.1.0"));
/// # Ok::<(), sky_plugins::PluginError>(())
/// ```
///
/// The `type` field is stored verbatim. A record declaring a type this host
/// has no backend for still loads and round-trips; it only fails when run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plugin {
    name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    source: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "time::serde::rfc3339::option"
    )]
    installed_at: Option<OffsetDateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    path: Option<PathBuf>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    plugin_type: Option<String>,
}

impl Plugin {
    /// Creates a record with only a name and type.
    #[must_use]
    pub fn new(name: impl Into<String>, plugin_type: PluginType) -> Self {
        Self {
            name: name.into(),
            version: None,
            description: None,
            source: None,
            installed_at: None,
            path: None,
            plugin_type: Some(plugin_type.as_str().to_owned()),
        }
    }

    /// Sets the version string.
    #[must_use]
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = non_empty(version.into());
        self
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = non_empty(description.into());
        self
    }

    /// Sets the human-readable provenance.
    #[must_use]
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = non_empty(source.into());
        self
    }

    /// Sets the installation timestamp.
    #[must_use]
    pub const fn with_installed_at(mut self, installed_at: OffsetDateTime) -> Self {
        self.installed_at = Some(installed_at);
        self
    }

    /// Sets the binary or module location.
    #[must_use]
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Unique catalog name.
    #[must_use]
    pub const fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Version string, if known.
    #[must_use]
    pub fn version(&self) -> Option<&str> {
        self.version.as_deref().filter(|value| !value.is_empty())
    }

    /// Description, if known.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref().filter(|value| !value.is_empty())
    }

    /// Provenance, if recorded.
    #[must_use]
    pub fn source(&self) -> Option<&str> {
        self.source.as_deref().filter(|value| !value.is_empty())
    }

    /// Installation timestamp, if recorded.
    #[must_use]
    pub const fn installed_at(&self) -> Option<OffsetDateTime> {
        self.installed_at
    }

    /// Binary or module location, if recorded.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref().filter(|path| !path.as_os_str().is_empty())
    }

    /// The `type` value as recorded, `exe` when absent.
    #[must_use]
    pub fn declared_type(&self) -> &str {
        self.plugin_type
            .as_deref()
            .unwrap_or_else(|| PluginType::Native.as_str())
    }

    /// Backend selected by the declared type.
    ///
    /// # Errors
    ///
    /// Returns [`PluginError::UnknownPluginType`] when no backend handles
    /// the declared type.
    pub fn effective_type(&self) -> Result<PluginType, PluginError> {
        PluginType::from_declared(self.plugin_type.as_deref())
    }

    /// Type whose file naming applies to this record's binary. Unhandled
    /// types are laid out like native executables.
    pub(crate) fn layout_type(&self) -> PluginType {
        self.effective_type().unwrap_or_default()
    }

    /// Refreshes version and description from a metadata document.
    ///
    /// Fields the plugin does not declare are left unchanged.
    pub fn apply_metadata(&mut self, metadata: &Metadata) {
        if let Some(version) = metadata.version().filter(|value| !value.is_empty()) {
            self.version = Some(version.to_owned());
        }
        if let Some(summary) = metadata.summary().filter(|value| !value.is_empty()) {
            self.description = Some(summary.to_owned());
        }
    }

    /// Fills in the defaults for records written by older hosts.
    pub(crate) fn normalise(&mut self, store: &CatalogStore) {
        if self.plugin_type.as_deref().is_none_or(str::is_empty) {
            self.plugin_type = Some(PluginType::Native.as_str().to_owned());
        }
        if self.path().is_none() {
            self.path = Some(store.plugin_path(&self.name, self.layout_type()));
        }
    }
}

/// A configured marketplace as recorded in `marketplaces.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Marketplace {
    name: String,
    url: String,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "time::serde::rfc3339::option"
    )]
    added_at: Option<OffsetDateTime>,
}

impl Marketplace {
    /// Creates a marketplace record stamped with the current time.
    #[must_use]
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            added_at: Some(OffsetDateTime::now_utc()),
        }
    }

    /// Unique marketplace name.
    #[must_use]
    pub const fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Index location: an HTTP(S) URL or a local path.
    #[must_use]
    pub const fn url(&self) -> &str {
        self.url.as_str()
    }

    /// Time the marketplace was added, if recorded.
    #[must_use]
    pub const fn added_at(&self) -> Option<OffsetDateTime> {
        self.added_at
    }
}

fn non_empty(value: String) -> Option<String> {
    (!value.is_empty()).then_some(value)
}
