//! Domain errors raised by plugin operations.
//!
//! All errors use `thiserror`-derived enums with structured context so callers
//! can inspect the failure programmatically. I/O errors are wrapped in `Arc`
//! to satisfy the `result_large_err` Clippy lint. [`PluginError::kind`] groups
//! the variants into the coarse [`ErrorKind`] taxonomy used by the CLI.

use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use sky_sandbox::SandboxError;
use thiserror::Error;

/// Errors arising from plugin catalog, installation, and execution.
#[derive(Debug, Error)]
pub enum PluginError {
    /// The name does not match the plugin name grammar.
    #[error("invalid plugin name {name:?}")]
    InvalidName {
        /// Rejected name.
        name: String,
    },

    /// An install source was missing or unusable.
    #[error("{message}")]
    InvalidSource {
        /// Description of the problem.
        message: String,
    },

    /// A plugin type string was not recognised.
    #[error("unknown plugin type {value:?}")]
    UnknownPluginType {
        /// Rejected input.
        value: String,
    },

    /// A marketplace was added without a URL.
    #[error("marketplace url is required")]
    MarketplaceUrlRequired,

    /// The catalog record carries no executable path.
    #[error("plugin {name:?} has no path")]
    MissingPath {
        /// Plugin name.
        name: String,
    },

    /// The plugin is not present in the catalog.
    #[error("plugin {name:?} not installed")]
    NotFound {
        /// Name that was looked up.
        name: String,
    },

    /// The named marketplace is not configured.
    #[error("marketplace {name:?} not configured")]
    MarketplaceNotFound {
        /// Marketplace name.
        name: String,
    },

    /// A marketplace operation ran with no marketplaces configured.
    #[error("no marketplaces configured")]
    NoMarketplaces,

    /// A search restricted to one marketplace matched nothing.
    #[error("no matches in marketplace {marketplace:?}")]
    NoMatchesInMarketplace {
        /// Marketplace name.
        marketplace: String,
    },

    /// A search across all marketplaces matched nothing.
    #[error("no plugins matched {query:?}")]
    NoMatches {
        /// Normalised search query.
        query: String,
    },

    /// The named marketplace does not list the plugin.
    #[error("plugin {name:?} not found in marketplace {marketplace:?}")]
    NotInMarketplace {
        /// Plugin name.
        name: String,
        /// Marketplace name.
        marketplace: String,
    },

    /// No configured marketplace lists the plugin.
    #[error("plugin {name:?} not found in marketplaces")]
    NotInMarketplaces {
        /// Plugin name.
        name: String,
    },

    /// Downloaded bytes did not hash to the expected digest.
    #[error("checksum mismatch: expected {expected} got {actual}")]
    ChecksumMismatch {
        /// Digest supplied by the caller.
        expected: String,
        /// Digest of the received bytes.
        actual: String,
    },

    /// A plugin binary could not be fetched.
    #[error("download plugin from {url}: {message}")]
    Download {
        /// Source URL or path.
        url: String,
        /// Transport failure description.
        message: String,
    },

    /// A marketplace index could not be fetched or decoded.
    #[error("marketplace {name:?}: {message}")]
    Marketplace {
        /// Marketplace name.
        name: String,
        /// Transport or decode failure description.
        message: String,
    },

    /// A plugin violated the metadata protocol.
    #[error("plugin {name:?} {message}")]
    Protocol {
        /// Plugin name.
        name: String,
        /// Description of the violation.
        message: String,
    },

    /// A plugin exited with a non-zero status in metadata mode.
    #[error("plugin {name:?} exited with {status}")]
    MetadataExit {
        /// Plugin name.
        name: String,
        /// Exit status reported by the plugin.
        status: i32,
    },

    /// The plugin process could not be spawned.
    #[error("plugin {name:?} failed to start: {source}")]
    SpawnFailed {
        /// Plugin name.
        name: String,
        /// Underlying I/O error.
        #[source]
        source: Arc<io::Error>,
    },

    /// The sandbox could not run the plugin module.
    #[error("plugin {name:?} sandbox error: {source}")]
    Sandbox {
        /// Plugin name.
        name: String,
        /// Underlying sandbox error.
        #[source]
        source: Arc<SandboxError>,
    },

    /// The catalog lock could not be acquired.
    #[error("failed to lock catalog at {path}: {source}")]
    Lock {
        /// Lock file path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: Arc<io::Error>,
    },

    /// A filesystem operation failed.
    #[error("failed to {action} {path}: {source}")]
    Io {
        /// Short description of the attempted action.
        action: &'static str,
        /// Path involved in the action.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: Arc<io::Error>,
    },

    /// A catalog collection could not be encoded.
    #[error("failed to encode {path}: {source}")]
    Encode {
        /// Target file.
        path: PathBuf,
        /// Underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// The operation was cancelled before it completed.
    #[error("operation cancelled")]
    Cancelled,
}

impl PluginError {
    /// Builds an [`PluginError::Io`] for `action` on `path`.
    pub fn io(action: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            action,
            path: path.into(),
            source: Arc::new(source),
        }
    }

    /// Returns the coarse category of this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidName { .. }
            | Self::InvalidSource { .. }
            | Self::UnknownPluginType { .. }
            | Self::MarketplaceUrlRequired
            | Self::MissingPath { .. } => ErrorKind::Validation,
            Self::NotFound { .. }
            | Self::MarketplaceNotFound { .. }
            | Self::NoMarketplaces
            | Self::NoMatchesInMarketplace { .. }
            | Self::NoMatches { .. }
            | Self::NotInMarketplace { .. }
            | Self::NotInMarketplaces { .. } => ErrorKind::NotFound,
            Self::ChecksumMismatch { .. } => ErrorKind::Integrity,
            Self::Download { .. } | Self::Marketplace { .. } => ErrorKind::Transport,
            Self::Protocol { .. } => ErrorKind::Protocol,
            Self::MetadataExit { .. } | Self::SpawnFailed { .. } | Self::Sandbox { .. } => {
                ErrorKind::Execution
            }
            Self::Lock { .. } => ErrorKind::Concurrency,
            Self::Io { .. } | Self::Encode { .. } => ErrorKind::Io,
            Self::Cancelled => ErrorKind::Cancelled,
        }
    }
}

/// Coarse error categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Bad name, URL, path, or type, rejected before any I/O.
    Validation,
    /// Plugin or marketplace absent.
    NotFound,
    /// Checksum mismatch on a download.
    Integrity,
    /// Network failure, non-success status, or unreadable source.
    Transport,
    /// Malformed or incompatible metadata.
    Protocol,
    /// The plugin could not be run to completion.
    Execution,
    /// Lock acquisition failure.
    Concurrency,
    /// Local filesystem failure.
    Io,
    /// Cancellation was requested.
    Cancelled,
}
