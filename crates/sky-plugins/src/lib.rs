//! Plugin lifecycle and execution for `sky`.
//!
//! The `sky-plugins` crate implements the extension mechanism of the `sky`
//! tool suite: third parties ship additional commands as plugins that the
//! host discovers, installs, verifies, and executes.
//!
//! # Architecture
//!
//! - [`CatalogStore`] owns the on-disk catalog of installed plugins and
//!   configured marketplaces. Mutations are serialised by one cross-process
//!   lock and published by atomic rename.
//! - [`Installer`] acquires plugin binaries from a local path, a URL, or a
//!   marketplace, verifying SHA-256 digests when supplied.
//! - [`MarketplaceResolver`] searches marketplace indexes and resolves plugin
//!   names to download locations.
//! - [`PluginRunner`] executes a plugin through the backend its type selects:
//!   [`NativeBackend`] spawns a child process and [`SandboxBackend`] runs a
//!   WASI module inside [`sky_sandbox`]. Both hand the plugin the same
//!   [`ProtocolEnv`].
//!
//! Long-running operations take a [`CancelToken`] so a signal handler can
//! stop downloads and running plugins.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::path::Path;
//!
//! use sky_plugins::{CancelToken, CatalogStore, HostContext, Installer, PluginRunner, PluginType};
//!
//! # fn main() -> Result<(), sky_plugins::PluginError> {
//! let store = CatalogStore::new("/home/me/.config/sky");
//! let plugin = Installer::new(store.clone()).install_from_path(
//!     "hello",
//!     Path::new("./target/release/hello"),
//!     Some("0.1.0"),
//!     PluginType::Native,
//! )?;
//!
//! let runner = PluginRunner::new(HostContext::new().with_config_dir(store.root()));
//! let exit_code = runner.run(&plugin, &[], &CancelToken::new())?;
//! # let _ = exit_code;
//! # Ok(()) }
//! ```

pub mod cancel;
pub mod catalog;
pub mod error;
pub mod install;
pub mod marketplace;
pub mod names;
pub mod process;
pub mod protocol;
pub mod runner;
pub mod sandboxed;
mod transport;
pub mod workspace;

#[cfg(test)]
mod tests;

pub use self::cancel::CancelToken;
pub use self::catalog::{CatalogStore, Marketplace, Plugin};
pub use self::error::{ErrorKind, PluginError};
pub use self::install::{Installer, UrlInstall};
pub use self::marketplace::{
    IndexSource, MarketplaceEntry, MarketplaceIndex, MarketplaceResolver, SearchResult,
    TransportIndexSource,
};
pub use self::names::validate_name;
pub use self::process::{NativeBackend, status_code};
pub use self::protocol::{HostContext, PluginType, ProtocolEnv};
pub use self::runner::{ExecOutcome, ExecutionBackend, Invocation, PluginRunner, StdioMode};
pub use self::sandboxed::SandboxBackend;
pub use self::workspace::{find_workspace_root, find_workspace_root_from};
