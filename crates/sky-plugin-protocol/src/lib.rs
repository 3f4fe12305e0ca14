//! Wire contract shared by the `sky` host and its plugins.
//!
//! A plugin is launched once per invocation. The host describes the
//! invocation through environment variables (see [`env`]) and selects one of
//! two [`PluginMode`]s:
//!
//! - [`PluginMode::Exec`]: the plugin runs its command with the forwarded
//!   arguments and its exit code becomes the host's exit code.
//! - [`PluginMode::Metadata`]: the plugin writes a single [`Metadata`] JSON
//!   document to standard output and exits with status zero.
//!
//! Both the native and the sandboxed runtime present the identical contract.

pub mod env;
pub mod metadata;
pub mod mode;

pub use self::metadata::{CommandMetadata, METADATA_API_VERSION, Metadata};
pub use self::mode::{ParseModeError, PluginMode};
