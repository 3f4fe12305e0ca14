//! Toolkit for writing `sky` plugins in Rust.
//!
//! A plugin is an ordinary binary (or a WASI module) that `sky` launches with
//! `SKY_PLUGIN=1` and a mode in `SKY_PLUGIN_MODE`. This crate removes the
//! protocol boilerplate:
//!
//! - [`PluginEnv`] reads the protocol variables with their fallbacks.
//! - [`serve`] refuses to run outside `sky`, answers metadata requests, and
//!   runs the plugin body otherwise.
//! - [`Output`] renders results as text or JSON as the host requested.
//!
//! ```rust,no_run
//! use std::process::ExitCode;
//!
//! use sky_plugin_sdk::{Metadata, Plugin, PluginEnv, RunResult};
//!
//! struct Hello;
//!
//! impl Plugin for Hello {
//!     fn metadata(&self) -> Metadata {
//!         Metadata::new("hello").with_version("0.1.0").with_summary("Says hello")
//!     }
//!
//!     fn run(&self, _args: &[String], env: &PluginEnv) -> RunResult {
//!         let root = env.workspace_root().unwrap_or_default();
//!         std::io::Write::write_all(
//!             &mut std::io::stdout(),
//!             format!("hello from {}\n", root.display()).as_bytes(),
//!         )?;
//!         Ok(())
//!     }
//! }
//!
//! fn main() -> ExitCode {
//!     sky_plugin_sdk::serve(&Hello)
//! }
//! ```

pub mod env;
pub mod error;
pub mod output;
pub mod serve;

pub use self::env::PluginEnv;
pub use self::error::SdkError;
pub use self::output::Output;
pub use self::serve::{FnPlugin, Plugin, RunResult, serve, serve_with, write_metadata};
pub use sky_plugin_protocol::{CommandMetadata, METADATA_API_VERSION, Metadata, PluginMode};
