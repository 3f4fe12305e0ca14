//! CLI argument definitions for `sky`.
//!
//! Management commands are parsed by `clap`; anything else is captured as an
//! external subcommand and resolved to a core tool or an installed plugin.

use std::ffi::OsString;
use std::path::PathBuf;

use clap::{ArgGroup, Args, Parser, Subcommand};
use sky_config::ConfigArgs;
use sky_plugins::PluginType;

/// Command-line interface for the `sky` tool suite.
#[derive(Parser, Debug)]
#[command(
    name = "sky",
    about = "Starlark tooling with plugin-first command dispatch",
    disable_help_subcommand = true,
    disable_version_flag = true
)]
pub(crate) struct Cli {
    /// Configuration shared by every command.
    #[command(flatten)]
    pub(crate) config: ConfigArgs,
    /// The command to run.
    #[command(subcommand)]
    pub(crate) command: Option<CliCommand>,
}

/// Top-level commands.
#[derive(Subcommand, Debug)]
pub(crate) enum CliCommand {
    /// Shows the sky version.
    Version,
    /// Manages plugins.
    Plugin {
        /// The plugin action to perform.
        #[command(subcommand)]
        action: Option<PluginCommand>,
    },
    /// A core tool (`fmt`, `lint`, ...) or an installed plugin.
    #[command(external_subcommand)]
    External(Vec<OsString>),
}

/// Plugin management actions.
#[derive(Subcommand, Debug)]
pub(crate) enum PluginCommand {
    /// Creates a new plugin project.
    Init(InitArgs),
    /// Lists installed plugins.
    List,
    /// Installs a plugin.
    Install(InstallArgs),
    /// Inspects plugin metadata.
    Inspect {
        /// Installed plugin name.
        name: String,
    },
    /// Removes a plugin.
    Remove {
        /// Installed plugin name.
        name: String,
    },
    /// Searches marketplaces.
    Search {
        /// Case-insensitive substring of a plugin name or description.
        query: String,
        /// Restricts the search to one marketplace.
        #[arg(long, value_name = "NAME")]
        marketplace: Option<String>,
    },
    /// Manages marketplaces.
    Marketplace {
        /// The marketplace action to perform.
        #[command(subcommand)]
        action: Option<MarketplaceCommand>,
    },
}

/// Arguments for `sky plugin install`.
#[derive(Args, Debug, Clone, PartialEq, Eq)]
#[command(group(ArgGroup::new("source").args(["path", "url"])))]
pub(crate) struct InstallArgs {
    /// Name to register the plugin under.
    pub(crate) name: String,
    /// Local plugin binary or module.
    #[arg(long, value_name = "PATH")]
    pub(crate) path: Option<PathBuf>,
    /// Download location: `http(s)://`, `file://`, or a bare path.
    #[arg(long, value_name = "URL")]
    pub(crate) url: Option<String>,
    /// Marketplace to resolve the plugin from.
    #[arg(long, value_name = "NAME")]
    pub(crate) marketplace: Option<String>,
    /// Version to record in the catalog.
    #[arg(long, value_name = "VERSION")]
    pub(crate) version: Option<String>,
    /// Expected SHA-256 digest of a downloaded plugin.
    #[arg(long, value_name = "HEX")]
    pub(crate) sha256: Option<String>,
    /// Plugin type: `exe` or `wasm`. Detected from the source when omitted.
    #[arg(long = "type", value_name = "TYPE", requires = "source")]
    pub(crate) plugin_type: Option<PluginType>,
}

/// Arguments for `sky plugin init`.
#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub(crate) struct InitArgs {
    /// Plugin name, also used as the project directory.
    pub(crate) name: String,
    /// Creates a WASI plugin template instead of a native one.
    #[arg(long)]
    pub(crate) wasm: bool,
}

/// Marketplace management actions.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub(crate) enum MarketplaceCommand {
    /// Lists marketplaces.
    List,
    /// Adds or updates a marketplace.
    Add {
        /// Marketplace name.
        name: String,
        /// Index location: an HTTP(S) URL or a local path.
        url: String,
    },
    /// Removes a marketplace.
    Remove {
        /// Marketplace name.
        name: String,
    },
}
