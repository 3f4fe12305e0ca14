//! Error types for the CLI runtime and their exit codes.

use std::io;
use std::path::PathBuf;

use sky_config::ConfigError;
use sky_plugins::PluginError;
use thiserror::Error;

use crate::telemetry::TelemetryError;

/// Exit code for operational failures.
pub(crate) const EXIT_FAILURE: u8 = 1;

/// Exit code for usage errors and unknown commands.
pub(crate) const EXIT_USAGE: u8 = 2;

#[derive(Debug, Error)]
pub(crate) enum AppError {
    #[error("{0}")]
    CliUsage(clap::Error),
    #[error("{0}")]
    Usage(String),
    /// Sentinel for an unresolvable command; help has not been written yet.
    #[error("unknown command {0:?}")]
    UnknownCommand(String),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Telemetry(#[from] TelemetryError),
    #[error(transparent)]
    Plugin(#[from] PluginError),
    #[error("failed to install signal handlers: {0}")]
    Signals(io::Error),
    #[error(
        "{0}\nPlugin names must start with a lowercase letter and contain only lowercase letters, digits, and hyphens."
    )]
    InitName(PluginError),
    #[error("failed to determine current directory: {0}")]
    CurrentDir(io::Error),
    #[error("directory {0:?} already exists")]
    DirectoryExists(PathBuf),
    #[error("failed to create directory {}: {source}", path.display())]
    CreateDirectory { path: PathBuf, source: io::Error },
    #[error("failed to create plugin files: {0}")]
    Scaffold(io::Error),
    #[error("failed to run {tool}: {source}")]
    CoreTool { tool: String, source: io::Error },
    #[error("failed to encode metadata: {0}")]
    EncodeMetadata(serde_json::Error),
    #[error("failed to write output: {0}")]
    Output(#[from] io::Error),
}

impl AppError {
    /// Process exit code for this error.
    pub(crate) const fn exit_code(&self) -> u8 {
        match self {
            Self::CliUsage(_) | Self::Usage(_) | Self::UnknownCommand(_) => EXIT_USAGE,
            _ => EXIT_FAILURE,
        }
    }
}

/// Truncates a plugin or tool status to the byte a process can exit with.
pub(crate) fn truncate_status(status: i32) -> u8 {
    u8::try_from(status & 0xff).unwrap_or(EXIT_FAILURE)
}
