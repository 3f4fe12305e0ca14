//! Configuration for the `sky` binary.
//!
//! Settings are resolved from command-line flags, then environment
//! variables, then built-in defaults:
//!
//! | Flag | Environment | Default |
//! |---|---|---|
//! | `--config-dir` | `SKY_CONFIG_DIR` | `<platform config dir>/sky` |
//! | `--log-filter` | `SKY_LOG` | `warn` |
//! | `--log-format` | `SKY_LOG_FORMAT` | `compact` |
//!
//! [`ConfigArgs`] is a `clap` argument group that the CLI flattens into its
//! top-level parser; [`Config::resolve`] turns the parsed values into a
//! [`Config`]. The configuration directory doubles as the plugin catalog
//! root.
//!
//! ```
//! use sky_config::{Config, LogFormat};
//!
//! let config = Config::with_config_dir("/tmp/sky");
//! assert_eq!(config.log_format(), LogFormat::Compact);
//! assert_eq!(config.log_filter(), "warn");
//! ```

mod defaults;
mod logging;

use std::path::{Path, PathBuf};

use clap::Args;
use thiserror::Error;

pub use defaults::{
    CONFIG_DIR_NAME, DEFAULT_LOG_FILTER, default_config_dir, default_log_filter,
    default_log_format,
};
pub use logging::{LogFormat, LogFormatParseError};

/// Environment variable naming the configuration directory.
pub const CONFIG_DIR_ENV: &str = "SKY_CONFIG_DIR";

/// Environment variable holding the tracing filter.
pub const LOG_FILTER_ENV: &str = "SKY_LOG";

/// Environment variable selecting the log format.
pub const LOG_FORMAT_ENV: &str = "SKY_LOG_FORMAT";

/// Global configuration flags shared by every `sky` command.
#[derive(Debug, Clone, Default, PartialEq, Eq, Args)]
pub struct ConfigArgs {
    /// Directory holding the plugin catalog.
    #[arg(long, global = true, env = CONFIG_DIR_ENV, value_name = "DIR")]
    pub config_dir: Option<PathBuf>,

    /// Tracing filter directive, for example `sky_plugins=debug`.
    #[arg(long, global = true, env = LOG_FILTER_ENV, value_name = "FILTER")]
    pub log_filter: Option<String>,

    /// Log output format: `compact` or `json`.
    #[arg(long, global = true, env = LOG_FORMAT_ENV, value_name = "FORMAT")]
    pub log_format: Option<LogFormat>,
}

/// Errors raised while resolving configuration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// Neither a flag, the environment, nor the platform named a directory.
    #[error("cannot determine configuration directory; set {CONFIG_DIR_ENV} or pass --config-dir")]
    NoConfigDir,
}

/// Resolved configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    config_dir: PathBuf,
    log_filter: String,
    log_format: LogFormat,
}

impl Config {
    /// Resolves flags and environment values against the defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NoConfigDir`] when no directory was supplied
    /// and the platform has no configuration directory.
    pub fn resolve(args: &ConfigArgs) -> Result<Self, ConfigError> {
        let config_dir = args
            .config_dir
            .clone()
            .filter(|dir| !dir.as_os_str().is_empty())
            .or_else(default_config_dir)
            .ok_or(ConfigError::NoConfigDir)?;
        let log_filter = args
            .log_filter
            .clone()
            .filter(|filter| !filter.trim().is_empty())
            .unwrap_or_else(|| default_log_filter().to_owned());
        Ok(Self {
            config_dir,
            log_filter,
            log_format: args.log_format.unwrap_or_else(default_log_format),
        })
    }

    /// Builds a configuration rooted at `dir` with default logging.
    #[must_use]
    pub fn with_config_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            config_dir: dir.into(),
            log_filter: default_log_filter().to_owned(),
            log_format: default_log_format(),
        }
    }

    /// Catalog root directory.
    #[must_use]
    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    /// Tracing filter directive.
    #[must_use]
    pub const fn log_filter(&self) -> &str {
        self.log_filter.as_str()
    }

    /// Log output format.
    #[must_use]
    pub const fn log_format(&self) -> LogFormat {
        self.log_format
    }
}

#[cfg(test)]
mod tests;
