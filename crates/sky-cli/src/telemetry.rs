//! Tracing set-up for a `sky` invocation.
//!
//! Events are written to stderr only. Stdout carries tables, metadata
//! documents, and plugin output, and must stay clean for pipelines.

use std::io::{self, IsTerminal};

use once_cell::sync::OnceCell;
use sky_config::{Config, LogFormat};
use tracing::subscriber::SetGlobalDefaultError;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt};

static INSTALLED: OnceCell<TelemetryHandle> = OnceCell::new();

/// Describes the subscriber installed for this process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TelemetryHandle {
    format: LogFormat,
}

impl TelemetryHandle {
    /// Format chosen by the first successful [`initialise`] call.
    #[must_use]
    pub const fn format(self) -> LogFormat {
        self.format
    }
}

/// Errors encountered while configuring telemetry.
#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    /// The filter directive could not be parsed.
    #[error("invalid log filter: {0}")]
    Filter(String),
    /// A global subscriber was already installed by someone else.
    #[error("failed to install telemetry subscriber: {0}")]
    Subscriber(SetGlobalDefaultError),
}

/// Installs the global subscriber on first use.
///
/// Later calls leave the existing subscriber in place and return the handle
/// recorded by the first call, whatever `config` says.
///
/// # Errors
///
/// Returns [`TelemetryError::Filter`] for an unparsable filter directive and
/// [`TelemetryError::Subscriber`] when another global subscriber exists.
///
/// # Examples
///
/// ```rust
/// use sky_cli::telemetry;
/// use sky_config::{Config, LogFormat};
///
/// # fn main() -> Result<(), sky_cli::telemetry::TelemetryError> {
/// let config = Config::with_config_dir("/tmp/sky");
/// let handle = telemetry::initialise(&config)?;
/// assert_eq!(handle.format(), LogFormat::Compact);
/// assert_eq!(telemetry::initialise(&config)?, handle);
/// # Ok(())
/// # }
/// ```
pub fn initialise(config: &Config) -> Result<TelemetryHandle, TelemetryError> {
    INSTALLED
        .get_or_try_init(|| install(config))
        .copied()
}

fn install(config: &Config) -> Result<TelemetryHandle, TelemetryError> {
    let filter = EnvFilter::try_new(config.log_filter())
        .map_err(|error| TelemetryError::Filter(error.to_string()))?;
    let format = config.log_format();

    let base = fmt::layer()
        .with_writer(io::stderr)
        .with_target(true)
        .with_timer(fmt::time::UtcTime::rfc_3339());
    let events = if format.is_structured() {
        base.json().flatten_event(true).boxed()
    } else {
        base.compact()
            .with_ansi(io::stderr().is_terminal())
            .boxed()
    };

    let subscriber = Registry::default().with(events.with_filter(filter));
    tracing::subscriber::set_global_default(subscriber).map_err(TelemetryError::Subscriber)?;
    Ok(TelemetryHandle { format })
}
