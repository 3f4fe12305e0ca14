//! Protocol entry point for plugin binaries.
//!
//! [`serve`] handles everything the host expects from a plugin: it refuses to
//! run outside `sky`, answers metadata requests, and otherwise runs the
//! plugin body with the forwarded arguments.

use std::env;
use std::error::Error;
use std::io::{self, Write};
use std::process::ExitCode;

use sky_plugin_protocol::{METADATA_API_VERSION, Metadata};

use crate::env::PluginEnv;
use crate::error::SdkError;

/// Result of a plugin body; an error is printed and exits with status 1.
pub type RunResult = Result<(), Box<dyn Error + Send + Sync>>;

/// A plugin served through [`serve`].
pub trait Plugin {
    /// Self-description returned in metadata mode.
    fn metadata(&self) -> Metadata;

    /// Runs the plugin with the arguments after the program name.
    ///
    /// # Errors
    ///
    /// Any error is reported on standard error and the process exits with 1.
    fn run(&self, args: &[String], env: &PluginEnv) -> RunResult;
}

/// A plugin assembled from metadata and a closure.
///
/// ```
/// use sky_plugin_sdk::{FnPlugin, Metadata, Plugin, PluginEnv};
///
/// let plugin = FnPlugin::new(Metadata::new("hello"), |args: &[String], _env: &PluginEnv| {
///     assert!(args.is_empty());
///     Ok(())
/// });
/// assert_eq!(plugin.metadata().name(), "hello");
/// assert!(plugin.run(&[], &PluginEnv::default()).is_ok());
/// ```
pub struct FnPlugin<F> {
    metadata: Metadata,
    body: F,
}

impl<F> FnPlugin<F>
where
    F: Fn(&[String], &PluginEnv) -> RunResult,
{
    /// Pairs `metadata` with the plugin `body`.
    pub const fn new(metadata: Metadata, body: F) -> Self {
        Self { metadata, body }
    }
}

impl<F> Plugin for FnPlugin<F>
where
    F: Fn(&[String], &PluginEnv) -> RunResult,
{
    fn metadata(&self) -> Metadata {
        self.metadata.clone()
    }

    fn run(&self, args: &[String], env: &PluginEnv) -> RunResult {
        (self.body)(args, env)
    }
}

/// Serves `plugin` using the process environment, arguments, and streams.
///
/// ```rust,no_run
/// use std::process::ExitCode;
///
/// use sky_plugin_sdk::{FnPlugin, Metadata, PluginEnv};
///
/// fn main() -> ExitCode {
///     sky_plugin_sdk::serve(&FnPlugin::new(
///         Metadata::new("hello").with_version("0.1.0"),
///         |_args: &[String], _env: &PluginEnv| Ok(()),
///     ))
/// }
/// ```
pub fn serve<P: Plugin>(plugin: &P) -> ExitCode {
    let args: Vec<String> = env::args().skip(1).collect();
    let status = serve_with(
        plugin,
        &PluginEnv::from_env(),
        &args,
        &mut io::stdout(),
        &mut io::stderr(),
    );
    ExitCode::from(status)
}

/// Serves `plugin` against explicit inputs and returns the exit status.
pub fn serve_with<P: Plugin>(
    plugin: &P,
    env: &PluginEnv,
    args: &[String],
    stdout: &mut dyn Write,
    stderr: &mut dyn Write,
) -> u8 {
    if !env.is_plugin() {
        let _ = writeln!(
            stderr,
            "This is a sky plugin. Run it with: sky {}",
            plugin.metadata().name()
        );
        return 1;
    }

    if env.is_metadata_mode() {
        return match write_metadata(stdout, plugin.metadata()) {
            Ok(()) => 0,
            Err(err) => {
                let _ = writeln!(stderr, "{err}");
                1
            }
        };
    }

    match plugin.run(args, env) {
        Ok(()) => 0,
        Err(err) => {
            let _ = writeln!(stderr, "{err}");
            1
        }
    }
}

/// Writes `metadata` as one JSON document, defaulting a zero `api_version`
/// to the current protocol version.
///
/// # Errors
///
/// Returns [`SdkError::Encode`] or [`SdkError::Io`].
pub fn write_metadata(out: &mut dyn Write, metadata: Metadata) -> Result<(), SdkError> {
    let metadata = if metadata.api_version() == 0 {
        metadata.with_api_version(METADATA_API_VERSION)
    } else {
        metadata
    };
    serde_json::to_writer(&mut *out, &metadata).map_err(SdkError::Encode)?;
    writeln!(out).map_err(SdkError::Io)?;
    out.flush().map_err(SdkError::Io)
}
