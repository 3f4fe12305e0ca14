//! Plugin runner dispatching to the execution backends.
//!
//! The [`PluginRunner`] is the entry point the CLI uses to execute an
//! installed plugin. It builds the protocol environment from the
//! [`HostContext`], packages an [`Invocation`], and hands it to the backend
//! matching the plugin's type: [`NativeBackend`] for executables and
//! [`SandboxBackend`] for WebAssembly modules.
//!
//! The backend abstraction enables test doubles that return pre-configured
//! outcomes without spawning real processes.

use std::path::{Path, PathBuf};

use sky_plugin_protocol::{METADATA_API_VERSION, Metadata, PluginMode};
use tracing::debug;

use crate::cancel::CancelToken;
use crate::catalog::Plugin;
use crate::error::PluginError;
use crate::process::NativeBackend;
use crate::protocol::{HostContext, PluginType, ProtocolEnv};
use crate::sandboxed::SandboxBackend;

/// Tracing target for runner dispatch.
const RUNNER_TARGET: &str = "sky_plugins::runner";

/// How the plugin's standard streams are connected.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StdioMode {
    /// The plugin shares the host's stdin, stdout, and stderr.
    #[default]
    Inherit,
    /// Stdin is empty and both output streams are captured.
    Capture,
}

/// Everything a backend needs to run one plugin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    name: String,
    program: PathBuf,
    args: Vec<String>,
    env: ProtocolEnv,
    stdio: StdioMode,
}

impl Invocation {
    /// Creates an invocation of `program` on behalf of plugin `name`.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        program: impl Into<PathBuf>,
        args: Vec<String>,
        env: ProtocolEnv,
        stdio: StdioMode,
    ) -> Self {
        Self {
            name: name.into(),
            program: program.into(),
            args,
            env,
            stdio,
        }
    }

    /// Catalog name of the plugin.
    #[must_use]
    pub const fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Executable or module path.
    #[must_use]
    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Arguments after the program name.
    #[must_use]
    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Protocol environment.
    #[must_use]
    pub const fn env(&self) -> &ProtocolEnv {
        &self.env
    }

    /// Stream wiring.
    #[must_use]
    pub const fn stdio(&self) -> StdioMode {
        self.stdio
    }
}

/// Result of a completed plugin run.
///
/// `stdout` and `stderr` are empty unless the invocation captured output.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecOutcome {
    /// Exit status reported by the plugin.
    pub exit_code: i32,
    /// Captured standard output.
    pub stdout: Vec<u8>,
    /// Captured standard error.
    pub stderr: Vec<u8>,
}

impl ExecOutcome {
    /// Creates an outcome with no captured output.
    #[must_use]
    pub const fn exited(exit_code: i32) -> Self {
        Self {
            exit_code,
            stdout: Vec::new(),
            stderr: Vec::new(),
        }
    }
}

/// Trait abstracting how a plugin is executed.
///
/// The production implementations are [`NativeBackend`] and
/// [`SandboxBackend`]. Test code can implement this trait to inject
/// pre-configured outcomes.
///
/// # Example
///
/// ```
/// use sky_plugins::{CancelToken, ExecOutcome, ExecutionBackend, Invocation, PluginError};
///
/// struct AlwaysSucceeds;
///
/// impl ExecutionBackend for AlwaysSucceeds {
///     fn execute(
///         &self,
///         _invocation: &Invocation,
///         _cancel: &CancelToken,
///     ) -> Result<ExecOutcome, PluginError> {
///         Ok(ExecOutcome::exited(0))
///     }
/// }
/// ```
pub trait ExecutionBackend {
    /// Runs the invocation to completion.
    ///
    /// A plugin exit code, zero or not, is a successful outcome.
    ///
    /// # Errors
    ///
    /// Returns a [`PluginError`] when the plugin cannot be started or run,
    /// or [`PluginError::Cancelled`] when cancellation stops it.
    fn execute(
        &self,
        invocation: &Invocation,
        cancel: &CancelToken,
    ) -> Result<ExecOutcome, PluginError>;
}

/// Runs installed plugins through the backend their type selects.
///
/// # Example
///
/// ```rust,no_run
/// use sky_plugins::{CancelToken, CatalogStore, HostContext, PluginRunner};
///
/// # fn main() -> Result<(), sky_plugins::PluginError> {
/// let store = CatalogStore::new("/home/me/.config/sky");
/// let runner = PluginRunner::new(HostContext::new().with_config_dir(store.root()));
/// if let Some(plugin) = store.find_plugin("hello")? {
///     let code = runner.run(&plugin, &["--loud".to_owned()], &CancelToken::new())?;
///     std::process::exit(code);
/// }
/// # Ok(()) }
/// ```
#[derive(Debug, Clone)]
pub struct PluginRunner<N = NativeBackend, S = SandboxBackend> {
    context: HostContext,
    native: N,
    sandboxed: S,
}

impl PluginRunner {
    /// Creates a runner using the production backends.
    #[must_use]
    pub fn new(context: HostContext) -> Self {
        Self::with_backends(context, NativeBackend, SandboxBackend::default())
    }
}

impl<N, S> PluginRunner<N, S> {
    /// Creates a runner with custom backends.
    #[must_use]
    pub const fn with_backends(context: HostContext, native: N, sandboxed: S) -> Self {
        Self {
            context,
            native,
            sandboxed,
        }
    }

    /// Host facts forwarded to plugins.
    #[must_use]
    pub const fn context(&self) -> &HostContext {
        &self.context
    }
}

impl<N: ExecutionBackend, S: ExecutionBackend> PluginRunner<N, S> {
    /// Runs `plugin` in `mode` and returns its outcome.
    ///
    /// # Errors
    ///
    /// Returns [`PluginError::UnknownPluginType`] when no backend handles the
    /// declared type, [`PluginError::MissingPath`] when the record has no
    /// path, or any error produced by the selected backend.
    pub fn dispatch(
        &self,
        plugin: &Plugin,
        mode: PluginMode,
        args: &[String],
        stdio: StdioMode,
        cancel: &CancelToken,
    ) -> Result<ExecOutcome, PluginError> {
        let plugin_type = plugin.effective_type()?;
        let program = plugin.path().ok_or_else(|| PluginError::MissingPath {
            name: plugin.name().to_owned(),
        })?;
        let invocation = Invocation::new(
            plugin.name(),
            program,
            args.to_vec(),
            ProtocolEnv::new(plugin.name(), mode, &self.context),
            stdio,
        );

        debug!(
            target: RUNNER_TARGET,
            plugin = plugin.name(),
            %mode,
            %plugin_type,
            program = %program.display(),
            "dispatching plugin"
        );
        match plugin_type {
            PluginType::Native => self.native.execute(&invocation, cancel),
            PluginType::Sandboxed => self.sandboxed.execute(&invocation, cancel),
        }
    }

    /// Runs `plugin` with `args` in exec mode, sharing the host's streams,
    /// and returns the plugin's exit code.
    ///
    /// # Errors
    ///
    /// Returns the errors of [`PluginRunner::dispatch`].
    pub fn run(
        &self,
        plugin: &Plugin,
        args: &[String],
        cancel: &CancelToken,
    ) -> Result<i32, PluginError> {
        self.dispatch(plugin, PluginMode::Exec, args, StdioMode::Inherit, cancel)
            .map(|outcome| outcome.exit_code)
    }

    /// Asks `plugin` to describe itself.
    ///
    /// # Errors
    ///
    /// Returns [`PluginError::MetadataExit`] on a non-zero exit and
    /// [`PluginError::Protocol`] when the output is not valid metadata.
    pub fn metadata(&self, plugin: &Plugin, cancel: &CancelToken) -> Result<Metadata, PluginError> {
        let outcome = self.dispatch(plugin, PluginMode::Metadata, &[], StdioMode::Capture, cancel)?;
        if outcome.exit_code != 0 {
            return Err(PluginError::MetadataExit {
                name: plugin.name().to_owned(),
                status: outcome.exit_code,
            });
        }
        parse_metadata(plugin.name(), &outcome)
    }
}

/// Decodes and validates a metadata document produced by plugin `name`.
///
/// A document without a name takes the catalog name.
///
/// # Errors
///
/// Returns [`PluginError::Protocol`] when the output does not decode, carries
/// an unsupported `api_version`, or names a different plugin.
pub fn parse_metadata(name: &str, outcome: &ExecOutcome) -> Result<Metadata, PluginError> {
    let protocol_error = |message: String| PluginError::Protocol {
        name: name.to_owned(),
        message,
    };

    let stdout = String::from_utf8_lossy(&outcome.stdout);
    let metadata: Metadata = serde_json::from_str(stdout.trim()).map_err(|_| {
        let stderr = String::from_utf8_lossy(&outcome.stderr);
        let detail = if stderr.trim().is_empty() {
            stdout.trim().to_owned()
        } else {
            stderr.trim().to_owned()
        };
        protocol_error(format!("metadata parse failed: {detail}"))
    })?;

    if metadata.api_version() != METADATA_API_VERSION {
        return Err(protocol_error(format!(
            "metadata api_version {} is unsupported",
            metadata.api_version()
        )));
    }
    if metadata.name().is_empty() {
        return Ok(metadata.with_name(name));
    }
    if metadata.name() != name {
        return Err(protocol_error(format!(
            "metadata name mismatch ({})",
            metadata.name()
        )));
    }
    Ok(metadata)
}
