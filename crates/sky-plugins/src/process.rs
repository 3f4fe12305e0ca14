//! Native plugin execution as a child process.
//!
//! [`NativeBackend`] implements [`ExecutionBackend`] by spawning the plugin
//! executable with the protocol environment merged over the host
//! environment. In capture mode stdin is empty and both output streams are
//! drained on background threads so the child never blocks on a full pipe.
//! Waiting polls the child so a cancellation request can kill it.

use std::io::{self, Read};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::{debug, warn};

use crate::cancel::CancelToken;
use crate::error::PluginError;
use crate::runner::{ExecOutcome, ExecutionBackend, Invocation, StdioMode};

/// Tracing target for plugin process operations.
const PLUGIN_TARGET: &str = "sky_plugins::process";

/// Interval between exit checks while waiting for the child.
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Executes plugins by spawning child processes.
///
/// # Example
///
/// ```rust,no_run
/// use sky_plugin_protocol::PluginMode;
/// use sky_plugins::{
///     CancelToken, ExecutionBackend, HostContext, Invocation, NativeBackend, ProtocolEnv,
///     StdioMode,
/// };
///
/// let env = ProtocolEnv::new("hello", PluginMode::Exec, &HostContext::new());
/// let invocation = Invocation::new("hello", "/usr/local/bin/hello", vec![], env, StdioMode::Inherit);
/// let outcome = NativeBackend.execute(&invocation, &CancelToken::new());
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeBackend;

impl ExecutionBackend for NativeBackend {
    fn execute(
        &self,
        invocation: &Invocation,
        cancel: &CancelToken,
    ) -> Result<ExecOutcome, PluginError> {
        cancel.check()?;
        let name = invocation.name();

        let mut command = Command::new(invocation.program());
        command
            .args(invocation.args())
            .envs(invocation.env().iter());
        if invocation.stdio() == StdioMode::Capture {
            command
                .stdin(Stdio::null())
                .stdout(Stdio::piped())
                .stderr(Stdio::piped());
        }

        debug!(
            target: PLUGIN_TARGET,
            plugin = name,
            executable = %invocation.program().display(),
            args = invocation.args().len(),
            "spawning plugin process"
        );
        let mut child = command.spawn().map_err(|err| PluginError::SpawnFailed {
            name: name.to_owned(),
            source: Arc::new(err),
        })?;

        let stdout = child.stdout.take().map(drain);
        let stderr = child.stderr.take().map(drain);
        let status = wait_for_exit(name, &mut child, cancel);
        let outcome = ExecOutcome {
            exit_code: 0,
            stdout: collect(name, stdout),
            stderr: collect(name, stderr),
        };

        let exit_code = status_code(status?);
        debug!(target: PLUGIN_TARGET, plugin = name, exit_code, "plugin process exited");
        Ok(ExecOutcome {
            exit_code,
            ..outcome
        })
    }
}

/// Reads a pipe to its end on a background thread.
fn drain(mut pipe: impl Read + Send + 'static) -> JoinHandle<io::Result<Vec<u8>>> {
    thread::spawn(move || {
        let mut buffer = Vec::new();
        pipe.read_to_end(&mut buffer)?;
        Ok(buffer)
    })
}

/// Joins a drain thread, logging and discarding any read failure.
fn collect(name: &str, handle: Option<JoinHandle<io::Result<Vec<u8>>>>) -> Vec<u8> {
    let Some(reader) = handle else {
        return Vec::new();
    };
    match reader.join() {
        Ok(Ok(buffer)) => buffer,
        Ok(Err(err)) => {
            warn!(target: PLUGIN_TARGET, plugin = name, error = %err, "failed to read plugin output");
            Vec::new()
        }
        Err(_) => Vec::new(),
    }
}

/// Waits for the child to exit, killing it if cancellation is requested.
fn wait_for_exit(
    name: &str,
    child: &mut Child,
    cancel: &CancelToken,
) -> Result<ExitStatus, PluginError> {
    loop {
        match child.try_wait() {
            Ok(Some(status)) => return Ok(status),
            Ok(None) if cancel.is_cancelled() => {
                warn!(target: PLUGIN_TARGET, plugin = name, "cancellation requested, killing plugin");
                drop(child.kill());
                drop(child.wait());
                return Err(PluginError::Cancelled);
            }
            Ok(None) => thread::sleep(POLL_INTERVAL),
            Err(err) => {
                drop(child.kill());
                return Err(PluginError::SpawnFailed {
                    name: name.to_owned(),
                    source: Arc::new(err),
                });
            }
        }
    }
}

/// Maps an exit status to a shell-style exit code.
///
/// Termination by signal `n` reports `128 + n`.
#[must_use]
pub fn status_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }
    1
}
