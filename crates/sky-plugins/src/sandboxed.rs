//! Sandboxed plugin execution inside the WebAssembly runtime.
//!
//! [`SandboxBackend`] implements [`ExecutionBackend`] on top of
//! [`sky_sandbox`]. Each invocation reads the module from disk and runs it in
//! a fresh guest that sees exactly the protocol environment, an argument
//! vector starting with the plugin name, and no filesystem or network.

use std::fs;
use std::sync::Arc;

use sky_sandbox::{Sandbox, SandboxError, SandboxProfile};
use tracing::debug;

use crate::cancel::CancelToken;
use crate::error::PluginError;
use crate::runner::{ExecOutcome, ExecutionBackend, Invocation, StdioMode};

/// Tracing target for sandboxed execution.
const SANDBOX_TARGET: &str = "sky_plugins::sandboxed";

/// Executes WebAssembly plugins in the sandbox.
#[derive(Debug, Clone, Copy, Default)]
pub struct SandboxBackend {
    max_memory_bytes: Option<usize>,
}

impl SandboxBackend {
    /// Caps guest linear memory for every run.
    #[must_use]
    pub const fn with_memory_limit(mut self, bytes: usize) -> Self {
        self.max_memory_bytes = Some(bytes);
        self
    }

    fn profile(&self, invocation: &Invocation) -> SandboxProfile {
        let mut profile = SandboxProfile::new(invocation.name()).args(invocation.args());
        for (key, value) in invocation.env().iter() {
            profile = profile.env(key, value);
        }
        if invocation.stdio() == StdioMode::Capture {
            profile = profile.capture_output(Vec::new());
        }
        if let Some(bytes) = self.max_memory_bytes {
            profile = profile.max_memory_bytes(bytes);
        }
        profile
    }
}

impl ExecutionBackend for SandboxBackend {
    fn execute(
        &self,
        invocation: &Invocation,
        cancel: &CancelToken,
    ) -> Result<ExecOutcome, PluginError> {
        let name = invocation.name();
        let module = fs::read(invocation.program())
            .map_err(|err| PluginError::io("read plugin module", invocation.program(), err))?;
        debug!(
            target: SANDBOX_TARGET,
            plugin = name,
            module = %invocation.program().display(),
            bytes = module.len(),
            "running plugin module"
        );

        let outcome = Sandbox::new(self.profile(invocation))
            .run(&module, cancel.flag())
            .map_err(|err| match err {
                SandboxError::Cancelled => PluginError::Cancelled,
                other => PluginError::Sandbox {
                    name: name.to_owned(),
                    source: Arc::new(other),
                },
            })?;
        let (exit_code, stdout, stderr) = outcome.into_parts();
        debug!(target: SANDBOX_TARGET, plugin = name, exit_code, "plugin module exited");
        Ok(ExecOutcome {
            exit_code,
            stdout,
            stderr,
        })
    }
}
