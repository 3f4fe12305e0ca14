//! Module execution built on top of `wasmtime`.

use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use tracing::debug;
use wasmtime::{Config, Engine, Linker, Module, Store, StoreLimits, StoreLimitsBuilder, Trap};
use wasmtime_wasi::I32Exit;
use wasmtime_wasi::p2::WasiCtxBuilder;
use wasmtime_wasi::p2::pipe::{MemoryInputPipe, MemoryOutputPipe};
use wasmtime_wasi::preview1::{self as p1, WasiP1Ctx};

use crate::error::SandboxError;
use crate::profile::{SandboxProfile, StdioPolicy};

/// Tracing target for sandbox operations.
const SANDBOX_TARGET: &str = "sky_sandbox";

/// Upper bound on captured stdout or stderr.
const CAPTURE_LIMIT_BYTES: usize = 16 * 1024 * 1024;

/// How often the watcher thread checks the cancellation flag.
const CANCEL_POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Result of a completed guest run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SandboxOutcome {
    exit_code: i32,
    stdout: Vec<u8>,
    stderr: Vec<u8>,
}

impl SandboxOutcome {
    /// Exit code reported by the guest.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        self.exit_code
    }

    /// Captured stdout; empty when stdio was inherited.
    #[must_use]
    pub fn stdout(&self) -> &[u8] {
        &self.stdout
    }

    /// Captured stderr; empty when stdio was inherited.
    #[must_use]
    pub fn stderr(&self) -> &[u8] {
        &self.stderr
    }

    /// Splits the outcome into its exit code and captured streams.
    #[must_use]
    pub fn into_parts(self) -> (i32, Vec<u8>, Vec<u8>) {
        (self.exit_code, self.stdout, self.stderr)
    }
}

struct GuestState {
    wasi: WasiP1Ctx,
    limits: StoreLimits,
}

/// Runs WASI preview 1 modules under a [`SandboxProfile`].
///
/// Every call to [`Sandbox::run`] uses a fresh engine and store, so no guest
/// state survives between runs.
#[derive(Debug, Clone)]
pub struct Sandbox {
    profile: SandboxProfile,
}

impl Sandbox {
    /// Creates a sandbox with the supplied profile.
    #[must_use]
    pub const fn new(profile: SandboxProfile) -> Self {
        Self { profile }
    }

    /// Returns the profile applied to every run.
    #[must_use]
    pub const fn profile(&self) -> &SandboxProfile {
        &self.profile
    }

    /// Compiles and runs `module`, calling its `_start` export.
    ///
    /// `cancelled` is polled by a watcher thread for the duration of the run;
    /// once it becomes `true` the guest is interrupted and
    /// [`SandboxError::Cancelled`] is returned.
    ///
    /// # Errors
    ///
    /// Returns a [`SandboxError`] when the module cannot be compiled, linked,
    /// or instantiated, when it lacks `_start`, when it traps, or when the run
    /// is cancelled. A guest exit through `proc_exit` is not an error.
    pub fn run(&self, module: &[u8], cancelled: &AtomicBool) -> Result<SandboxOutcome, SandboxError> {
        if cancelled.load(Ordering::Acquire) {
            return Err(SandboxError::Cancelled);
        }

        let engine = build_engine()?;
        let compiled = Module::new(&engine, module).map_err(|err| SandboxError::Compile {
            message: format!("{err:#}"),
        })?;

        let mut linker: Linker<GuestState> = Linker::new(&engine);
        p1::add_to_linker_sync(&mut linker, |state: &mut GuestState| &mut state.wasi).map_err(
            |err| SandboxError::Link {
                message: format!("{err:#}"),
            },
        )?;

        let (wasi, pipes) = self.build_wasi();
        let limits = self
            .profile
            .memory_limit()
            .map_or_else(StoreLimits::default, |bytes| {
                StoreLimitsBuilder::new().memory_size(bytes).build()
            });
        let mut store = Store::new(&engine, GuestState { wasi, limits });
        store.limiter(|state| &mut state.limits);
        store.set_epoch_deadline(1);

        debug!(
            target: SANDBOX_TARGET,
            program = self.profile.argv().first().map_or("", String::as_str),
            args = self.profile.argv().len().saturating_sub(1),
            env = self.profile.environment().len(),
            "starting sandboxed module"
        );

        let finished = AtomicBool::new(false);
        let result = thread::scope(|scope| {
            scope.spawn(|| watch_cancellation(&engine, cancelled, &finished));
            let result = start(&linker, &mut store, &compiled);
            finished.store(true, Ordering::Release);
            result
        });

        let exit_code = match result {
            Ok(()) => 0,
            Err(err) => classify_failure(&err)?,
        };
        debug!(target: SANDBOX_TARGET, exit_code, "sandboxed module finished");

        let (stdout, stderr) = pipes.map_or_else(
            || (Vec::new(), Vec::new()),
            |(out, err)| (out.contents().to_vec(), err.contents().to_vec()),
        );
        Ok(SandboxOutcome {
            exit_code,
            stdout,
            stderr,
        })
    }

    fn build_wasi(&self) -> (WasiP1Ctx, Option<(MemoryOutputPipe, MemoryOutputPipe)>) {
        let mut builder = WasiCtxBuilder::new();
        builder.args(self.profile.argv());
        for (key, value) in self.profile.environment() {
            builder.env(key, value);
        }

        let pipes = match self.profile.stdio() {
            StdioPolicy::Inherit => {
                builder.inherit_stdio();
                None
            }
            StdioPolicy::Capture { stdin } => {
                let stdout = MemoryOutputPipe::new(CAPTURE_LIMIT_BYTES);
                let stderr = MemoryOutputPipe::new(CAPTURE_LIMIT_BYTES);
                builder.stdin(MemoryInputPipe::new(stdin.clone()));
                builder.stdout(stdout.clone());
                builder.stderr(stderr.clone());
                Some((stdout, stderr))
            }
        };
        (builder.build_p1(), pipes)
    }
}

fn build_engine() -> Result<Engine, SandboxError> {
    let mut config = Config::new();
    config.epoch_interruption(true);
    Engine::new(&config).map_err(|err| SandboxError::Engine {
        message: format!("{err:#}"),
    })
}

fn start(
    linker: &Linker<GuestState>,
    store: &mut Store<GuestState>,
    module: &Module,
) -> Result<(), Failure> {
    let instance = linker
        .instantiate(&mut *store, module)
        .map_err(Failure::Instantiate)?;
    let entry = instance
        .get_typed_func::<(), ()>(&mut *store, "_start")
        .map_err(|_| Failure::MissingEntryPoint)?;
    entry.call(&mut *store, ()).map_err(Failure::Run)
}

enum Failure {
    Instantiate(wasmtime::Error),
    MissingEntryPoint,
    Run(wasmtime::Error),
}

/// Maps a failed run onto an exit code or a sandbox error.
fn classify_failure(failure: &Failure) -> Result<i32, SandboxError> {
    match failure {
        Failure::MissingEntryPoint => Err(SandboxError::MissingEntryPoint),
        Failure::Instantiate(err) => exit_code_of(err).ok_or_else(|| SandboxError::Instantiate {
            message: format!("{err:#}"),
        }),
        Failure::Run(err) => {
            if let Some(code) = exit_code_of(err) {
                return Ok(code);
            }
            if matches!(err.downcast_ref::<Trap>(), Some(Trap::Interrupt)) {
                return Err(SandboxError::Cancelled);
            }
            Err(SandboxError::Trap {
                message: format!("{err:#}"),
            })
        }
    }
}

fn exit_code_of(err: &wasmtime::Error) -> Option<i32> {
    err.downcast_ref::<I32Exit>().map(|exit| exit.0)
}

fn watch_cancellation(engine: &Engine, cancelled: &AtomicBool, finished: &AtomicBool) {
    while !finished.load(Ordering::Acquire) {
        if cancelled.load(Ordering::Acquire) {
            debug!(target: SANDBOX_TARGET, "cancellation requested, interrupting guest");
            engine.increment_epoch();
            return;
        }
        thread::sleep(CANCEL_POLL_INTERVAL);
    }
}
