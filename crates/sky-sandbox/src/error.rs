//! Domain errors raised by the sandbox runtime.

use thiserror::Error;

/// Errors raised while preparing or running a sandboxed module.
///
/// Errors reported by `wasmtime` are carried as rendered messages because the
/// engine's error type does not implement [`std::error::Error`].
#[derive(Debug, Error)]
pub enum SandboxError {
    /// The execution engine could not be configured.
    #[error("failed to configure the WebAssembly engine: {message}")]
    Engine {
        /// Rendered engine error.
        message: String,
    },

    /// The module bytes are not a valid WebAssembly module.
    #[error("invalid WebAssembly module: {message}")]
    Compile {
        /// Rendered compilation error.
        message: String,
    },

    /// The WASI imports could not be linked.
    #[error("failed to link WASI imports: {message}")]
    Link {
        /// Rendered linker error.
        message: String,
    },

    /// The module could not be instantiated, for example because it imports
    /// something other than WASI preview 1 or exceeds the memory cap.
    #[error("failed to instantiate module: {message}")]
    Instantiate {
        /// Rendered instantiation error.
        message: String,
    },

    /// The module does not export a `_start` function.
    #[error("module does not export a `_start` entry point")]
    MissingEntryPoint,

    /// The guest trapped before exiting.
    #[error("guest trapped: {message}")]
    Trap {
        /// Rendered trap description.
        message: String,
    },

    /// The guest was interrupted because cancellation was requested.
    #[error("sandboxed execution was cancelled")]
    Cancelled,
}
