//! WebAssembly sandbox for `sky` plugins.
//!
//! The `sky-sandbox` crate runs WASI preview 1 modules on [`wasmtime`] with a
//! deliberately narrow view of the host. Callers describe what a guest may
//! see using a [`SandboxProfile`], then execute a module through a
//! [`Sandbox`]:
//!
//! - No directories are preopened, so the guest has no filesystem access.
//! - No sockets are granted.
//! - Only the environment variables named on the profile are visible.
//! - Standard streams are either inherited from the host or captured into
//!   memory.
//! - Linear memory can be capped per run.
//!
//! ```rust,no_run
//! use std::sync::atomic::AtomicBool;
//!
//! use sky_sandbox::{Sandbox, SandboxProfile};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let module = std::fs::read("/tmp/hello.wasm")?;
//! let profile = SandboxProfile::new("hello")
//!     .arg("--greeting")
//!     .env("SKY_PLUGIN", "1")
//!     .capture_output(Vec::new());
//!
//! let cancelled = AtomicBool::new(false);
//! let outcome = Sandbox::new(profile).run(&module, &cancelled)?;
//! println!("exit {}", outcome.exit_code());
//! # Ok(()) }
//! ```
//!
//! A guest calling `proc_exit(n)` yields exit code `n`; returning normally
//! from `_start` yields `0`. Any other trap is reported as a
//! [`SandboxError`]. Setting the cancellation flag interrupts a running guest
//! at its next epoch check.

mod error;
mod profile;
mod sandbox;

pub use error::SandboxError;
pub use profile::{SandboxProfile, StdioPolicy};
pub use sandbox::{Sandbox, SandboxOutcome};

#[cfg(test)]
mod tests;
