//! CLI entrypoint for the `sky` tool suite.
//!
//! The binary delegates to [`sky_cli::run`], which parses arguments, resolves
//! configuration, installs telemetry, and dispatches to plugin management,
//! core tools, or installed plugins.

use std::io;
use std::process::ExitCode;

fn main() -> ExitCode {
    // Plugins share these streams, so they are not locked for the whole run.
    let mut stdout = io::stdout();
    let mut stderr = io::stderr();
    sky_cli::run(std::env::args_os(), &mut stdout, &mut stderr)
}
