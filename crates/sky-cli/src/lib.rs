//! Command-line runtime for the `sky` tool suite.
//!
//! The module owns argument parsing, configuration bootstrapping, telemetry
//! set-up, and command dispatch. Commands `clap` does not recognise are
//! resolved plugin-first: a core tool alias runs its executable when present,
//! and any other name runs the installed plugin of that name. The runtime is
//! exercised both from the binary entrypoint and from tests that substitute
//! the output streams.

use std::ffi::OsString;
use std::io::{self, Write};
use std::process::ExitCode;

use clap::Parser;
use clap::error::ErrorKind as ClapErrorKind;
use sky_config::Config;
use sky_plugins::CancelToken;
use tracing::debug;

mod cli;
mod commands;
mod errors;
mod signals;
mod suggest;
mod table;
pub mod telemetry;

use cli::Cli;
use commands::{Output, Session};
use errors::{AppError, truncate_status};

/// Tracing target for the CLI runtime.
const CLI_TARGET: &str = "sky_cli";

/// Runs the CLI using the provided arguments and IO handles.
#[must_use]
pub fn run<I, W, E>(args: I, stdout: &mut W, stderr: &mut E) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
    W: Write,
    E: Write,
{
    let mut out = Output { stdout, stderr };
    let status = match run_inner(args, &mut out) {
        Ok(status) => truncate_status(status),
        Err(error) => report(&error, &mut out),
    };
    let _ = out.stdout.flush();
    ExitCode::from(status)
}

fn run_inner<I>(args: I, out: &mut Output<'_>) -> Result<i32, AppError>
where
    I: IntoIterator<Item = OsString>,
{
    let cli = match Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(error)
            if matches!(
                error.kind(),
                ClapErrorKind::DisplayHelp | ClapErrorKind::DisplayVersion
            ) =>
        {
            write!(out.stdout, "{error}")?;
            return Ok(0);
        }
        Err(error) => return Err(AppError::CliUsage(error)),
    };

    let Some(command) = cli.command else {
        write_usage(out.stderr)?;
        return Ok(0);
    };

    let config = Config::resolve(&cli.config)?;
    telemetry::initialise(&config)?;
    debug!(
        target: CLI_TARGET,
        config_dir = %config.config_dir().display(),
        "configuration resolved"
    );

    let cancel = CancelToken::new();
    signals::forward_to(&cancel).map_err(AppError::Signals)?;
    let session = Session::new(&config, cancel);
    commands::dispatch(command, &session, out)
}

/// Writes `error` to stderr and returns the exit code it maps to.
fn report(error: &AppError, out: &mut Output<'_>) -> u8 {
    let written = match error {
        AppError::CliUsage(clap_error) => write!(out.stderr, "{clap_error}"),
        AppError::UnknownCommand(command) => suggest::write_unknown_command(out.stderr, command),
        other => writeln!(out.stderr, "sky: {other}"),
    };
    if let Err(write_error) = written {
        debug!(target: CLI_TARGET, error = %write_error, "failed to report error");
    }
    error.exit_code()
}

/// Top-level usage, shown for a bare `sky`.
pub(crate) fn write_usage(out: &mut dyn Write) -> io::Result<()> {
    writeln!(out, "usage: sky <command> [args]")?;
    writeln!(out)?;
    writeln!(out, "starlark tools:")?;
    for tool in suggest::CORE_TOOLS {
        writeln!(out, "  {:<12} {}", tool.name, tool.summary)?;
    }
    writeln!(out)?;
    writeln!(out, "management:")?;
    writeln!(out, "  {:<12} manage plugins", "plugin")?;
    writeln!(out, "  {:<12} show version", "version")?;
    writeln!(out)?;
    writeln!(out, "plugin-first:")?;
    writeln!(out, "  unknown commands are resolved to installed plugins")?;
    writeln!(out)?;
    writeln!(out, "run \"sky plugin --help\" for plugin commands")
}

/// Usage for a bare `sky plugin`.
pub(crate) fn write_plugin_usage(out: &mut dyn Write) -> io::Result<()> {
    writeln!(out, "usage: sky plugin <command> [args]")?;
    writeln!(out)?;
    writeln!(out, "commands:")?;
    writeln!(out, "  init <name>              create a new plugin project")?;
    writeln!(out, "  list                     list installed plugins")?;
    writeln!(out, "  install <name>           install a plugin")?;
    writeln!(out, "  inspect <name>           inspect plugin metadata")?;
    writeln!(out, "  remove <name>            remove a plugin")?;
    writeln!(out, "  search <query>           search marketplaces")?;
    writeln!(out, "  marketplace <command>    manage marketplaces")
}

/// Usage for a bare `sky plugin marketplace`.
pub(crate) fn write_marketplace_usage(out: &mut dyn Write) -> io::Result<()> {
    writeln!(out, "usage: sky plugin marketplace <command> [args]")?;
    writeln!(out)?;
    writeln!(out, "commands:")?;
    writeln!(out, "  list                     list marketplaces")?;
    writeln!(out, "  add <name> <url>         add or update a marketplace")?;
    writeln!(out, "  remove <name>            remove a marketplace")
}

#[cfg(test)]
mod tests;
