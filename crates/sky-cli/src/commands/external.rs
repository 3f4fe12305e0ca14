//! Plugin-first dispatch for commands `clap` does not know.
//!
//! A core tool alias runs its executable when one can be found next to the
//! `sky` binary or on `PATH`. Everything else, including a core alias whose
//! executable is missing, is looked up in the plugin catalog.

use std::env;
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use std::process::Command;

use sky_plugins::names::is_valid_name;
use sky_plugins::status_code;
use tracing::debug;

use super::{Output, Session};
use crate::errors::AppError;
use crate::suggest::{CoreTool, core_tool};

/// Tracing target for command dispatch.
const DISPATCH_TARGET: &str = "sky_cli::dispatch";

pub(super) fn run_external(
    args: &[OsString],
    session: &Session,
    out: &mut Output<'_>,
) -> Result<i32, AppError> {
    let Some((command, rest)) = args.split_first() else {
        return Err(AppError::Usage(String::from("a command is required")));
    };
    let command = command.to_string_lossy();

    if let Some(tool) = core_tool(&command)
        && let Some(binary) = find_core_binary(tool.binary)
    {
        out.stdout.flush()?;
        return run_core_tool(tool, &binary, rest);
    }

    if !is_valid_name(&command) {
        return Err(AppError::UnknownCommand(command.into_owned()));
    }
    let Some(plugin) = session.store().find_plugin(&command)? else {
        return Err(AppError::UnknownCommand(command.into_owned()));
    };

    let plugin_args: Vec<String> = rest
        .iter()
        .map(|arg| arg.to_string_lossy().into_owned())
        .collect();
    debug!(
        target: DISPATCH_TARGET,
        plugin = plugin.name(),
        args = plugin_args.len(),
        "dispatching to plugin"
    );
    out.stdout.flush()?;
    Ok(session.runner().run(&plugin, &plugin_args, session.cancel())?)
}

fn run_core_tool(tool: &CoreTool, binary: &Path, args: &[OsString]) -> Result<i32, AppError> {
    debug!(
        target: DISPATCH_TARGET,
        tool = tool.name,
        binary = %binary.display(),
        "running core tool"
    );
    let status = Command::new(binary)
        .args(args)
        .status()
        .map_err(|source| AppError::CoreTool {
            tool: tool.binary.to_owned(),
            source,
        })?;
    Ok(status_code(status))
}

/// Finds `binary` next to the running executable, then on `PATH`.
fn find_core_binary(binary: &str) -> Option<PathBuf> {
    let exe_dir = env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf));
    find_core_binary_in(binary, exe_dir.as_deref(), env::var_os("PATH").as_deref())
}

pub(super) fn find_core_binary_in(
    binary: &str,
    exe_dir: Option<&Path>,
    search_path: Option<&OsStr>,
) -> Option<PathBuf> {
    let file_name = format!("{binary}{}", env::consts::EXE_SUFFIX);
    exe_dir
        .into_iter()
        .map(Path::to_path_buf)
        .chain(search_path.into_iter().flat_map(env::split_paths))
        .filter(|dir| !dir.as_os_str().is_empty())
        .map(|dir| dir.join(&file_name))
        .find(|candidate| candidate.is_file())
}
