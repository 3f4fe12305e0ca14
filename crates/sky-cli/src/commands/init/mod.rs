//! `sky plugin init`: scaffolds a Rust plugin project.

mod templates;

use std::fs;
use std::path::Path;

use sky_plugins::validate_name;
use tracing::{debug, warn};

use super::Output;
use crate::cli::InitArgs;
use crate::errors::AppError;

/// Tracing target for project scaffolding.
const INIT_TARGET: &str = "sky_cli::init";

/// Creates the project directory `<parent>/<name>` and prints next steps.
pub(super) fn run(args: &InitArgs, parent: &Path, out: &mut Output<'_>) -> Result<i32, AppError> {
    validate_name(&args.name).map_err(AppError::InitName)?;

    let project = parent.join(&args.name);
    if fs::symlink_metadata(&project).is_ok() {
        return Err(AppError::DirectoryExists(project));
    }
    fs::create_dir_all(&project).map_err(|source| AppError::CreateDirectory {
        path: project.clone(),
        source,
    })?;

    if let Err(err) = write_project(&project, &args.name, args.wasm) {
        if let Err(cleanup) = fs::remove_dir_all(&project) {
            warn!(
                target: INIT_TARGET,
                path = %project.display(),
                error = %cleanup,
                "failed to remove partial plugin project"
            );
        }
        return Err(AppError::Scaffold(err));
    }

    writeln!(out.stdout, "Created plugin {:?}", args.name)?;
    writeln!(out.stdout)?;
    writeln!(out.stdout, "Next steps:")?;
    for step in templates::next_steps(&args.name, args.wasm) {
        writeln!(out.stdout, "  {step}")?;
    }
    Ok(0)
}

fn write_project(project: &Path, name: &str, wasm: bool) -> std::io::Result<()> {
    for file in templates::render(name, wasm) {
        let path = project.join(file.path);
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        fs::write(&path, file.contents)?;
        debug!(target: INIT_TARGET, path = %path.display(), "wrote template file");
    }
    Ok(())
}
