//! Command handlers.
//!
//! Each handler returns the status the process should exit with. Errors are
//! rendered by the caller.

mod external;
mod init;
mod marketplace;
mod plugin;

use std::{env, io};

use sky_config::Config;
use sky_plugins::{CancelToken, CatalogStore, HostContext, PluginRunner, find_workspace_root};

use crate::cli::{CliCommand, PluginCommand};
use crate::errors::AppError;

use self::external::run_external;

/// State shared by every command in one invocation.
pub(crate) struct Session {
    store: CatalogStore,
    cancel: CancelToken,
    context: HostContext,
}

impl Session {
    pub(crate) fn new(config: &Config, cancel: CancelToken) -> Self {
        let mut context = HostContext::new()
            .with_config_dir(config.config_dir())
            .with_passthrough_from(|key| env::var(key).ok());
        if let Some(root) = find_workspace_root() {
            context = context.with_workspace_root(root);
        }
        Self {
            store: CatalogStore::new(config.config_dir()),
            cancel,
            context,
        }
    }

    #[cfg(test)]
    pub(crate) fn with_context(store: CatalogStore, context: HostContext) -> Self {
        Self {
            store,
            cancel: CancelToken::new(),
            context,
        }
    }

    pub(crate) const fn store(&self) -> &CatalogStore {
        &self.store
    }

    pub(crate) const fn cancel(&self) -> &CancelToken {
        &self.cancel
    }

    pub(crate) fn runner(&self) -> PluginRunner {
        PluginRunner::new(self.context.clone())
    }
}

/// Output streams handed to command handlers.
pub(crate) struct Output<'a> {
    pub(crate) stdout: &'a mut dyn io::Write,
    pub(crate) stderr: &'a mut dyn io::Write,
}

/// Runs a parsed top-level command.
pub(crate) fn dispatch(
    command: CliCommand,
    session: &Session,
    out: &mut Output<'_>,
) -> Result<i32, AppError> {
    match command {
        CliCommand::Version => {
            writeln!(out.stdout, "sky {}", env!("CARGO_PKG_VERSION"))?;
            Ok(0)
        }
        CliCommand::Plugin { action: None } => {
            crate::write_plugin_usage(out.stderr)?;
            Ok(0)
        }
        CliCommand::Plugin {
            action: Some(action),
        } => dispatch_plugin(action, session, out),
        CliCommand::External(args) => run_external(&args, session, out),
    }
}

fn dispatch_plugin(
    action: PluginCommand,
    session: &Session,
    out: &mut Output<'_>,
) -> Result<i32, AppError> {
    match action {
        PluginCommand::Init(args) => {
            let cwd = env::current_dir().map_err(AppError::CurrentDir)?;
            init::run(&args, &cwd, out)
        }
        PluginCommand::List => plugin::list(session, out),
        PluginCommand::Install(args) => plugin::install(&args, session, out),
        PluginCommand::Inspect { name } => plugin::inspect(&name, session, out),
        PluginCommand::Remove { name } => plugin::remove(&name, session, out),
        PluginCommand::Search { query, marketplace } => {
            plugin::search(&query, marketplace.as_deref(), session, out)
        }
        PluginCommand::Marketplace { action: None } => {
            crate::write_marketplace_usage(out.stderr)?;
            Ok(0)
        }
        PluginCommand::Marketplace {
            action: Some(action),
        } => marketplace::run(action, session, out),
    }
}

#[cfg(test)]
mod tests;
