//! `sky plugin` list, install, inspect, remove, and search.

use sky_plugins::{Installer, MarketplaceResolver, Plugin, PluginError, PluginType, UrlInstall};
use tracing::debug;

use super::{Output, Session};
use crate::cli::InstallArgs;
use crate::errors::AppError;
use crate::table::Table;

/// Tracing target for plugin management commands.
const COMMAND_TARGET: &str = "sky_cli::commands";

pub(super) fn list(session: &Session, out: &mut Output<'_>) -> Result<i32, AppError> {
    let plugins = session.store().load_plugins()?;
    if plugins.is_empty() {
        writeln!(out.stdout, "no plugins installed")?;
        return Ok(0);
    }

    let mut table = Table::new(["NAME", "TYPE", "VERSION", "SOURCE", "DESCRIPTION"]);
    for plugin in &plugins {
        table.row([
            plugin.name(),
            plugin.declared_type(),
            plugin.version().unwrap_or_default(),
            plugin.source().unwrap_or_default(),
            plugin.description().unwrap_or_default(),
        ]);
    }
    table.write_to(out.stdout)?;
    Ok(0)
}

pub(super) fn install(
    args: &InstallArgs,
    session: &Session,
    out: &mut Output<'_>,
) -> Result<i32, AppError> {
    let installer = Installer::new(session.store().clone());
    let plugin = if let Some(path) = &args.path {
        let plugin_type = PluginType::resolve(args.plugin_type, &path.to_string_lossy());
        installer.install_from_path(&args.name, path, args.version.as_deref(), plugin_type)?
    } else if let Some(url) = &args.url {
        installer.install_from_url(&url_request(args, url), session.cancel())?
    } else {
        debug!(
            target: COMMAND_TARGET,
            plugin = args.name.as_str(),
            marketplace = args.marketplace.as_deref(),
            "installing from marketplaces"
        );
        installer.install_from_marketplace(
            &args.name,
            args.marketplace.as_deref(),
            session.cancel(),
        )?
    };
    writeln!(out.stdout, "installed {}", describe(&plugin))?;
    Ok(0)
}

fn url_request(args: &InstallArgs, url: &str) -> UrlInstall {
    let mut request = UrlInstall::new(args.name.as_str(), url)
        .with_type(PluginType::resolve(args.plugin_type, url));
    if let Some(sha256) = &args.sha256 {
        request = request.with_sha256(sha256.as_str());
    }
    if let Some(version) = &args.version {
        request = request.with_version(version.as_str());
    }
    request
}

fn describe(plugin: &Plugin) -> String {
    match plugin.version() {
        Some(version) => format!("{} ({version})", plugin.name()),
        None => plugin.name().to_owned(),
    }
}

pub(super) fn remove(name: &str, session: &Session, out: &mut Output<'_>) -> Result<i32, AppError> {
    let removed = session.store().remove_plugin(name)?;
    writeln!(out.stdout, "removed {}", removed.name())?;
    Ok(0)
}

/// Queries the plugin's metadata, records its version and summary, and
/// prints the document.
pub(super) fn inspect(name: &str, session: &Session, out: &mut Output<'_>) -> Result<i32, AppError> {
    let mut plugin = session
        .store()
        .find_plugin(name)?
        .ok_or_else(|| PluginError::NotFound {
            name: name.to_owned(),
        })?;
    let metadata = session.runner().metadata(&plugin, session.cancel())?;
    plugin.apply_metadata(&metadata);
    session.store().upsert_plugin(&plugin)?;

    let document = serde_json::to_string_pretty(&metadata).map_err(AppError::EncodeMetadata)?;
    writeln!(out.stdout, "{document}")?;
    Ok(0)
}

pub(super) fn search(
    query: &str,
    marketplace: Option<&str>,
    session: &Session,
    out: &mut Output<'_>,
) -> Result<i32, AppError> {
    let resolver = MarketplaceResolver::new(session.store().clone());
    let results = resolver.search_marketplaces(query, marketplace, session.cancel())?;

    let mut table = Table::new(["NAME", "VERSION", "MARKETPLACE", "DESCRIPTION", "URL"]);
    for result in &results {
        let entry = result.entry();
        table.row([
            entry.name(),
            entry.version().unwrap_or_default(),
            result.marketplace().name(),
            entry.description().unwrap_or_default(),
            entry.url(),
        ]);
    }
    table.write_to(out.stdout)?;
    Ok(0)
}
