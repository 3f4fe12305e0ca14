//! The catalog store.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::PluginError;
use crate::names::validate_name;
use crate::protocol::PluginType;

use super::lock::CatalogLock;
use super::persist::{read_collection, write_collection};
use super::{Marketplace, Plugin};

/// Tracing target for catalog operations.
pub(crate) const CATALOG_TARGET: &str = "sky_plugins::catalog";

const PLUGINS_DIR: &str = "plugins";
const PLUGINS_FILE: &str = "plugins.json";
const MARKETPLACES_FILE: &str = "marketplaces.json";
const LOCK_FILE: &str = "lock";

/// Owns the plugin and marketplace collections rooted at one directory.
///
/// The root is injected by the caller; nothing here reads the process
/// environment.
///
/// ```
/// use sky_plugins::{CatalogStore, Plugin, PluginType};
///
/// # fn main() -> Result<(), sky_plugins::PluginError> {
/// let dir = tempfile::tempdir().expect("tempdir");
/// let store = CatalogStore::new(dir.path());
/// store.upsert_plugin(&Plugin::new("hello", PluginType::Native))?;
/// let found = store.find_plugin("hello")?.expect("installed");
/// assert_eq!(found.path(), Some(store.plugin_path("hello", PluginType::Native).as_path()));
/// # Ok(()) }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogStore {
    root: PathBuf,
}

impl CatalogStore {
    /// Creates a store rooted at `root`. No I/O happens until first use.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Catalog root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding plugin binaries and modules.
    #[must_use]
    pub fn plugins_dir(&self) -> PathBuf {
        self.root.join(PLUGINS_DIR)
    }

    /// Location of `plugins.json`.
    #[must_use]
    pub fn plugins_file(&self) -> PathBuf {
        self.root.join(PLUGINS_FILE)
    }

    /// Location of `marketplaces.json`.
    #[must_use]
    pub fn marketplaces_file(&self) -> PathBuf {
        self.root.join(MARKETPLACES_FILE)
    }

    /// Location of the lock sentinel.
    #[must_use]
    pub fn lock_file(&self) -> PathBuf {
        self.root.join(LOCK_FILE)
    }

    /// Catalog-computed location of a plugin binary.
    #[must_use]
    pub fn plugin_path(&self, name: &str, plugin_type: PluginType) -> PathBuf {
        self.plugins_dir().join(plugin_type.file_name(name))
    }

    /// Creates the root and plugins directories.
    ///
    /// # Errors
    ///
    /// Returns [`PluginError::Io`] when a directory cannot be created.
    pub fn ensure(&self) -> Result<(), PluginError> {
        create_dir(&self.root)?;
        create_dir(&self.plugins_dir())
    }

    /// Loads installed plugins sorted by name.
    ///
    /// # Errors
    ///
    /// Returns [`PluginError::Io`] when the file exists but cannot be read.
    pub fn load_plugins(&self) -> Result<Vec<Plugin>, PluginError> {
        let mut plugins: Vec<Plugin> = read_collection(&self.plugins_file())?;
        for plugin in &mut plugins {
            plugin.normalise(self);
        }
        plugins.sort_by(|left, right| left.name.cmp(&right.name));
        Ok(plugins)
    }

    /// Inserts or replaces the record with the same name.
    ///
    /// # Errors
    ///
    /// Returns [`PluginError::InvalidName`] before any I/O when the name is
    /// invalid, [`PluginError::Lock`] when the lock cannot be acquired, or an
    /// I/O error when the catalog cannot be written.
    pub fn upsert_plugin(&self, plugin: &Plugin) -> Result<(), PluginError> {
        validate_name(plugin.name())?;
        self.with_lock(|| {
            let mut plugins = self.load_plugins()?;
            replace_or_push(&mut plugins, plugin.clone(), |existing| {
                existing.name == plugin.name
            });
            write_collection(&self.plugins_file(), &plugins)?;
            debug!(target: CATALOG_TARGET, plugin = plugin.name(), "plugin record saved");
            Ok(())
        })
    }

    /// Looks up an installed plugin.
    ///
    /// The returned record always carries a path.
    ///
    /// # Errors
    ///
    /// Returns [`PluginError::InvalidName`] for an invalid name or an I/O
    /// error when the catalog cannot be read.
    pub fn find_plugin(&self, name: &str) -> Result<Option<Plugin>, PluginError> {
        validate_name(name)?;
        Ok(self
            .load_plugins()?
            .into_iter()
            .find(|plugin| plugin.name == name))
    }

    /// Removes a plugin record and deletes its binary.
    ///
    /// A binary that is already gone is not an error.
    ///
    /// # Errors
    ///
    /// Returns [`PluginError::NotFound`] when no such plugin is installed,
    /// [`PluginError::Lock`] when the lock cannot be acquired, or an I/O error.
    pub fn remove_plugin(&self, name: &str) -> Result<Plugin, PluginError> {
        validate_name(name)?;
        self.with_lock(|| {
            let mut plugins = self.load_plugins()?;
            let removed = take_by(&mut plugins, |plugin| plugin.name == name).ok_or_else(|| {
                PluginError::NotFound {
                    name: name.to_owned(),
                }
            })?;
            write_collection(&self.plugins_file(), &plugins)?;

            let binary = self.plugin_path(name, removed.layout_type());
            match fs::remove_file(&binary) {
                Ok(()) => {}
                Err(err) if err.kind() == io::ErrorKind::NotFound => {}
                Err(err) => return Err(PluginError::io("remove plugin binary", binary, err)),
            }
            info!(target: CATALOG_TARGET, plugin = name, "plugin removed");
            Ok(removed)
        })
    }

    /// Loads configured marketplaces sorted by name.
    ///
    /// # Errors
    ///
    /// Returns [`PluginError::Io`] when the file exists but cannot be read.
    pub fn load_marketplaces(&self) -> Result<Vec<Marketplace>, PluginError> {
        let mut marketplaces: Vec<Marketplace> = read_collection(&self.marketplaces_file())?;
        marketplaces.sort_by(|left, right| left.name.cmp(&right.name));
        Ok(marketplaces)
    }

    /// Inserts or replaces the marketplace with the same name.
    ///
    /// # Errors
    ///
    /// Returns [`PluginError::InvalidName`] or
    /// [`PluginError::MarketplaceUrlRequired`] before any I/O, otherwise lock
    /// or I/O errors.
    pub fn upsert_marketplace(&self, marketplace: &Marketplace) -> Result<(), PluginError> {
        validate_name(marketplace.name())?;
        if marketplace.url().trim().is_empty() {
            return Err(PluginError::MarketplaceUrlRequired);
        }
        self.with_lock(|| {
            let mut marketplaces = self.load_marketplaces()?;
            replace_or_push(&mut marketplaces, marketplace.clone(), |existing| {
                existing.name == marketplace.name
            });
            write_collection(&self.marketplaces_file(), &marketplaces)?;
            debug!(
                target: CATALOG_TARGET,
                marketplace = marketplace.name(),
                url = marketplace.url(),
                "marketplace saved"
            );
            Ok(())
        })
    }

    /// Removes a configured marketplace.
    ///
    /// # Errors
    ///
    /// Returns [`PluginError::MarketplaceNotFound`] when the marketplace is
    /// not configured, otherwise lock or I/O errors.
    pub fn remove_marketplace(&self, name: &str) -> Result<Marketplace, PluginError> {
        validate_name(name)?;
        self.with_lock(|| {
            let mut marketplaces = self.load_marketplaces()?;
            let removed = take_by(&mut marketplaces, |marketplace| marketplace.name == name)
                .ok_or_else(|| PluginError::MarketplaceNotFound {
                    name: name.to_owned(),
                })?;
            write_collection(&self.marketplaces_file(), &marketplaces)?;
            Ok(removed)
        })
    }

    /// Runs `operation` while holding the catalog lock.
    fn with_lock<T>(
        &self,
        operation: impl FnOnce() -> Result<T, PluginError>,
    ) -> Result<T, PluginError> {
        self.ensure()?;
        let _lock = CatalogLock::acquire(&self.lock_file())?;
        operation()
    }
}

fn create_dir(path: &Path) -> Result<(), PluginError> {
    let mut builder = fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(0o755);
    }
    builder
        .create(path)
        .map_err(|err| PluginError::io("create directory", path, err))
}

fn replace_or_push<T>(items: &mut Vec<T>, item: T, matches: impl Fn(&T) -> bool) {
    if let Some(slot) = items.iter_mut().find(|existing| matches(existing)) {
        *slot = item;
    } else {
        items.push(item);
    }
}

fn take_by<T>(items: &mut Vec<T>, matches: impl Fn(&T) -> bool) -> Option<T> {
    let position = items.iter().position(matches)?;
    Some(items.remove(position))
}
