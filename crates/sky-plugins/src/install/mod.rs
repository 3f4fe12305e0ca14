//! Plugin installation from local paths, URLs, and marketplaces.
//!
//! Every install stages the binary in a temporary file inside the plugins
//! directory, marks it executable, and renames it into place. The rename
//! never crosses a filesystem, so a concurrent runner sees either the old
//! binary or the complete new one.

use std::fs::{self, File};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use tempfile::{Builder, NamedTempFile};
use time::OffsetDateTime;
use tracing::{debug, info};

use crate::cancel::CancelToken;
use crate::catalog::{CatalogStore, Plugin};
use crate::error::PluginError;
use crate::marketplace::{IndexSource, MarketplaceResolver, TransportIndexSource};
use crate::names::validate_name;
use crate::protocol::PluginType;
use crate::transport::{self, DOWNLOAD_TIMEOUT};

/// Tracing target for install operations.
const INSTALL_TARGET: &str = "sky_plugins::install";

/// Bytes read per download chunk. Cancellation is checked between chunks.
const CHUNK_SIZE: usize = 64 * 1024;

/// Parameters for [`Installer::install_from_url`].
///
/// ```
/// use sky_plugins::{PluginType, UrlInstall};
///
/// let request = UrlInstall::new("lint-extra", "https://example.com/lint-extra.wasm")
///     .with_sha256("ab12")
///     .with_version("1.0.0");
/// assert_eq!(request.plugin_type(), PluginType::Sandboxed);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlInstall {
    name: String,
    url: String,
    sha256: Option<String>,
    version: Option<String>,
    description: Option<String>,
    plugin_type: PluginType,
}

impl UrlInstall {
    /// Describes an install of `name` from `url`, with the type detected from
    /// the URL.
    #[must_use]
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        let url = url.into();
        let plugin_type = PluginType::detect(&url);
        Self {
            name: name.into(),
            url,
            sha256: None,
            version: None,
            description: None,
            plugin_type,
        }
    }

    /// Sets the expected SHA-256 digest. An empty digest disables the check.
    #[must_use]
    pub fn with_sha256(mut self, sha256: impl Into<String>) -> Self {
        let digest = sha256.into();
        self.sha256 = (!digest.is_empty()).then_some(digest);
        self
    }

    /// Sets the recorded version.
    #[must_use]
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Sets the recorded description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Overrides the detected plugin type.
    #[must_use]
    pub const fn with_type(mut self, plugin_type: PluginType) -> Self {
        self.plugin_type = plugin_type;
        self
    }

    /// Plugin name.
    #[must_use]
    pub const fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Source location.
    #[must_use]
    pub const fn url(&self) -> &str {
        self.url.as_str()
    }

    /// Expected digest, if any.
    #[must_use]
    pub fn sha256(&self) -> Option<&str> {
        self.sha256.as_deref()
    }

    /// Plugin type the binary is installed as.
    #[must_use]
    pub const fn plugin_type(&self) -> PluginType {
        self.plugin_type
    }
}

/// Installs plugins into a catalog.
#[derive(Debug, Clone)]
pub struct Installer<S = TransportIndexSource> {
    store: CatalogStore,
    resolver: MarketplaceResolver<S>,
}

impl Installer {
    /// Creates an installer that resolves marketplace plugins over the
    /// network or from disk.
    #[must_use]
    pub fn new(store: CatalogStore) -> Self {
        let resolver = MarketplaceResolver::new(store.clone());
        Self { store, resolver }
    }
}

impl<S: IndexSource> Installer<S> {
    /// Creates an installer backed by a custom marketplace resolver.
    #[must_use]
    pub const fn with_resolver(store: CatalogStore, resolver: MarketplaceResolver<S>) -> Self {
        Self { store, resolver }
    }

    /// Copies a local binary into the catalog.
    ///
    /// # Errors
    ///
    /// Returns [`PluginError::InvalidName`] or [`PluginError::InvalidSource`]
    /// before any write, and I/O or lock errors while publishing.
    pub fn install_from_path(
        &self,
        name: &str,
        path: &Path,
        version: Option<&str>,
        plugin_type: PluginType,
    ) -> Result<Plugin, PluginError> {
        validate_name(name)?;
        if path.as_os_str().is_empty() {
            return Err(PluginError::InvalidSource {
                message: String::from("install path is required"),
            });
        }
        let info = fs::metadata(path).map_err(|err| PluginError::io("stat plugin", path, err))?;
        if info.is_dir() {
            return Err(PluginError::InvalidSource {
                message: format!("plugin path {:?} is a directory", path.display().to_string()),
            });
        }

        self.store.ensure()?;
        let mut source = File::open(path).map_err(|err| PluginError::io("open", path, err))?;
        let mut staged = self.stage(name)?;
        io::copy(&mut source, &mut staged)
            .map_err(|err| PluginError::io("copy plugin from", path, err))?;
        let dest = self.publish(staged, name, plugin_type)?;

        let mut plugin = Plugin::new(name, plugin_type)
            .with_source(path.display().to_string())
            .with_installed_at(OffsetDateTime::now_utc())
            .with_path(dest);
        if let Some(value) = version {
            plugin = plugin.with_version(value);
        }
        self.store.upsert_plugin(&plugin)?;
        info!(target: INSTALL_TARGET, plugin = name, source = %path.display(), "plugin installed");
        Ok(plugin)
    }

    /// Downloads a binary, verifying its digest when one is supplied.
    ///
    /// # Errors
    ///
    /// Returns [`PluginError::Download`] on transport failure,
    /// [`PluginError::ChecksumMismatch`] when the digest differs, and
    /// [`PluginError::Cancelled`] when cancellation interrupts the stream.
    /// Nothing is published on any of these paths.
    pub fn install_from_url(
        &self,
        request: &UrlInstall,
        cancel: &CancelToken,
    ) -> Result<Plugin, PluginError> {
        validate_name(request.name())?;
        if request.url().trim().is_empty() {
            return Err(PluginError::InvalidSource {
                message: String::from("install url is required"),
            });
        }
        cancel.check()?;
        self.store.ensure()?;

        let download_error = |message: String| PluginError::Download {
            url: request.url().to_owned(),
            message,
        };
        let mut reader = transport::open(request.url(), DOWNLOAD_TIMEOUT, cancel)
            .map_err(|err| err.into_plugin_error(download_error))?;
        let mut staged = self.stage(request.name())?;
        let staged_path = staged.path().to_path_buf();
        let actual = copy_hashed(&mut reader, &mut staged, &staged_path, cancel, download_error)?;

        if let Some(expected) = request.sha256()
            && !expected.eq_ignore_ascii_case(&actual)
        {
            return Err(PluginError::ChecksumMismatch {
                expected: expected.to_owned(),
                actual,
            });
        }
        let dest = self.publish(staged, request.name(), request.plugin_type())?;

        let mut plugin = Plugin::new(request.name(), request.plugin_type())
            .with_source(request.url())
            .with_installed_at(OffsetDateTime::now_utc())
            .with_path(dest);
        if let Some(version) = &request.version {
            plugin = plugin.with_version(version.as_str());
        }
        if let Some(description) = &request.description {
            plugin = plugin.with_description(description.as_str());
        }
        self.store.upsert_plugin(&plugin)?;
        info!(
            target: INSTALL_TARGET,
            plugin = request.name(),
            url = request.url(),
            sha256 = %actual,
            "plugin installed"
        );
        Ok(plugin)
    }

    /// Resolves `name` in the configured marketplaces and installs it.
    ///
    /// The recorded source becomes `"<marketplace> (<url>)"`.
    ///
    /// # Errors
    ///
    /// Propagates resolution errors from [`MarketplaceResolver`], returns
    /// [`PluginError::UnknownPluginType`] for an entry whose type no backend
    /// handles, and propagates install errors from
    /// [`Installer::install_from_url`].
    pub fn install_from_marketplace(
        &self,
        name: &str,
        marketplace: Option<&str>,
        cancel: &CancelToken,
    ) -> Result<Plugin, PluginError> {
        let (origin, entry) = self
            .resolver
            .resolve_marketplace_plugin(name, marketplace, cancel)?;

        let mut request = UrlInstall::new(name, entry.url()).with_type(entry.effective_type()?);
        if let Some(sha256) = entry.sha256() {
            request = request.with_sha256(sha256);
        }
        if let Some(version) = entry.version() {
            request = request.with_version(version);
        }
        if let Some(description) = entry.description() {
            request = request.with_description(description);
        }

        let plugin = self
            .install_from_url(&request, cancel)?
            .with_source(format!("{} ({})", origin.name(), entry.url()));
        self.store.upsert_plugin(&plugin)?;
        Ok(plugin)
    }

    /// Creates a temporary file for `name` inside the plugins directory.
    fn stage(&self, name: &str) -> Result<NamedTempFile, PluginError> {
        let dir = self.store.plugins_dir();
        Builder::new()
            .prefix(&format!(".{name}-tmp-"))
            .tempfile_in(&dir)
            .map_err(|err| PluginError::io("create temporary file in", dir, err))
    }

    /// Marks a staged file executable, flushes it, and renames it into place.
    fn publish(
        &self,
        mut staged: NamedTempFile,
        name: &str,
        plugin_type: PluginType,
    ) -> Result<PathBuf, PluginError> {
        staged
            .flush()
            .and_then(|()| staged.as_file().sync_all())
            .map_err(|err| PluginError::io("write", staged.path().to_path_buf(), err))?;
        make_executable(staged.path())?;

        let dest = self.store.plugin_path(name, plugin_type);
        staged
            .persist(&dest)
            .map_err(|err| PluginError::io("install plugin to", &dest, err.error))?;
        debug!(target: INSTALL_TARGET, plugin = name, path = %dest.display(), "binary published");
        Ok(dest)
    }
}

/// Streams `reader` into `writer`, the staged file at `staged`, and returns
/// the lowercase hex SHA-256 of the bytes copied.
///
/// A read failure observed after cancellation is reported as
/// [`PluginError::Cancelled`].
fn copy_hashed(
    reader: &mut dyn Read,
    writer: &mut impl Write,
    staged: &Path,
    cancel: &CancelToken,
    read_error: impl Fn(String) -> PluginError,
) -> Result<String, PluginError> {
    let mut hasher = Sha256::new();
    let mut buffer = vec![0_u8; CHUNK_SIZE];
    loop {
        cancel.check()?;
        let read = match reader.read(&mut buffer) {
            Ok(0) => break,
            Ok(read) => read,
            Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
            Err(err) => {
                cancel.check()?;
                return Err(read_error(err.to_string()));
            }
        };
        let chunk = buffer.get(..read).unwrap_or_default();
        hasher.update(chunk);
        writer
            .write_all(chunk)
            .map_err(|err| PluginError::io("write", staged, err))?;
    }
    Ok(hex::encode(hasher.finalize()))
}

#[cfg(unix)]
fn make_executable(path: &Path) -> Result<(), PluginError> {
    use std::os::unix::fs::PermissionsExt;

    fs::set_permissions(path, fs::Permissions::from_mode(0o755))
        .map_err(|err| PluginError::io("set permissions on", path, err))
}

#[cfg(not(unix))]
fn make_executable(_path: &Path) -> Result<(), PluginError> {
    Ok(())
}
