//! Marketplace index fetching, search, and resolution.
//!
//! A marketplace is a JSON index listing downloadable plugins. Indexes are
//! fetched fresh for every operation and never cached. Configured
//! marketplaces are visited in name order.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use tracing::debug;

use crate::cancel::CancelToken;
use crate::catalog::{CatalogStore, Marketplace};
use crate::error::PluginError;
use crate::names::validate_name;
use crate::protocol::PluginType;
use crate::transport::{self, INDEX_TIMEOUT};

/// Tracing target for marketplace operations.
const MARKETPLACE_TARGET: &str = "sky_plugins::marketplace";

/// Index document published by a marketplace.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketplaceIndex {
    #[serde(default)]
    name: String,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "time::serde::rfc3339::option"
    )]
    updated_at: Option<OffsetDateTime>,
    #[serde(default)]
    plugins: Vec<MarketplaceEntry>,
}

impl MarketplaceIndex {
    /// Creates an index listing `plugins`.
    #[must_use]
    pub fn new(name: impl Into<String>, plugins: Vec<MarketplaceEntry>) -> Self {
        Self {
            name: name.into(),
            updated_at: None,
            plugins,
        }
    }

    /// Name the marketplace gives itself.
    #[must_use]
    pub const fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Last update time, if published.
    #[must_use]
    pub const fn updated_at(&self) -> Option<OffsetDateTime> {
        self.updated_at
    }

    /// Listed plugins.
    #[must_use]
    pub fn plugins(&self) -> &[MarketplaceEntry] {
        &self.plugins
    }
}

/// A plugin listed in a marketplace index.
///
/// The `type` field is kept verbatim so one entry this host cannot run does
/// not make the rest of the index unreadable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketplaceEntry {
    name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    sha256: Option<String>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    plugin_type: Option<String>,
}

impl MarketplaceEntry {
    /// Creates an entry downloadable from `url`.
    #[must_use]
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: None,
            description: None,
            url: url.into(),
            sha256: None,
            plugin_type: None,
        }
    }

    /// Sets the version.
    #[must_use]
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the expected SHA-256 digest.
    #[must_use]
    pub fn with_sha256(mut self, sha256: impl Into<String>) -> Self {
        self.sha256 = Some(sha256.into());
        self
    }

    /// Sets the plugin type.
    #[must_use]
    pub fn with_type(mut self, plugin_type: PluginType) -> Self {
        self.plugin_type = Some(plugin_type.as_str().to_owned());
        self
    }

    /// Plugin name.
    #[must_use]
    pub const fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Version, if listed.
    #[must_use]
    pub fn version(&self) -> Option<&str> {
        self.version.as_deref().filter(|value| !value.is_empty())
    }

    /// Description, if listed.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref().filter(|value| !value.is_empty())
    }

    /// Download location.
    #[must_use]
    pub const fn url(&self) -> &str {
        self.url.as_str()
    }

    /// Expected SHA-256 digest, if listed.
    #[must_use]
    pub fn sha256(&self) -> Option<&str> {
        self.sha256.as_deref().filter(|value| !value.is_empty())
    }

    /// The `type` value as listed, if any.
    #[must_use]
    pub fn declared_type(&self) -> Option<&str> {
        self.plugin_type.as_deref().filter(|value| !value.is_empty())
    }

    /// Plugin type, defaulting to [`PluginType::Native`] when unlisted.
    ///
    /// # Errors
    ///
    /// Returns [`PluginError::UnknownPluginType`] when no backend handles the
    /// listed type.
    pub fn effective_type(&self) -> Result<PluginType, PluginError> {
        PluginType::from_declared(self.declared_type())
    }

    fn matches(&self, query: &str) -> bool {
        query.is_empty()
            || self.name.to_lowercase().contains(query)
            || self
                .description()
                .is_some_and(|description| description.to_lowercase().contains(query))
    }
}

/// A marketplace entry paired with the marketplace that listed it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResult {
    marketplace: Marketplace,
    entry: MarketplaceEntry,
}

impl SearchResult {
    /// Marketplace the entry came from.
    #[must_use]
    pub const fn marketplace(&self) -> &Marketplace {
        &self.marketplace
    }

    /// Matching entry.
    #[must_use]
    pub const fn entry(&self) -> &MarketplaceEntry {
        &self.entry
    }
}

/// Fetches marketplace indexes.
///
/// The production implementation is [`TransportIndexSource`]. Tests can
/// implement this trait to serve canned indexes.
pub trait IndexSource {
    /// Fetches and decodes the index for `marketplace`.
    ///
    /// # Errors
    ///
    /// Returns [`PluginError::Marketplace`] on transport or decode failure and
    /// [`PluginError::Cancelled`] when cancellation was requested.
    fn fetch(
        &self,
        marketplace: &Marketplace,
        cancel: &CancelToken,
    ) -> Result<MarketplaceIndex, PluginError>;
}

/// Fetches indexes over HTTP(S) or from local files.
#[derive(Debug, Clone, Copy, Default)]
pub struct TransportIndexSource;

impl IndexSource for TransportIndexSource {
    fn fetch(
        &self,
        marketplace: &Marketplace,
        cancel: &CancelToken,
    ) -> Result<MarketplaceIndex, PluginError> {
        cancel.check()?;
        let failure = |message: String| PluginError::Marketplace {
            name: marketplace.name().to_owned(),
            message,
        };
        let reader = transport::open(marketplace.url(), INDEX_TIMEOUT, cancel)
            .map_err(|err| err.into_plugin_error(failure))?;
        let decoded: Result<MarketplaceIndex, _> = serde_json::from_reader(reader);
        cancel.check()?;
        let index = decoded.map_err(|err| failure(err.to_string()))?;
        debug!(
            target: MARKETPLACE_TARGET,
            marketplace = marketplace.name(),
            plugins = index.plugins().len(),
            "fetched marketplace index"
        );
        Ok(index)
    }
}

/// Searches configured marketplaces and resolves plugins by name.
#[derive(Debug, Clone)]
pub struct MarketplaceResolver<S = TransportIndexSource> {
    store: CatalogStore,
    source: S,
}

impl MarketplaceResolver {
    /// Creates a resolver that fetches indexes over the network or from disk.
    #[must_use]
    pub const fn new(store: CatalogStore) -> Self {
        Self {
            store,
            source: TransportIndexSource,
        }
    }
}

impl<S: IndexSource> MarketplaceResolver<S> {
    /// Creates a resolver with a custom index source.
    #[must_use]
    pub const fn with_source(store: CatalogStore, source: S) -> Self {
        Self { store, source }
    }

    /// Lists entries whose name or description contains `query`,
    /// case-insensitively. An empty query matches everything.
    ///
    /// # Errors
    ///
    /// Returns [`PluginError::NoMarketplaces`],
    /// [`PluginError::MarketplaceNotFound`],
    /// [`PluginError::NoMatchesInMarketplace`], or
    /// [`PluginError::NoMatches`] for the respective empty outcomes, and
    /// propagates fetch failures immediately.
    pub fn search_marketplaces(
        &self,
        query: &str,
        marketplace: Option<&str>,
        cancel: &CancelToken,
    ) -> Result<Vec<SearchResult>, PluginError> {
        let needle = query.to_lowercase();
        let candidates = self.candidates(marketplace)?;

        let mut results = Vec::new();
        for candidate in candidates {
            let index = self.source.fetch(&candidate, cancel)?;
            results.extend(
                index
                    .plugins
                    .into_iter()
                    .filter(|entry| entry.matches(&needle))
                    .map(|entry| SearchResult {
                        marketplace: candidate.clone(),
                        entry,
                    }),
            );
        }

        if !results.is_empty() {
            return Ok(results);
        }
        Err(marketplace.map_or_else(
            || PluginError::NoMatches { query: needle },
            |name| PluginError::NoMatchesInMarketplace {
                marketplace: name.to_owned(),
            },
        ))
    }

    /// Finds the first entry named exactly `name`.
    ///
    /// Marketplaces are visited in name order and fetching stops at the first
    /// match.
    ///
    /// # Errors
    ///
    /// Returns [`PluginError::InvalidName`], [`PluginError::NoMarketplaces`],
    /// [`PluginError::MarketplaceNotFound`],
    /// [`PluginError::NotInMarketplace`], or
    /// [`PluginError::NotInMarketplaces`], and propagates fetch failures.
    pub fn resolve_marketplace_plugin(
        &self,
        name: &str,
        marketplace: Option<&str>,
        cancel: &CancelToken,
    ) -> Result<(Marketplace, MarketplaceEntry), PluginError> {
        validate_name(name)?;
        for candidate in self.candidates(marketplace)? {
            let index = self.source.fetch(&candidate, cancel)?;
            if let Some(entry) = index.plugins.into_iter().find(|entry| entry.name == name) {
                debug!(
                    target: MARKETPLACE_TARGET,
                    plugin = name,
                    marketplace = candidate.name(),
                    "resolved marketplace plugin"
                );
                return Ok((candidate, entry));
            }
        }

        Err(marketplace.map_or_else(
            || PluginError::NotInMarketplaces {
                name: name.to_owned(),
            },
            |marketplace_name| PluginError::NotInMarketplace {
                name: name.to_owned(),
                marketplace: marketplace_name.to_owned(),
            },
        ))
    }

    /// Configured marketplaces, narrowed to `only` when given.
    fn candidates(&self, only: Option<&str>) -> Result<Vec<Marketplace>, PluginError> {
        let marketplaces = self.store.load_marketplaces()?;
        if marketplaces.is_empty() {
            return Err(PluginError::NoMarketplaces);
        }
        let Some(wanted) = only else {
            return Ok(marketplaces);
        };
        let selected: Vec<_> = marketplaces
            .into_iter()
            .filter(|marketplace| marketplace.name() == wanted)
            .collect();
        if selected.is_empty() {
            return Err(PluginError::MarketplaceNotFound {
                name: wanted.to_owned(),
            });
        }
        Ok(selected)
    }
}
