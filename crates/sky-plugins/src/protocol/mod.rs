//! Host side of the plugin protocol.
//!
//! [`PluginType`] decides which execution backend runs a plugin, and
//! [`ProtocolEnv`] assembles the environment variables both backends hand to
//! the plugin. The variable names and modes themselves live in
//! [`sky_plugin_protocol`].

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use sky_plugin_protocol::{PluginMode, env};

use crate::error::PluginError;

/// How a plugin binary is executed.
///
/// Catalog records and marketplace indexes keep the declared `type` string
/// verbatim; it is only interpreted through [`PluginType::from_declared`]
/// when a backend has to be chosen.
///
/// ```
/// use sky_plugins::PluginType;
///
/// assert_eq!(PluginType::detect("https://example.com/lint.WASM"), PluginType::Sandboxed);
/// assert_eq!("binary".parse::<PluginType>().expect("alias"), PluginType::Native);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum PluginType {
    /// A native executable spawned as a child process.
    #[default]
    Native,
    /// A WASI preview 1 module run inside the sandbox.
    Sandboxed,
}

impl PluginType {
    /// Catalog spelling of the type.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Native => "exe",
            Self::Sandboxed => "wasm",
        }
    }

    /// Interprets a declared `type` value; an absent declaration is native.
    ///
    /// # Errors
    ///
    /// Returns [`PluginError::UnknownPluginType`] for a value no backend
    /// handles.
    pub fn from_declared(declared: Option<&str>) -> Result<Self, PluginError> {
        declared.map_or(Ok(Self::Native), str::parse)
    }

    /// Infers the type from a path or URL: a `.wasm` suffix (ignoring case
    /// and surrounding whitespace) means sandboxed, anything else native.
    #[must_use]
    pub fn detect(source: &str) -> Self {
        if source.trim().to_ascii_lowercase().ends_with(".wasm") {
            Self::Sandboxed
        } else {
            Self::Native
        }
    }

    /// Returns `explicit` when given, otherwise detects from `source`.
    #[must_use]
    pub fn resolve(explicit: Option<Self>, source: &str) -> Self {
        explicit.unwrap_or_else(|| Self::detect(source))
    }

    /// File name of a plugin of this type inside the plugins directory.
    #[must_use]
    pub fn file_name(self, name: &str) -> String {
        match self {
            Self::Native => name.to_owned(),
            Self::Sandboxed => format!("{name}.wasm"),
        }
    }
}

impl FromStr for PluginType {
    type Err = PluginError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        match input.trim().to_ascii_lowercase().as_str() {
            "" | "exe" | "bin" | "binary" | "native" => Ok(Self::Native),
            "wasm" | "sandboxed" => Ok(Self::Sandboxed),
            _ => Err(PluginError::UnknownPluginType {
                value: input.to_owned(),
            }),
        }
    }
}

impl fmt::Display for PluginType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Host facts forwarded to every plugin invocation.
///
/// Built once per CLI invocation and shared by both execution backends.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HostContext {
    workspace_root: Option<PathBuf>,
    config_dir: Option<PathBuf>,
    passthrough: Vec<(String, String)>,
}

impl HostContext {
    /// Creates an empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the resolved workspace root.
    #[must_use]
    pub fn with_workspace_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.workspace_root = Some(root.into());
        self
    }

    /// Records the host configuration directory.
    #[must_use]
    pub fn with_config_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config_dir = Some(dir.into());
        self
    }

    /// Copies the pass-through variables (`SKY_OUTPUT_FORMAT`,
    /// `SKY_NO_COLOR`, `SKY_VERBOSE`) that `lookup` reports as set and
    /// non-empty.
    ///
    /// ```
    /// use sky_plugins::HostContext;
    ///
    /// let context = HostContext::new().with_passthrough_from(|key| {
    ///     (key == "SKY_VERBOSE").then(|| String::from("2"))
    /// });
    /// assert_eq!(context.passthrough(), [("SKY_VERBOSE".to_owned(), "2".to_owned())]);
    /// ```
    #[must_use]
    pub fn with_passthrough_from<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        self.passthrough = env::PASSTHROUGH
            .iter()
            .filter_map(|key| {
                lookup(key)
                    .filter(|value| !value.is_empty())
                    .map(|value| ((*key).to_owned(), value))
            })
            .collect();
        self
    }

    /// Resolved workspace root, if any.
    #[must_use]
    pub fn workspace_root(&self) -> Option<&Path> {
        self.workspace_root.as_deref()
    }

    /// Host configuration directory, if known.
    #[must_use]
    pub fn config_dir(&self) -> Option<&Path> {
        self.config_dir.as_deref()
    }

    /// Pass-through variables captured from the host.
    #[must_use]
    pub fn passthrough(&self) -> &[(String, String)] {
        &self.passthrough
    }
}

/// The environment variables describing one plugin invocation.
///
/// ```
/// use sky_plugin_protocol::PluginMode;
/// use sky_plugins::{HostContext, ProtocolEnv};
///
/// let env = ProtocolEnv::new("hello", PluginMode::Metadata, &HostContext::new());
/// assert_eq!(env.get("SKY_PLUGIN"), Some("1"));
/// assert_eq!(env.get("SKY_PLUGIN_MODE"), Some("metadata"));
/// assert_eq!(env.get("SKY_WORKSPACE_ROOT"), None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtocolEnv {
    vars: Vec<(String, String)>,
}

impl ProtocolEnv {
    /// Builds the environment for plugin `name` running in `mode`.
    #[must_use]
    pub fn new(name: &str, mode: PluginMode, context: &HostContext) -> Self {
        let mut vars = vec![
            (env::PLUGIN.to_owned(), String::from("1")),
            (env::PLUGIN_MODE.to_owned(), mode.as_str().to_owned()),
            (env::PLUGIN_NAME.to_owned(), name.to_owned()),
        ];
        if let Some(root) = context.workspace_root() {
            vars.push((env::WORKSPACE_ROOT.to_owned(), root.display().to_string()));
        }
        if let Some(dir) = context.config_dir() {
            vars.push((env::CONFIG_DIR.to_owned(), dir.display().to_string()));
        }
        vars.extend(context.passthrough().iter().cloned());
        Self { vars }
    }

    /// Looks up a variable by name.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value.as_str())
    }

    /// Iterates over the variables in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.vars
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }

    /// Number of variables.
    #[must_use]
    pub fn len(&self) -> usize {
        self.vars.len()
    }

    /// Returns `true` when no variables are set. Never the case for a
    /// constructed environment.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

#[cfg(test)]
mod tests;
