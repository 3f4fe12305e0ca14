//! Environment variable names that make up the plugin protocol.

/// Set to `"1"` whenever a process is launched as a `sky` plugin.
pub const PLUGIN: &str = "SKY_PLUGIN";

/// Invocation mode, either `exec` or `metadata`.
pub const PLUGIN_MODE: &str = "SKY_PLUGIN_MODE";

/// Catalog name under which the plugin was launched.
pub const PLUGIN_NAME: &str = "SKY_PLUGIN_NAME";

/// Workspace root resolved by the host.
pub const WORKSPACE_ROOT: &str = "SKY_WORKSPACE_ROOT";

/// Configuration directory owned by the host.
pub const CONFIG_DIR: &str = "SKY_CONFIG_DIR";

/// Requested output format, forwarded from the host environment.
pub const OUTPUT_FORMAT: &str = "SKY_OUTPUT_FORMAT";

/// Colour suppression flag, forwarded from the host environment.
pub const NO_COLOR: &str = "SKY_NO_COLOR";

/// Verbosity level, forwarded from the host environment.
pub const VERBOSE: &str = "SKY_VERBOSE";

/// Host variables copied into the plugin environment only when set.
pub const PASSTHROUGH: [&str; 3] = [OUTPUT_FORMAT, NO_COLOR, VERBOSE];
