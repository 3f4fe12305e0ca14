//! File templates for `sky plugin init`.
//!
//! `@NAME@` is replaced by the plugin name.

const PLACEHOLDER: &str = "@NAME@";

const CARGO_TOML: &str = r#"[package]
name = "@NAME@"
version = "0.1.0"
edition = "2024"

[dependencies]
sky-plugin-sdk = "0.1"
"#;

const NATIVE_MAIN: &str = r#"//! @NAME@: a sky plugin.

use std::io::{self, Write};
use std::process::ExitCode;

use sky_plugin_sdk::{CommandMetadata, Metadata, Plugin, PluginEnv, RunResult};

const SUMMARY: &str = "A sky plugin";

struct App;

impl Plugin for App {
    fn metadata(&self) -> Metadata {
        Metadata::new("@NAME@")
            .with_version(env!("CARGO_PKG_VERSION"))
            .with_summary(SUMMARY)
            .with_command(CommandMetadata::new("@NAME@").with_summary(SUMMARY))
    }

    fn run(&self, args: &[String], env: &PluginEnv) -> RunResult {
        let mut stdout = io::stdout().lock();
        if args.iter().any(|arg| arg == "--version") {
            writeln!(stdout, "@NAME@ {}", env!("CARGO_PKG_VERSION"))?;
            return Ok(());
        }

        // Plugin logic goes here.
        writeln!(stdout, "Hello from @NAME@")?;
        if let Some(root) = env.workspace_root() {
            writeln!(stdout, "Workspace: {}", root.display())?;
        }
        Ok(())
    }
}

fn main() -> ExitCode {
    sky_plugin_sdk::serve(&App)
}
"#;

const WASM_MAIN: &str = r#"//! @NAME@: a sky plugin compiled to WASI.
//!
//! The module runs inside the sky sandbox: it sees its arguments, the
//! protocol environment, and the standard streams, but no filesystem or
//! network.
//!
//! Build with:
//!
//!     cargo build --release --target wasm32-wasip1

use std::io::{self, Write};
use std::process::ExitCode;

use sky_plugin_sdk::{CommandMetadata, Metadata, Plugin, PluginEnv, RunResult};

const SUMMARY: &str = "A sky WASM plugin";

struct App;

impl Plugin for App {
    fn metadata(&self) -> Metadata {
        Metadata::new("@NAME@")
            .with_version(env!("CARGO_PKG_VERSION"))
            .with_summary(SUMMARY)
            .with_command(CommandMetadata::new("@NAME@").with_summary(SUMMARY))
    }

    fn run(&self, args: &[String], env: &PluginEnv) -> RunResult {
        let mut stdout = io::stdout().lock();
        if args.iter().any(|arg| arg == "--version") {
            writeln!(stdout, "@NAME@ {}", env!("CARGO_PKG_VERSION"))?;
            return Ok(());
        }

        // Plugin logic goes here.
        writeln!(stdout, "Hello from WASM plugin: @NAME@")?;
        if let Some(root) = env.workspace_root() {
            writeln!(stdout, "Workspace: {}", root.display())?;
        }
        writeln!(stdout, "(Running in WASM sandbox)")?;
        Ok(())
    }
}

fn main() -> ExitCode {
    sky_plugin_sdk::serve(&App)
}
"#;

const ENV_TABLE: &str = r#"## Environment Variables

These are set by sky when running your plugin:

| Variable | Description |
|----------|-------------|
| `SKY_PLUGIN` | Always "1" when running as a plugin |
| `SKY_PLUGIN_MODE` | "exec" or "metadata" |
| `SKY_PLUGIN_NAME` | The plugin's registered name |
| `SKY_WORKSPACE_ROOT` | Workspace root directory |
| `SKY_CONFIG_DIR` | sky configuration directory |
| `SKY_OUTPUT_FORMAT` | "text" or "json" |
| `SKY_NO_COLOR` | "1" when colour output is disabled |
| `SKY_VERBOSE` | Verbosity level, 0 to 3 |
"#;

const NATIVE_README: &str = r#"# @NAME@

A sky plugin.

## Build

```bash
cargo build --release
```

## Install

```bash
sky plugin install --path ./target/release/@NAME@ @NAME@
```

## Usage

```bash
sky @NAME@
```

"#;

const WASM_README: &str = r#"# @NAME@

A sky WASM plugin.

## Build

```bash
rustup target add wasm32-wasip1
cargo build --release --target wasm32-wasip1
```

## Install

```bash
sky plugin install --path ./target/wasm32-wasip1/release/@NAME@.wasm @NAME@
```

## Usage

```bash
sky @NAME@
```

## WASI Limitations

WASM plugins run in a sandboxed environment:

- **No filesystem access**: use environment variables for paths
- **No network access**: all I/O goes through stdin and stdout
- **Bounded memory**: the host may cap linear memory

For filesystem-heavy work, consider a native plugin.

"#;

/// A file written into the new project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct TemplateFile {
    pub(super) path: &'static str,
    pub(super) contents: String,
}

/// Project files for a plugin called `name`.
pub(super) fn render(name: &str, wasm: bool) -> Vec<TemplateFile> {
    let (main, readme) = if wasm {
        (WASM_MAIN, WASM_README)
    } else {
        (NATIVE_MAIN, NATIVE_README)
    };
    let fill = |template: &str| template.replace(PLACEHOLDER, name);
    vec![
        TemplateFile {
            path: "Cargo.toml",
            contents: fill(CARGO_TOML),
        },
        TemplateFile {
            path: "src/main.rs",
            contents: fill(main),
        },
        TemplateFile {
            path: "README.md",
            contents: format!("{}{ENV_TABLE}", fill(readme)),
        },
    ]
}

/// Shell commands that build and install the project.
pub(super) fn next_steps(name: &str, wasm: bool) -> [String; 4] {
    let (build, artifact) = if wasm {
        (
            "cargo build --release --target wasm32-wasip1",
            format!("./target/wasm32-wasip1/release/{name}.wasm"),
        )
    } else {
        ("cargo build --release", format!("./target/release/{name}"))
    };
    [
        format!("cd {name}"),
        build.to_owned(),
        format!("sky plugin install --path {artifact} {name}"),
        format!("sky {name}"),
    ]
}
