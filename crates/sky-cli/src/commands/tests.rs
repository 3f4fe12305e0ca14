//! Unit tests for command handlers.

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use rstest::{fixture, rstest};
use tempfile::TempDir;

use super::external::find_core_binary_in;
use super::*;
use crate::cli::{InstallArgs, MarketplaceCommand};

struct Harness {
    dir: TempDir,
    session: Session,
}

impl Harness {
    fn store(&self) -> &CatalogStore {
        self.session.store()
    }

    fn run(&self, command: CliCommand) -> (Result<i32, AppError>, String) {
        let mut stdout = Vec::new();
        let mut stderr = Vec::new();
        let mut out = Output {
            stdout: &mut stdout,
            stderr: &mut stderr,
        };
        let result = dispatch(command, &self.session, &mut out);
        (result, String::from_utf8(stdout).expect("utf8"))
    }

    fn write_file(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.dir.path().join(name);
        fs::write(&path, contents).expect("write file");
        path
    }
}

#[fixture]
fn harness() -> Harness {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = CatalogStore::new(dir.path().join("config"));
    let context = HostContext::new()
        .with_config_dir(store.root())
        .with_workspace_root(dir.path());
    Harness {
        session: Session::with_context(store, context),
        dir,
    }
}

fn plugin(action: PluginCommand) -> CliCommand {
    CliCommand::Plugin {
        action: Some(action),
    }
}

fn install_path(name: &str, path: &Path) -> CliCommand {
    plugin(PluginCommand::Install(InstallArgs {
        name: name.to_owned(),
        path: Some(path.to_path_buf()),
        url: None,
        marketplace: None,
        version: Some(String::from("1.2.0")),
        sha256: None,
        plugin_type: None,
    }))
}

fn external(args: &[&str]) -> CliCommand {
    CliCommand::External(args.iter().map(OsString::from).collect())
}

#[rstest]
fn version_prints_the_crate_version(harness: Harness) {
    let (result, stdout) = harness.run(CliCommand::Version);
    assert_eq!(result.expect("version"), 0);
    assert_eq!(stdout, format!("sky {}\n", env!("CARGO_PKG_VERSION")));
}

#[rstest]
fn empty_catalog_lists_nothing(harness: Harness) {
    let (result, stdout) = harness.run(plugin(PluginCommand::List));
    assert_eq!(result.expect("list"), 0);
    assert_eq!(stdout, "no plugins installed\n");
}

#[rstest]
fn install_list_remove_round_trip(harness: Harness) {
    let source = harness.write_file("hello-build", "#!/bin/sh\nexit 0\n");

    let (result, stdout) = harness.run(install_path("hello", &source));
    assert_eq!(result.expect("install"), 0);
    assert_eq!(stdout, "installed hello (1.2.0)\n");

    let (result, stdout) = harness.run(plugin(PluginCommand::List));
    assert_eq!(result.expect("list"), 0);
    let mut lines = stdout.lines();
    assert_eq!(
        lines.next().map(str::split_whitespace).map(Iterator::collect::<Vec<_>>),
        Some(vec!["NAME", "TYPE", "VERSION", "SOURCE", "DESCRIPTION"])
    );
    let row = lines.next().expect("plugin row");
    assert!(row.starts_with("hello  exe   1.2.0"), "row: {row}");

    let (result, stdout) = harness.run(plugin(PluginCommand::Remove {
        name: String::from("hello"),
    }));
    assert_eq!(result.expect("remove"), 0);
    assert_eq!(stdout, "removed hello\n");
    assert!(harness.store().load_plugins().expect("load").is_empty());
}

#[rstest]
fn removing_an_unknown_plugin_fails(harness: Harness) {
    let (result, _) = harness.run(plugin(PluginCommand::Remove {
        name: String::from("ghost"),
    }));
    let err = result.expect_err("not installed");
    assert_eq!(err.exit_code(), 1);
    assert_eq!(err.to_string(), "plugin \"ghost\" not installed");
}

#[rstest]
fn marketplaces_are_added_listed_and_removed(harness: Harness) {
    let (_, stdout) = harness.run(plugin(PluginCommand::Marketplace {
        action: Some(MarketplaceCommand::List),
    }));
    assert_eq!(stdout, "no marketplaces configured\n");

    let (result, stdout) = harness.run(plugin(PluginCommand::Marketplace {
        action: Some(MarketplaceCommand::Add {
            name: String::from("main"),
            url: String::from("https://plugins.example.com/index.json"),
        }),
    }));
    assert_eq!(result.expect("add"), 0);
    assert_eq!(stdout, "marketplace main added\n");

    let (_, stdout) = harness.run(plugin(PluginCommand::Marketplace {
        action: Some(MarketplaceCommand::List),
    }));
    let row = stdout.lines().nth(1).expect("marketplace row");
    assert!(row.starts_with("main  https://plugins.example.com/index.json  "));

    let (result, stdout) = harness.run(plugin(PluginCommand::Marketplace {
        action: Some(MarketplaceCommand::Remove {
            name: String::from("main"),
        }),
    }));
    assert_eq!(result.expect("remove"), 0);
    assert_eq!(stdout, "marketplace main removed\n");
}

#[rstest]
fn search_renders_matching_entries(harness: Harness) {
    let index = harness.write_file(
        "index.json",
        r#"{"name":"main","plugins":[
            {"name":"lint-extra","version":"0.3.0","description":"More lint rules","url":"https://example.com/lint-extra"},
            {"name":"fmt-plus","description":"Formatter tweaks","url":"https://example.com/fmt-plus.wasm"}
        ]}"#,
    );
    harness
        .store()
        .upsert_marketplace(&sky_plugins::Marketplace::new(
            "main",
            index.to_string_lossy(),
        ))
        .expect("add marketplace");

    let (result, stdout) = harness.run(plugin(PluginCommand::Search {
        query: String::from("LINT"),
        marketplace: None,
    }));
    assert_eq!(result.expect("search"), 0);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines.first().is_some_and(|line| line.starts_with("NAME")));
    assert!(lines.get(1).is_some_and(|line| {
        line.contains("lint-extra") && line.contains("0.3.0") && line.contains("More lint rules")
    }));
}

#[rstest]
fn search_without_marketplaces_fails(harness: Harness) {
    let (result, _) = harness.run(plugin(PluginCommand::Search {
        query: String::from("lint"),
        marketplace: None,
    }));
    assert_eq!(
        result.expect_err("no marketplaces").to_string(),
        "no marketplaces configured"
    );
}

#[rstest]
#[case::unknown_plugin(&["deploy"])]
#[case::invalid_name(&["Deploy"])]
fn unresolvable_commands_are_unknown(harness: Harness, #[case] args: &[&str]) {
    let (result, _) = harness.run(external(args));
    let err = result.expect_err("unknown command");
    assert!(matches!(err, AppError::UnknownCommand(_)));
    assert_eq!(err.exit_code(), 2);
}

#[rstest]
fn core_binary_prefers_the_executable_directory(harness: Harness) {
    let exe_dir = harness.dir.path().join("bin");
    let path_dir = harness.dir.path().join("path");
    fs::create_dir_all(&exe_dir).expect("exe dir");
    fs::create_dir_all(&path_dir).expect("path dir");
    let file_name = format!("skylint{}", std::env::consts::EXE_SUFFIX);
    fs::write(exe_dir.join(&file_name), "").expect("exe tool");
    fs::write(path_dir.join(&file_name), "").expect("path tool");

    let search = std::env::join_paths([&path_dir]).expect("join paths");
    assert_eq!(
        find_core_binary_in("skylint", Some(&exe_dir), Some(&search)),
        Some(exe_dir.join(&file_name))
    );
    assert_eq!(
        find_core_binary_in("skylint", None, Some(&search)),
        Some(path_dir.join(&file_name))
    );
    assert_eq!(find_core_binary_in("skyfmt", Some(&exe_dir), Some(&search)), None);
}

#[cfg(unix)]
mod unix {
    use std::os::unix::fs::PermissionsExt;

    use super::*;

    fn script(harness: &Harness, name: &str, body: &str) -> PathBuf {
        let path = harness.write_file(name, &format!("#!/bin/sh\n{body}\n"));
        let mut permissions = fs::metadata(&path).expect("metadata").permissions();
        permissions.set_mode(0o755);
        fs::set_permissions(&path, permissions).expect("chmod");
        path
    }

    #[rstest]
    fn plugin_exit_code_is_propagated(harness: Harness) {
        let source = script(&harness, "exit-build", "exit 3");
        harness
            .run(install_path("exiter", &source))
            .0
            .expect("install");
        let (result, _) = harness.run(external(&["exiter", "--flag"]));
        assert_eq!(result.expect("run plugin"), 3);
    }

    #[rstest]
    fn inspect_prints_and_records_metadata(harness: Harness) {
        let source = script(
            &harness,
            "meta-build",
            r#"printf '{"api_version":1,"name":"meta","version":"2.0.0","summary":"Describes itself"}'"#,
        );
        harness
            .run(install_path("meta", &source))
            .0
            .expect("install");

        let (result, stdout) = harness.run(plugin(PluginCommand::Inspect {
            name: String::from("meta"),
        }));
        assert_eq!(result.expect("inspect"), 0);
        assert!(stdout.contains("\"version\": \"2.0.0\""), "stdout: {stdout}");

        let recorded = harness
            .store()
            .find_plugin("meta")
            .expect("load")
            .expect("installed");
        assert_eq!(recorded.version(), Some("2.0.0"));
        assert_eq!(recorded.description(), Some("Describes itself"));
    }

    #[rstest]
    fn inspect_of_unknown_plugin_fails(harness: Harness) {
        let (result, _) = harness.run(plugin(PluginCommand::Inspect {
            name: String::from("ghost"),
        }));
        assert_eq!(
            result.expect_err("missing").to_string(),
            "plugin \"ghost\" not installed"
        );
    }
}
