//! Integration tests for the `sky` binary entry point.
//!
//! Each test points `SKY_CONFIG_DIR` at a fresh temporary directory so the
//! catalog starts empty and the developer's configuration is never touched.

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::PredicateBooleanExt;
use predicates::str::{contains, starts_with};
use tempfile::TempDir;

fn sky(config: &TempDir) -> Command {
    let mut command = cargo_bin_cmd!("sky");
    command
        .env("SKY_CONFIG_DIR", config.path())
        .env_remove("SKY_LOG")
        .env_remove("SKY_LOG_FORMAT");
    command
}

fn config() -> TempDir {
    tempfile::tempdir().expect("tempdir")
}

#[test]
fn version_reports_the_package_version() {
    let config = config();
    sky(&config)
        .arg("version")
        .assert()
        .success()
        .stdout(format!("sky {}\n", env!("CARGO_PKG_VERSION")));
}

#[test]
fn empty_catalog_lists_no_plugins() {
    let config = config();
    sky(&config)
        .args(["plugin", "list"])
        .assert()
        .success()
        .stdout("no plugins installed\n");
}

#[test]
fn unknown_command_exits_with_usage_status() {
    let config = config();
    sky(&config)
        .arg("deploy")
        .assert()
        .code(2)
        .stderr(starts_with("sky: unknown command \"deploy\"").and(contains("sky plugin search deploy")));
}

#[test]
fn conflicting_install_sources_are_rejected() {
    let config = config();
    sky(&config)
        .args(["plugin", "install", "x", "--path", "a", "--url", "b"])
        .assert()
        .code(2);
}

#[test]
fn missing_plugin_source_fails_operationally() {
    let config = config();
    let missing = config.path().join("absent-binary");
    sky(&config)
        .args(["plugin", "install", "hello", "--path"])
        .arg(&missing)
        .assert()
        .code(1)
        .stderr(starts_with("sky: failed to stat plugin"));
}

#[test]
fn marketplace_lifecycle_round_trips() {
    let config = config();
    sky(&config)
        .args(["plugin", "marketplace", "add", "main", "https://plugins.example.com/index.json"])
        .assert()
        .success()
        .stdout("marketplace main added\n");
    sky(&config)
        .args(["plugin", "marketplace", "list"])
        .assert()
        .success()
        .stdout(contains("main  https://plugins.example.com/index.json"));
    sky(&config)
        .args(["plugin", "marketplace", "remove", "main"])
        .assert()
        .success()
        .stdout("marketplace main removed\n");
}

#[cfg(unix)]
#[test]
fn installed_plugin_runs_with_the_protocol_environment() {
    use std::fs;
    use std::os::unix::fs::PermissionsExt;

    let config = config();
    let source = config.path().join("greet-build");
    fs::write(
        &source,
        "#!/bin/sh\necho \"$SKY_PLUGIN_NAME:$SKY_PLUGIN_MODE:$1\"\nexit 4\n",
    )
    .expect("write plugin");
    fs::set_permissions(&source, fs::Permissions::from_mode(0o755)).expect("chmod");

    sky(&config)
        .args(["plugin", "install", "greet", "--version", "0.1.0", "--path"])
        .arg(&source)
        .assert()
        .success()
        .stdout("installed greet (0.1.0)\n");
    sky(&config)
        .args(["greet", "world"])
        .assert()
        .code(4)
        .stdout("greet:exec:world\n");
    sky(&config)
        .args(["plugin", "remove", "greet"])
        .assert()
        .success()
        .stdout("removed greet\n");
}
