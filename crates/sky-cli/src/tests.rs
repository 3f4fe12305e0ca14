//! Unit tests for argument handling and error reporting.

use std::ffi::OsString;
use std::process::ExitCode;

use rstest::{fixture, rstest};
use tempfile::TempDir;

use super::*;

#[fixture]
fn config_dir() -> TempDir {
    tempfile::tempdir().expect("tempdir")
}

struct Invocation {
    exit: ExitCode,
    stdout: String,
    stderr: String,
}

fn invoke(config_dir: &TempDir, args: &[&str]) -> Invocation {
    let mut argv: Vec<OsString> = vec![OsString::from("sky")];
    argv.push(OsString::from("--config-dir"));
    argv.push(config_dir.path().as_os_str().to_owned());
    argv.extend(args.iter().map(OsString::from));

    let mut stdout = Vec::new();
    let mut stderr = Vec::new();
    let exit = run(argv, &mut stdout, &mut stderr);
    Invocation {
        exit,
        stdout: String::from_utf8(stdout).expect("utf8"),
        stderr: String::from_utf8(stderr).expect("utf8"),
    }
}

#[rstest]
fn bare_invocation_prints_usage(config_dir: TempDir) {
    let result = invoke(&config_dir, &[]);
    assert_eq!(result.exit, ExitCode::SUCCESS);
    assert!(result.stderr.starts_with("usage: sky <command> [args]"));
    assert!(result.stderr.contains("  lint         lint Starlark files"));
    assert!(result.stdout.is_empty());
}

#[rstest]
fn help_goes_to_stdout(config_dir: TempDir) {
    let result = invoke(&config_dir, &["--help"]);
    assert_eq!(result.exit, ExitCode::SUCCESS);
    assert!(result.stdout.contains("Usage: sky"));
}

#[rstest]
#[case::plugin(&["plugin"], "usage: sky plugin <command> [args]")]
#[case::marketplace(&["plugin", "marketplace"], "usage: sky plugin marketplace <command> [args]")]
fn bare_groups_print_their_usage(
    config_dir: TempDir,
    #[case] args: &[&str],
    #[case] expected: &str,
) {
    let result = invoke(&config_dir, args);
    assert_eq!(result.exit, ExitCode::SUCCESS);
    assert!(result.stderr.starts_with(expected), "stderr: {}", result.stderr);
}

#[rstest]
fn version_prints_the_package_version(config_dir: TempDir) {
    let result = invoke(&config_dir, &["version"]);
    assert_eq!(result.exit, ExitCode::SUCCESS);
    assert_eq!(result.stdout, format!("sky {}\n", env!("CARGO_PKG_VERSION")));
}

#[rstest]
#[case::path_and_url(&["plugin", "install", "x", "--path", "/tmp/x", "--url", "https://e/x"])]
#[case::type_without_source(&["plugin", "install", "x", "--type", "wasm"])]
#[case::unknown_type(&["plugin", "install", "x", "--path", "/tmp/x", "--type", "elf"])]
#[case::missing_name(&["plugin", "install"])]
#[case::extra_argument(&["plugin", "remove", "a", "b"])]
#[case::unknown_plugin_command(&["plugin", "frobnicate"])]
fn usage_errors_exit_with_two(config_dir: TempDir, #[case] args: &[&str]) {
    let result = invoke(&config_dir, args);
    assert_eq!(result.exit, ExitCode::from(2));
    assert!(!result.stderr.is_empty());
}

#[rstest]
fn unknown_command_prints_suggestions(config_dir: TempDir) {
    let result = invoke(&config_dir, &["lnt"]);
    assert_eq!(result.exit, ExitCode::from(2));
    assert!(result.stderr.starts_with("sky: unknown command \"lnt\""));
    assert!(result.stderr.contains("sky plugin install lnt"));
}

#[rstest]
fn operational_errors_exit_with_one(config_dir: TempDir) {
    let result = invoke(&config_dir, &["plugin", "remove", "ghost"]);
    assert_eq!(result.exit, ExitCode::from(1));
    assert_eq!(result.stderr, "sky: plugin \"ghost\" not installed\n");
}

#[rstest]
fn invalid_names_are_reported(config_dir: TempDir) {
    let result = invoke(&config_dir, &["plugin", "remove", "Ghost"]);
    assert_eq!(result.exit, ExitCode::from(1));
    assert_eq!(result.stderr, "sky: invalid plugin name \"Ghost\"\n");
}
