//! Unit tests for configuration resolution.

use std::path::PathBuf;
use std::str::FromStr;

use clap::Parser;
use rstest::rstest;

use super::*;

#[derive(Debug, Parser)]
struct Harness {
    #[command(flatten)]
    config: ConfigArgs,
}

#[rstest]
#[case::compact("compact", LogFormat::Compact)]
#[case::json("json", LogFormat::Json)]
#[case::mixed_case("JSON", LogFormat::Json)]
fn log_format_parses(#[case] input: &str, #[case] expected: LogFormat) {
    assert_eq!(LogFormat::from_str(input).expect("parse"), expected);
}

#[test]
fn log_format_rejects_unknown_values() {
    assert!(LogFormat::from_str("yaml").is_err());
}

#[test]
fn log_format_displays_lowercase() {
    assert_eq!(LogFormat::Json.to_string(), "json");
    assert!(LogFormat::Json.is_structured());
    assert!(!LogFormat::Compact.is_structured());
}

#[test]
fn flags_take_effect() {
    let harness = Harness::try_parse_from([
        "sky",
        "--config-dir",
        "/srv/sky",
        "--log-filter",
        "sky_plugins=debug",
        "--log-format",
        "json",
    ])
    .expect("parse");
    let config = Config::resolve(&harness.config).expect("resolve");
    assert_eq!(config.config_dir(), PathBuf::from("/srv/sky"));
    assert_eq!(config.log_filter(), "sky_plugins=debug");
    assert_eq!(config.log_format(), LogFormat::Json);
}

#[test]
fn invalid_log_format_is_a_parse_error() {
    let result = Harness::try_parse_from(["sky", "--config-dir", "/srv/sky", "--log-format", "xml"]);
    assert!(result.is_err());
}

#[test]
fn defaults_fill_missing_logging_values() {
    let args = ConfigArgs {
        config_dir: Some(PathBuf::from("/srv/sky")),
        log_filter: Some(String::from("  ")),
        log_format: None,
    };
    let config = Config::resolve(&args).expect("resolve");
    assert_eq!(config.log_filter(), DEFAULT_LOG_FILTER);
    assert_eq!(config.log_format(), LogFormat::Compact);
}

#[test]
fn platform_directory_is_the_fallback() {
    let Some(expected) = default_config_dir() else {
        assert_eq!(
            Config::resolve(&ConfigArgs::default()),
            Err(ConfigError::NoConfigDir)
        );
        return;
    };
    let args = ConfigArgs {
        config_dir: Some(PathBuf::new()),
        ..ConfigArgs::default()
    };
    let config = Config::resolve(&args).expect("resolve");
    assert_eq!(config.config_dir(), expected);
    assert!(expected.ends_with(CONFIG_DIR_NAME));
}

#[test]
fn explicit_directory_constructor_uses_default_logging() {
    let config = Config::with_config_dir("/tmp/sky");
    assert_eq!(config.config_dir(), PathBuf::from("/tmp/sky"));
    assert_eq!(config.log_filter(), default_log_filter());
    assert_eq!(config.log_format(), default_log_format());
}
