//! Unit tests for plugin invocation modes.

use rstest::rstest;

use super::*;

#[rstest]
#[case::exec("exec", PluginMode::Exec)]
#[case::metadata("metadata", PluginMode::Metadata)]
fn parses_known_modes(#[case] input: &str, #[case] expected: PluginMode) {
    let mode: PluginMode = input.parse().expect("parse mode");
    assert_eq!(mode, expected);
    assert_eq!(mode.as_str(), input);
}

#[rstest]
#[case::empty("")]
#[case::upper("EXEC")]
#[case::unknown("serve")]
fn rejects_unknown_modes(#[case] input: &str) {
    assert!(input.parse::<PluginMode>().is_err());
}

#[test]
fn display_matches_wire_value() {
    assert_eq!(PluginMode::Metadata.to_string(), "metadata");
}
