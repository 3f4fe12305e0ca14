//! Unit tests for the plugin environment view.

use std::path::PathBuf;

use rstest::rstest;

use super::*;

fn env_of(vars: &[(&str, &str)]) -> PluginEnv {
    PluginEnv::from_lookup(|key| {
        vars.iter()
            .find(|(name, _)| *name == key)
            .map(|(_, value)| (*value).to_owned())
    })
}

#[test]
fn empty_environment_uses_defaults() {
    let env = env_of(&[]);
    assert!(!env.is_plugin());
    assert_eq!(env.mode(), PluginMode::Exec);
    assert_eq!(env.plugin_name(), None);
    assert_eq!(env.output_format(), DEFAULT_OUTPUT_FORMAT);
    assert!(!env.is_json_output());
    assert!(!env.no_color());
    assert_eq!(env.verbosity(), 0);
}

#[rstest]
#[case::set("1", true)]
#[case::other("true", false)]
#[case::empty("", false)]
fn plugin_guard_requires_one(#[case] value: &str, #[case] expected: bool) {
    assert_eq!(env_of(&[("SKY_PLUGIN", value)]).is_plugin(), expected);
}

#[rstest]
#[case::exec("exec", PluginMode::Exec)]
#[case::metadata("metadata", PluginMode::Metadata)]
#[case::unknown("describe", PluginMode::Exec)]
fn mode_parses_known_values(#[case] value: &str, #[case] expected: PluginMode) {
    let env = env_of(&[("SKY_PLUGIN_MODE", value)]);
    assert_eq!(env.mode(), expected);
    assert_eq!(env.is_metadata_mode(), expected == PluginMode::Metadata);
}

#[test]
fn explicit_paths_win_over_fallbacks() {
    let env = env_of(&[
        ("SKY_PLUGIN_NAME", "hello"),
        ("SKY_WORKSPACE_ROOT", "/work"),
        ("SKY_CONFIG_DIR", "/cfg/sky"),
    ]);
    assert_eq!(env.plugin_name(), Some("hello"));
    assert_eq!(env.workspace_root(), Some(PathBuf::from("/work")));
    assert_eq!(env.config_dir(), Some(PathBuf::from("/cfg/sky")));
}

#[test]
fn workspace_root_falls_back_to_current_directory() {
    let env = env_of(&[("SKY_WORKSPACE_ROOT", "")]);
    assert_eq!(env.workspace_root(), std::env::current_dir().ok());
}

#[test]
fn config_dir_falls_back_to_platform_default() {
    let expected = dirs::config_dir().map(|base| base.join("sky"));
    assert_eq!(env_of(&[]).config_dir(), expected);
}

#[rstest]
#[case::json("json", true)]
#[case::text("text", false)]
#[case::yaml("yaml", false)]
fn json_output_is_detected(#[case] format: &str, #[case] expected: bool) {
    let env = env_of(&[("SKY_OUTPUT_FORMAT", format)]);
    assert_eq!(env.output_format(), format);
    assert_eq!(env.is_json_output(), expected);
}

#[rstest]
#[case::sky_flag(&[("SKY_NO_COLOR", "1")], true)]
#[case::sky_flag_other(&[("SKY_NO_COLOR", "yes")], false)]
#[case::standard(&[("NO_COLOR", "")], true)]
#[case::standard_set(&[("NO_COLOR", "1")], true)]
#[case::neither(&[], false)]
fn no_color_honours_both_conventions(#[case] vars: &[(&str, &str)], #[case] expected: bool) {
    assert_eq!(env_of(vars).no_color(), expected);
}

#[rstest]
#[case::zero("0", 0)]
#[case::two("2", 2)]
#[case::clamped("7", 3)]
#[case::negative("-1", 0)]
#[case::garbage("loud", 0)]
fn verbosity_is_clamped(#[case] value: &str, #[case] expected: u8) {
    assert_eq!(env_of(&[("SKY_VERBOSE", value)]).verbosity(), expected);
}
