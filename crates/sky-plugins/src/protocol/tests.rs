//! Unit tests for plugin types and the protocol environment.

use rstest::rstest;

use super::*;

#[rstest]
#[case::empty("", PluginType::Native)]
#[case::exe("exe", PluginType::Native)]
#[case::bin("bin", PluginType::Native)]
#[case::binary(" Binary ", PluginType::Native)]
#[case::wasm("wasm", PluginType::Sandboxed)]
#[case::wasm_upper("WASM", PluginType::Sandboxed)]
fn parses_type_aliases(#[case] input: &str, #[case] expected: PluginType) {
    assert_eq!(input.parse::<PluginType>().expect("parse type"), expected);
}

#[test]
fn rejects_unknown_type() {
    let err = "jar".parse::<PluginType>().expect_err("unknown type");
    assert_eq!(err.to_string(), r#"unknown plugin type "jar""#);
}

#[rstest]
#[case::local_wasm("/tmp/tool.wasm", PluginType::Sandboxed)]
#[case::url_wasm("https://example.com/dl/tool.WASM", PluginType::Sandboxed)]
#[case::padded(" tool.wasm  ", PluginType::Sandboxed)]
#[case::native("/usr/local/bin/tool", PluginType::Native)]
#[case::wasm_in_dir("/opt/wasm/tool", PluginType::Native)]
#[case::wasm_infix("tool.wasm.gz", PluginType::Native)]
fn detects_type_from_suffix(#[case] source: &str, #[case] expected: PluginType) {
    assert_eq!(PluginType::detect(source), expected);
}

#[test]
fn explicit_type_wins_over_detection() {
    let resolved = PluginType::resolve(Some(PluginType::Native), "tool.wasm");
    assert_eq!(resolved, PluginType::Native);
    assert_eq!(PluginType::resolve(None, "tool.wasm"), PluginType::Sandboxed);
}

#[rstest]
#[case::absent(None, PluginType::Native)]
#[case::alias(Some("bin"), PluginType::Native)]
#[case::wasm(Some("wasm"), PluginType::Sandboxed)]
fn interprets_declared_types(#[case] declared: Option<&str>, #[case] expected: PluginType) {
    assert_eq!(
        PluginType::from_declared(declared).expect("known type"),
        expected
    );
}

#[test]
fn unhandled_declared_type_is_reported() {
    let err = PluginType::from_declared(Some("python")).expect_err("no backend");
    assert!(matches!(err, PluginError::UnknownPluginType { ref value } if value == "python"));
}

#[test]
fn file_name_appends_wasm_suffix() {
    assert_eq!(PluginType::Native.file_name("hello"), "hello");
    assert_eq!(PluginType::Sandboxed.file_name("hello"), "hello.wasm");
}

#[test]
fn protocol_env_carries_core_variables() {
    let env = ProtocolEnv::new("hello", PluginMode::Exec, &HostContext::new());
    let vars: Vec<_> = env.iter().collect();
    assert_eq!(
        vars,
        [
            ("SKY_PLUGIN", "1"),
            ("SKY_PLUGIN_MODE", "exec"),
            ("SKY_PLUGIN_NAME", "hello"),
        ]
    );
}

#[test]
fn protocol_env_includes_host_context() {
    let context = HostContext::new()
        .with_workspace_root("/work/project")
        .with_config_dir("/home/me/.config/sky")
        .with_passthrough_from(|key| match key {
            "SKY_OUTPUT_FORMAT" => Some(String::from("json")),
            "SKY_NO_COLOR" => Some(String::new()),
            _ => None,
        });
    let env = ProtocolEnv::new("hello", PluginMode::Metadata, &context);

    assert_eq!(env.get("SKY_WORKSPACE_ROOT"), Some("/work/project"));
    assert_eq!(env.get("SKY_CONFIG_DIR"), Some("/home/me/.config/sky"));
    assert_eq!(env.get("SKY_OUTPUT_FORMAT"), Some("json"));
    assert_eq!(env.get("SKY_NO_COLOR"), None, "empty values are not forwarded");
    assert_eq!(env.get("SKY_VERBOSE"), None);
    assert_eq!(env.len(), 6);
}
