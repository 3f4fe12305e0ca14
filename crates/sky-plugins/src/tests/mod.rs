//! Crate-level integration and BDD tests.

use std::fs;

use sky_plugin_protocol::PluginMode;

use crate::cancel::CancelToken;
use crate::catalog::{CatalogStore, Plugin};
use crate::error::PluginError;
use crate::install::Installer;
use crate::protocol::{HostContext, PluginType};
use crate::runner::{ExecOutcome, ExecutionBackend, Invocation, PluginRunner, StdioMode};

pub(crate) mod support;

/// Backend that echoes the plugin's protocol mode back as metadata.
struct MetadataEcho;

impl ExecutionBackend for MetadataEcho {
    fn execute(
        &self,
        invocation: &Invocation,
        _cancel: &CancelToken,
    ) -> Result<ExecOutcome, PluginError> {
        let document = format!(
            r#"{{"api_version":1,"name":"{}","summary":"mode {}"}}"#,
            invocation.name(),
            invocation.env().get("SKY_PLUGIN_MODE").unwrap_or_default()
        );
        Ok(ExecOutcome {
            exit_code: 0,
            stdout: document.into_bytes(),
            stderr: Vec::new(),
        })
    }
}

#[test]
fn install_inspect_and_merge_round_trip() {
    let dir = tempfile::tempdir().expect("tempdir");
    let source = dir.path().join("hello.wasm");
    fs::write(&source, b"\0asm").expect("write module");
    let store = CatalogStore::new(dir.path().join("sky"));

    let mut plugin = Installer::new(store.clone())
        .install_from_path("hello", &source, Some("0.1.0"), PluginType::detect("hello.wasm"))
        .expect("install");
    assert_eq!(plugin.effective_type().expect("known type"), PluginType::Sandboxed);

    let runner = PluginRunner::with_backends(HostContext::new(), MetadataEcho, MetadataEcho);
    let metadata = runner
        .metadata(&plugin, &CancelToken::new())
        .expect("metadata");
    assert_eq!(metadata.summary(), Some(format!("mode {}", PluginMode::Metadata).as_str()));

    plugin.apply_metadata(&metadata);
    store.upsert_plugin(&plugin).expect("merge");
    let stored = store
        .find_plugin("hello")
        .expect("find")
        .expect("installed");
    assert_eq!(stored.description(), Some("mode metadata"));
    assert_eq!(stored.version(), Some("0.1.0"));
}

#[test]
fn exec_dispatch_with_stub_backends() {
    let runner = PluginRunner::with_backends(HostContext::new(), MetadataEcho, MetadataEcho);
    let plugin = Plugin::new("hello", PluginType::Native).with_path("/bin/hello");
    let outcome = runner
        .dispatch(
            &plugin,
            PluginMode::Exec,
            &[],
            StdioMode::Capture,
            &CancelToken::new(),
        )
        .expect("dispatch");
    assert!(String::from_utf8_lossy(&outcome.stdout).contains("mode exec"));
}
