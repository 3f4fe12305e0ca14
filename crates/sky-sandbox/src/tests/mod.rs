//! Unit tests for the WebAssembly sandbox.
//!
//! Guest modules are written in the WebAssembly text format, which `wasmtime`
//! compiles directly.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use rstest::{fixture, rstest};

use crate::{Sandbox, SandboxError, SandboxProfile};

const RETURNS_NORMALLY: &[u8] = br#"
(module
  (memory (export "memory") 1)
  (func (export "_start")))
"#;

const EXITS_SEVEN: &[u8] = br#"
(module
  (import "wasi_snapshot_preview1" "proc_exit" (func $proc_exit (param i32)))
  (memory (export "memory") 1)
  (func (export "_start") (call $proc_exit (i32.const 7))))
"#;

const WRITES_HELLO: &[u8] = br#"
(module
  (import "wasi_snapshot_preview1" "fd_write"
    (func $fd_write (param i32 i32 i32 i32) (result i32)))
  (memory (export "memory") 1)
  (data (i32.const 16) "hello\n")
  (func (export "_start")
    (i32.store (i32.const 0) (i32.const 16))
    (i32.store (i32.const 4) (i32.const 6))
    (drop (call $fd_write (i32.const 1) (i32.const 0) (i32.const 1) (i32.const 8)))))
"#;

const EXITS_WITH_ARGC: &[u8] = br#"
(module
  (import "wasi_snapshot_preview1" "args_sizes_get"
    (func $args_sizes_get (param i32 i32) (result i32)))
  (import "wasi_snapshot_preview1" "proc_exit" (func $proc_exit (param i32)))
  (memory (export "memory") 1)
  (func (export "_start")
    (drop (call $args_sizes_get (i32.const 0) (i32.const 4)))
    (call $proc_exit (i32.load (i32.const 0)))))
"#;

const EXITS_WITH_ENV_COUNT: &[u8] = br#"
(module
  (import "wasi_snapshot_preview1" "environ_sizes_get"
    (func $environ_sizes_get (param i32 i32) (result i32)))
  (import "wasi_snapshot_preview1" "proc_exit" (func $proc_exit (param i32)))
  (memory (export "memory") 1)
  (func (export "_start")
    (drop (call $environ_sizes_get (i32.const 0) (i32.const 4)))
    (call $proc_exit (i32.load (i32.const 0)))))
"#;

const SPINS_FOREVER: &[u8] = br#"
(module
  (memory (export "memory") 1)
  (func (export "_start") (loop $spin (br $spin))))
"#;

const TRAPS: &[u8] = br#"
(module
  (memory (export "memory") 1)
  (func (export "_start") unreachable))
"#;

const NO_ENTRY_POINT: &[u8] = br#"
(module
  (memory (export "memory") 1)
  (func (export "main")))
"#;

const LARGE_MEMORY: &[u8] = br#"
(module
  (memory (export "memory") 4)
  (func (export "_start")))
"#;

#[fixture]
fn not_cancelled() -> AtomicBool {
    AtomicBool::new(false)
}

fn run_captured(module: &[u8], profile: SandboxProfile) -> Result<crate::SandboxOutcome, SandboxError> {
    let flag = AtomicBool::new(false);
    Sandbox::new(profile.capture_output(Vec::new())).run(module, &flag)
}

#[rstest]
#[case::normal_return(RETURNS_NORMALLY, 0)]
#[case::proc_exit(EXITS_SEVEN, 7)]
fn reports_guest_exit_code(#[case] module: &[u8], #[case] expected: i32) {
    let outcome = run_captured(module, SandboxProfile::new("guest")).expect("run guest");
    assert_eq!(outcome.exit_code(), expected);
}

#[test]
fn captures_stdout_in_memory() {
    let outcome = run_captured(WRITES_HELLO, SandboxProfile::new("guest")).expect("run guest");
    assert_eq!(outcome.stdout(), b"hello\n");
    assert!(outcome.stderr().is_empty());
}

#[test]
fn argv_includes_program_name() {
    let profile = SandboxProfile::new("guest").args(["one", "two"]);
    let outcome = run_captured(EXITS_WITH_ARGC, profile).expect("run guest");
    assert_eq!(outcome.exit_code(), 3);
}

#[rstest]
#[case::isolated(SandboxProfile::new("guest"), 0)]
#[case::two_vars(SandboxProfile::new("guest").env("A", "1").env("B", "2"), 2)]
#[case::replaced(SandboxProfile::new("guest").env("A", "1").env("A", "2"), 1)]
fn guest_sees_only_profile_environment(#[case] profile: SandboxProfile, #[case] expected: i32) {
    let outcome = run_captured(EXITS_WITH_ENV_COUNT, profile).expect("run guest");
    assert_eq!(outcome.exit_code(), expected);
}

#[rstest]
fn trap_is_reported_as_error(not_cancelled: AtomicBool) {
    let sandbox = Sandbox::new(SandboxProfile::new("guest").capture_output(Vec::new()));
    let err = sandbox.run(TRAPS, &not_cancelled).expect_err("trap");
    assert!(matches!(err, SandboxError::Trap { .. }), "unexpected error: {err}");
}

#[rstest]
fn invalid_module_is_rejected(not_cancelled: AtomicBool) {
    let sandbox = Sandbox::new(SandboxProfile::new("guest"));
    let err = sandbox.run(b"\0asm not really", &not_cancelled).expect_err("invalid");
    assert!(matches!(err, SandboxError::Compile { .. }), "unexpected error: {err}");
}

#[rstest]
fn missing_start_is_rejected(not_cancelled: AtomicBool) {
    let sandbox = Sandbox::new(SandboxProfile::new("guest"));
    let err = sandbox.run(NO_ENTRY_POINT, &not_cancelled).expect_err("no _start");
    assert!(matches!(err, SandboxError::MissingEntryPoint));
}

#[rstest]
fn memory_cap_blocks_instantiation(not_cancelled: AtomicBool) {
    let profile = SandboxProfile::new("guest").max_memory_bytes(64 * 1024);
    let err = Sandbox::new(profile)
        .run(LARGE_MEMORY, &not_cancelled)
        .expect_err("memory cap");
    assert!(matches!(err, SandboxError::Instantiate { .. }), "unexpected error: {err}");
}

#[test]
fn pre_cancelled_run_does_not_start() {
    let flag = AtomicBool::new(true);
    let err = Sandbox::new(SandboxProfile::new("guest"))
        .run(RETURNS_NORMALLY, &flag)
        .expect_err("cancelled");
    assert!(matches!(err, SandboxError::Cancelled));
}

#[test]
fn cancellation_interrupts_running_guest() {
    let flag = Arc::new(AtomicBool::new(false));
    let trigger = Arc::clone(&flag);
    let canceller = thread::spawn(move || {
        thread::sleep(Duration::from_millis(100));
        trigger.store(true, Ordering::Release);
    });

    let err = Sandbox::new(SandboxProfile::new("guest"))
        .run(SPINS_FOREVER, &flag)
        .expect_err("interrupted");
    canceller.join().expect("join canceller");
    assert!(matches!(err, SandboxError::Cancelled), "unexpected error: {err}");
}

#[test]
fn profile_env_keeps_latest_value() {
    let profile = SandboxProfile::new("guest").env("KEY", "old").env("KEY", "new");
    assert_eq!(profile.environment(), [("KEY".to_owned(), "new".to_owned())]);
}
