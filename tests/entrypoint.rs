//! End-to-end checks of the compiled entrypoint binary.

use std::fs;
use std::path::Path;
use std::process::Command;
use tempfile::tempdir;

fn entrypoint() -> Command {
    Command::new(env!("CARGO_BIN_EXE_entrypoint"))
}

fn write_unit(root: &Path, name: &str, body: &str) {
    let dir = root.join(name);
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("startup"), format!("#!/bin/sh\n{}\n", body)).unwrap();
}

#[test]
fn test_no_arguments_exits_zero_immediately() {
    let output = entrypoint().output().unwrap();
    assert_eq!(output.status.code(), Some(0));
}

#[test]
fn test_unknown_command_prints_error_to_stderr() {
    let root = tempdir().unwrap();
    write_unit(root.path(), "10-initial.startup", "exit 127");

    let output = entrypoint()
        .env("STARTUP_DIR", root.path())
        .arg("no-such-command-for-sure-42")
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(127));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("Unknown command (no-such-command-for-sure-42)"),
        "stderr was: {:?}",
        stderr
    );
}

#[test]
fn test_unit_failure_code_reaches_the_container_runtime() {
    let root = tempdir().unwrap();
    write_unit(root.path(), "10-initial.startup", "exit 0");
    write_unit(root.path(), "20-network.startup", "exit 3");

    let output = entrypoint()
        .env("STARTUP_DIR", root.path())
        .arg("run")
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(3));
}

#[test]
fn test_run_mode_attempts_handoff_after_successful_startup() {
    let root = tempdir().unwrap();
    write_unit(root.path(), "10-initial.startup", "exit 0");

    // The configured app does not exist, so the hand-off fails with 127
    // after the startup sequence succeeded.
    let output = entrypoint()
        .env("STARTUP_DIR", root.path())
        .env("DOCKER_APP", root.path().join("missing-app"))
        .arg("run")
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(127));
}
