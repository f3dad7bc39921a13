//! End-to-end smoke tests for the binary's startup failure modes.

use assert_cmd::Command;
use predicates::str::contains;

#[test]
fn help_prints_usage() {
    Command::cargo_bin("clipview")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(contains("--store-addr"))
        .stdout(contains("--pid"));
}

#[test]
fn unreachable_store_is_a_fatal_startup_error() {
    let dir = tempfile::tempdir().unwrap();
    Command::cargo_bin("clipview")
        .unwrap()
        // missing settings file is fine; an unreachable store is not
        .args(["--config", dir.path().join("settings.toml").to_str().unwrap()])
        .args(["--store-addr", "127.0.0.1:1"])
        .assert()
        .failure()
        .stderr(contains("cannot reach record store at 127.0.0.1:1"));
}

#[test]
fn malformed_settings_file_is_a_fatal_startup_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("settings.toml");
    std::fs::write(&path, "[manager\npage_size = ten").unwrap();

    Command::cargo_bin("clipview")
        .unwrap()
        .args(["--config", path.to_str().unwrap()])
        .args(["--store-addr", "127.0.0.1:1"])
        .assert()
        .failure()
        .stderr(contains("invalid settings file"));
}
