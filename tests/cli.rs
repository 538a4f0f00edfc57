//! Binary surface checks

use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn test_help_lists_flags() {
    Command::cargo_bin("posto")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--data-dir"))
        .stdout(predicate::str::contains("--port"));
}

#[test]
fn test_version_matches_package() {
    Command::cargo_bin("posto")
        .unwrap()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_unknown_flag_fails() {
    Command::cargo_bin("posto")
        .unwrap()
        .arg("--definitely-not-a-flag")
        .assert()
        .failure();
}
