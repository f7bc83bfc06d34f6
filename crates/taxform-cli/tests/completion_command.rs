use assert_cmd::Command;
use predicates::prelude::*;
use std::path::PathBuf;

#[allow(deprecated)]
fn get_taxform_bin() -> PathBuf {
    assert_cmd::cargo::cargo_bin("taxform")
}

#[test]
fn test_completion_command_help() {
    let mut cmd = Command::new(get_taxform_bin());
    cmd.arg("completion").arg("--help");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Generate shell completion scripts"))
        .stdout(predicate::str::contains("SUPPORTED SHELLS"))
        .stdout(predicate::str::contains("INSTALLATION"));
}

#[test]
fn test_bash_completion() {
    let mut cmd = Command::new(get_taxform_bin());
    cmd.arg("completion").arg("--shell").arg("bash");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("_taxform"))
        .stdout(predicate::str::contains("quick-start"));
}

#[test]
fn test_zsh_completion() {
    let mut cmd = Command::new(get_taxform_bin());
    cmd.arg("completion").arg("--shell").arg("zsh");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("#compdef taxform"));
}

#[test]
fn test_invalid_shell() {
    let mut cmd = Command::new(get_taxform_bin());
    cmd.arg("completion").arg("--shell").arg("tcsh");

    cmd.assert().failure();
}
