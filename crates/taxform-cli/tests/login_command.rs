use assert_cmd::Command;
use predicates::prelude::*;
use std::path::PathBuf;

#[allow(deprecated)]
fn get_taxform_bin() -> PathBuf {
    assert_cmd::cargo::cargo_bin("taxform")
}

#[test]
fn test_login_help() {
    let mut cmd = Command::new(get_taxform_bin());
    cmd.arg("login").arg("--help");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("--tin"))
        .stdout(predicate::str::contains("--pin"))
        .stdout(predicate::str::contains("--profile"))
        .stdout(predicate::str::contains("--chrome-path"))
        .stdout(predicate::str::contains("--temp").not());
}

#[test]
fn test_login_rejects_temporary_profile() {
    // Chrome outlives `login`, so its profile has to as well
    let mut cmd = Command::new(get_taxform_bin());
    cmd.arg("login").arg("--temp").arg("--no-pause");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("unexpected argument '--temp'"));
}

#[test]
fn test_quick_start_help_offers_temporary_profile() {
    let mut cmd = Command::new(get_taxform_bin());
    cmd.arg("quick-start").arg("--help");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("--temp"))
        .stdout(predicate::str::contains("Chrome is closed"));
}

#[test]
fn test_login_with_missing_chrome() {
    let mut cmd = Command::new(get_taxform_bin());
    cmd.arg("login")
        .arg("--chrome-path")
        .arg("/nonexistent/chrome")
        .arg("--no-pause");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Chrome not found"));
}

#[test]
fn test_profile_and_temp_conflict() {
    let mut cmd = Command::new(get_taxform_bin());
    cmd.arg("quick-start")
        .arg("--profile")
        .arg("/tmp/taxform-profile")
        .arg("--temp");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("cannot be used with"));
}

#[test]
fn test_quick_start_with_missing_chrome() {
    let mut cmd = Command::new(get_taxform_bin());
    cmd.arg("quick-start")
        .arg("--chrome-path")
        .arg("/nonexistent/chrome")
        .arg("--no-pause");

    cmd.assert()
        .failure()
        .stdout(predicate::str::contains("quick start"))
        .stderr(predicate::str::contains("Chrome not found"));
}

#[test]
fn test_logout_help() {
    let mut cmd = Command::new(get_taxform_bin());
    cmd.arg("logout").arg("--help");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Log out of the portal"));
}

#[test]
fn test_logout_without_chrome() {
    let mut cmd = Command::new(get_taxform_bin());
    cmd.arg("logout").arg("--port").arg("1").arg("--no-pause");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Failed to connect to Chrome on port 1"));
}
