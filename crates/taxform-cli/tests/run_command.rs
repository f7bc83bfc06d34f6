use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;
use std::path::PathBuf;

#[allow(deprecated)]
fn get_taxform_bin() -> PathBuf {
    assert_cmd::cargo::cargo_bin("taxform")
}

#[test]
fn test_run_without_chrome_fails_to_connect() {
    // Nothing listens on port 1
    let mut cmd = Command::new(get_taxform_bin());
    cmd.arg("run").arg("--port").arg("1").arg("--no-pause");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Failed to connect to Chrome"))
        .stderr(predicate::str::contains("taxform login"));
}

#[test]
fn test_port_from_environment() {
    let mut cmd = Command::new(get_taxform_bin());
    cmd.env("TAXFORM_DEBUG_PORT", "1").arg("validate").arg("--no-pause");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("port 1"));
}

#[test]
fn test_missing_data_file() {
    let mut cmd = Command::new(get_taxform_bin());
    cmd.arg("run")
        .arg("--data")
        .arg("/nonexistent/form.json")
        .arg("--no-pause");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Could not load form data"));
}

#[test]
fn test_data_file_with_unknown_section() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, r#"{{ "schedule_z": {{ "101": "Trading" }} }}"#).unwrap();

    let mut cmd = Command::new(get_taxform_bin());
    cmd.arg("run").arg("--data").arg(file.path()).arg("--no-pause");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("unknown section 'schedule_z'"));
}

#[test]
fn test_malformed_data_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "not json").unwrap();

    let mut cmd = Command::new(get_taxform_bin());
    cmd.arg("reset").arg("--data").arg(file.path()).arg("--no-pause");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Could not load form data"));
}
