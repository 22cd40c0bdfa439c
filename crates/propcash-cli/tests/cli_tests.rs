//! Command-line behaviour against a fresh store.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn propcash(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("propcash").unwrap();
    cmd.current_dir(dir.path())
        .env_remove("PROPCASH_CONFIG")
        .env("RUST_LOG", "error")
        .arg("--storage")
        .arg(dir.path().join("store.redb"));
    cmd
}

#[test]
fn test_versions_of_empty_table() {
    let dir = TempDir::new().unwrap();
    propcash(&dir)
        .args(["versions", "ChargeTypeMapping"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No results."));
}

#[test]
fn test_unknown_table_is_rejected() {
    let dir = TempDir::new().unwrap();
    propcash(&dir)
        .args(["versions", "Ledger"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown table"));
}

#[test]
fn test_malformed_as_at_date() {
    let dir = TempDir::new().unwrap();
    propcash(&dir)
        .args(["run", "30/06/2025"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("malformed as-at date"));
}

#[test]
fn test_run_without_ledger() {
    let dir = TempDir::new().unwrap();
    propcash(&dir)
        .args(["run", "2025-06-30"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no ledger version before 2025-06-30"));
}

#[test]
fn test_dv01_json_for_missing_run() {
    let dir = TempDir::new().unwrap();
    propcash(&dir)
        .args(["--format", "json", "dv01", "2025-06-30"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[]"));
}

#[test]
fn test_missing_config_file() {
    let dir = TempDir::new().unwrap();
    propcash(&dir)
        .args(["--config", "missing.toml", "versions", "ChargeTypeMapping"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Configuration error"));
}
