//! End-to-end CLI tests
//!
//! Drives the built binary against a temp data directory via the
//! CADENCE_DATA_DIR override.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn cadence(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("cadence").unwrap();
    cmd.env("CADENCE_DATA_DIR", dir.path());
    cmd
}

#[test]
fn init_creates_documents() {
    let dir = TempDir::new().unwrap();

    cadence(&dir)
        .args(["init"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Initialized"));

    assert!(dir.path().join("config.yaml").exists());
    assert!(dir.path().join("profile.yaml").exists());
    assert!(dir.path().join("audits").exists());
}

#[test]
fn config_set_and_show() {
    let dir = TempDir::new().unwrap();
    cadence(&dir).args(["init"]).assert().success();

    cadence(&dir)
        .args(["config", "set", "payroll.net_pay", "1500"])
        .assert()
        .success();

    cadence(&dir)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("150000"));
}

#[test]
fn config_set_unknown_key_fails() {
    let dir = TempDir::new().unwrap();
    cadence(&dir).args(["init"]).assert().success();

    cadence(&dir)
        .args(["config", "set", "payroll.bogus", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown configuration key"));
}

#[test]
fn adjust_dry_run_then_apply_then_revert() {
    let dir = TempDir::new().unwrap();
    cadence(&dir).args(["init"]).assert().success();
    cadence(&dir)
        .args(["config", "set", "recurring.weekly.EarnIn", "600"])
        .assert()
        .success();

    // Dry run shows the diff but does not apply
    cadence(&dir)
        .args(["adjust", "Lower EarnIn to 300"])
        .assert()
        .success()
        .stdout(predicate::str::contains("$600.00 -> $300.00"))
        .stdout(predicate::str::contains("--yes"));

    cadence(&dir)
        .args(["config", "show"])
        .assert()
        .stdout(predicate::str::contains("60000"));

    // Confirmed apply mutates the document and writes an audit record
    let assert = cadence(&dir)
        .args(["adjust", "Lower EarnIn to 300", "--yes"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Audit id: adj-"));

    let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    let audit_id = stdout
        .lines()
        .find_map(|l| l.strip_prefix("Applied. Audit id: "))
        .unwrap()
        .trim()
        .to_string();

    cadence(&dir)
        .args(["config", "show"])
        .assert()
        .stdout(predicate::str::contains("30000"));

    cadence(&dir)
        .args(["audits"])
        .assert()
        .success()
        .stdout(predicate::str::contains(audit_id.as_str()));

    // Revert restores the amount and appends a REVERT record
    cadence(&dir)
        .args(["revert", &audit_id])
        .assert()
        .success()
        .stdout(predicate::str::contains("REVERT-"));

    cadence(&dir)
        .args(["config", "show"])
        .assert()
        .stdout(predicate::str::contains("60000"));
}

#[test]
fn payoff_against_missing_debt_is_unsafe() {
    let dir = TempDir::new().unwrap();
    cadence(&dir).args(["init"]).assert().success();

    cadence(&dir)
        .args(["adjust", "I paid off my Slate credit card", "--yes"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Not safe to apply"));
}

#[test]
fn payoff_closes_debt_from_profile() {
    let dir = TempDir::new().unwrap();
    cadence(&dir).args(["init"]).assert().success();

    // Debts live in the human-editable profile document
    std::fs::write(
        dir.path().join("profile.yaml"),
        "debts:\n- name: Chase Slate\n  balance: 240000\n  closed: false\n",
    )
    .unwrap();

    cadence(&dir)
        .args(["adjust", "I paid off my Slate credit card", "--yes"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Chase Slate"))
        .stdout(predicate::str::contains("Audit id:"));

    let profile = std::fs::read_to_string(dir.path().join("profile.yaml")).unwrap();
    assert!(profile.contains("closed: true"));
    assert!(profile.contains("balance: 0"));
}

#[test]
fn forecast_runs_with_configured_payroll() {
    let dir = TempDir::new().unwrap();
    cadence(&dir).args(["init"]).assert().success();
    cadence(&dir)
        .args(["config", "set", "payroll.net_pay", "600"])
        .assert()
        .success();

    cadence(&dir)
        .args(["forecast", "--bank", "1000"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Payday"));
}

#[test]
fn event_add_and_loops_summary() {
    let dir = TempDir::new().unwrap();
    cadence(&dir).args(["init"]).assert().success();

    cadence(&dir)
        .args([
            "event", "add", "2025-06-02", "advance", "-300.00", "--provider", "EarnIn",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Recorded advance"));

    // No loops configured yet
    cadence(&dir)
        .args(["loops"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No loops configured"));
}

#[test]
fn unknown_instruction_is_reported_not_crashed() {
    let dir = TempDir::new().unwrap();
    cadence(&dir).args(["init"]).assert().success();

    cadence(&dir)
        .args(["adjust", "make me rich"])
        .assert()
        .success()
        .stdout(predicate::str::contains("not understood"));
}
