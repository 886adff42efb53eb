use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// Helper function to create a Command bound to a temporary database
fn onboard_cmd(temp_dir: &TempDir) -> Command {
    onboard_cmd_for(temp_dir, "alice")
}

fn onboard_cmd_for(temp_dir: &TempDir, principal: &str) -> Command {
    let db_path = temp_dir.path().join("cli_test.db");
    let mut cmd = Command::cargo_bin("onboard").expect("Failed to find onboard binary");
    cmd.arg("--no-color")
        .arg("--database-file")
        .arg(db_path)
        .args(["--principal", principal]);
    cmd
}

#[test]
fn test_cli_status_for_new_principal() {
    let temp_dir = TempDir::new().expect("Failed to create temporary directory");

    onboard_cmd(&temp_dir)
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("# Onboarding: Not started"))
        .stdout(predicate::str::contains("Next: start -> /onboarding/business-info"));
}

#[test]
fn test_cli_default_command_is_status() {
    let temp_dir = TempDir::new().expect("Failed to create temporary directory");

    onboard_cmd(&temp_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("Not started"));
}

#[test]
fn test_cli_business_info_requires_fields() {
    let temp_dir = TempDir::new().expect("Failed to create temporary directory");

    onboard_cmd(&temp_dir)
        .args(["business-info", "--name", "Acme"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("Missing required fields: businessType"))
        .stderr(predicate::str::contains("invalid_data"));

    onboard_cmd(&temp_dir)
        .arg("next")
        .assert()
        .success()
        .stdout(predicate::str::contains("Next: start"));
}

#[test]
fn test_cli_paid_flow() {
    let temp_dir = TempDir::new().expect("Failed to create temporary directory");

    onboard_cmd(&temp_dir)
        .args(["business-info", "--name", "Acme", "--type", "LLC", "--field", "employees=12"])
        .assert()
        .success()
        .stdout(predicate::str::contains("subscription_selection"));

    onboard_cmd(&temp_dir)
        .args(["plan", "professional", "--cycle", "monthly"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Next: complete_payment -> /onboarding/payment"));

    onboard_cmd(&temp_dir)
        .arg("pay")
        .assert()
        .success()
        .stdout(predicate::str::contains("Next: wait"));

    onboard_cmd(&temp_dir)
        .args(["fail-payment", "card_declined"])
        .assert()
        .success()
        .stdout(predicate::str::contains("payment_pending"));

    onboard_cmd(&temp_dir)
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("card_declined"))
        .stdout(predicate::str::contains("- Plan: professional (monthly)"));

    onboard_cmd(&temp_dir).arg("pay").assert().success();

    onboard_cmd(&temp_dir)
        .args(["confirm-payment", "--payment-id", "pay_1", "--subscription-id", "sub_1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Next: access_dashboard -> /dashboard"));

    onboard_cmd(&temp_dir)
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("business_info, subscription, payment"));
}

#[test]
fn test_cli_free_plan_completes_immediately() {
    let temp_dir = TempDir::new().expect("Failed to create temporary directory");

    onboard_cmd(&temp_dir)
        .args(["business-info", "--name", "Acme", "--type", "LLC"])
        .assert()
        .success();

    onboard_cmd(&temp_dir)
        .args(["plan", "free"])
        .assert()
        .success()
        .stdout(predicate::str::contains("completed"));

    onboard_cmd(&temp_dir)
        .arg("restart")
        .assert()
        .failure()
        .stderr(predicate::str::contains("access_denied"));
}

#[test]
fn test_cli_payment_failure_outside_processing_is_ignored() {
    let temp_dir = TempDir::new().expect("Failed to create temporary directory");

    onboard_cmd(&temp_dir)
        .args(["fail-payment", "late"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No payment in progress"));
}

#[test]
fn test_cli_error_restart_and_reset() {
    let temp_dir = TempDir::new().expect("Failed to create temporary directory");

    onboard_cmd(&temp_dir)
        .args(["business-info", "--name", "Acme", "--type", "LLC"])
        .assert()
        .success();

    onboard_cmd(&temp_dir)
        .args(["fail", "provisioning failed"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Next: retry"));

    onboard_cmd(&temp_dir)
        .arg("restart")
        .assert()
        .success()
        .stdout(predicate::str::contains("business_info"));

    onboard_cmd(&temp_dir)
        .arg("reset")
        .assert()
        .success()
        .stdout(predicate::str::contains("Progress for 'alice' deleted"));

    onboard_cmd(&temp_dir)
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("Not started"));
}

#[test]
fn test_cli_principals_do_not_share_progress() {
    let temp_dir = TempDir::new().expect("Failed to create temporary directory");

    onboard_cmd(&temp_dir)
        .args(["business-info", "--name", "Acme", "--type", "LLC"])
        .assert()
        .success();

    onboard_cmd_for(&temp_dir, "bob")
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("Not started"));
}

#[test]
fn test_cli_check_reports_reachable_steps() {
    let temp_dir = TempDir::new().expect("Failed to create temporary directory");

    onboard_cmd(&temp_dir)
        .args(["check", "business-info"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Business information (business_info) can be entered"));

    onboard_cmd(&temp_dir)
        .args(["check", "payment_pending"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("Cannot go from not_started to payment_pending"))
        .stderr(predicate::str::contains("access_denied"));

    onboard_cmd(&temp_dir)
        .args(["check", "billing"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid_step"));
}
