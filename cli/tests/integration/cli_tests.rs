//! Argument handling, preflight and dry-run behavior of the binary.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use assert_cmd::Command;
use predicates::prelude::*;

fn provision() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("plus-provision"));
    cmd.env("NO_COLOR", "1").env_remove("PLUS_PROVISION_CONFIG");
    cmd
}

/// Operator directory with both artifacts and a config that needs neither
/// sudo nor `/etc/os-release`.
fn workdir() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("nginx-repo.crt"), "cert").unwrap();
    std::fs::write(dir.path().join("nginx-repo.key"), "key").unwrap();
    std::fs::write(
        dir.path().join("config.yaml"),
        format!(
            "use_sudo: false\nstale_config:\n  - {}/sources.list.d/nginx*.list\n",
            dir.path().display()
        ),
    )
    .unwrap();
    dir
}

// --- Usage ---

#[test]
fn test_no_args_prints_usage_and_fails() {
    provision()
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Usage:"));
}

#[test]
fn test_single_arg_prints_usage_and_fails() {
    provision()
        .arg("nginx-repo.crt")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("<KEY>"));
}

#[test]
fn test_help_flag_shows_help() {
    provision()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage:"))
        .stdout(predicate::str::contains("--dry-run"));
}

#[test]
fn test_version_flag_shows_version() {
    provision()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("plus-provision"));
}

// --- Preflight ---

#[test]
fn test_missing_certificate_exits_one_with_message() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("nginx-repo.key"), "key").unwrap();
    provision()
        .current_dir(dir.path())
        .args(["--config", "absent.yaml", "--codename", "noble"])
        .args(["nginx-repo.crt", "nginx-repo.key"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("certificate file not found"))
        .stderr(predicate::str::contains("nginx-repo.crt"));
}

#[test]
fn test_missing_key_dry_run_also_fails() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("nginx-repo.crt"), "cert").unwrap();
    provision()
        .current_dir(dir.path())
        .args(["--config", "absent.yaml", "--codename", "noble", "--dry-run"])
        .args(["nginx-repo.crt", "nginx-repo.key"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("key file not found"));
}

#[test]
fn test_invalid_config_exits_one() {
    let dir = workdir();
    std::fs::write(dir.path().join("bad.yaml"), "step_timeout_secs: 0\n").unwrap();
    provision()
        .current_dir(dir.path())
        .args(["--config", "bad.yaml", "--dry-run", "nginx-repo.crt", "nginx-repo.key"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("invalid configuration"));
}

// --- Dry run ---

#[test]
fn test_no_color_env_with_numeric_value_is_accepted() {
    let dir = workdir();
    provision()
        .current_dir(dir.path())
        .env("NO_COLOR", "1")
        .args(["--config", "config.yaml", "--codename", "noble", "--dry-run"])
        .args(["nginx-repo.crt", "nginx-repo.key"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Provisioning plan:"))
        .stdout(predicate::str::contains("\x1b[").not());
}

#[test]
fn test_no_color_flag_is_accepted() {
    let dir = workdir();
    provision()
        .current_dir(dir.path())
        .env_remove("NO_COLOR")
        .args(["--no-color", "--config", "config.yaml", "--codename", "noble", "--dry-run"])
        .args(["nginx-repo.crt", "nginx-repo.key"])
        .assert()
        .success();
}

#[test]
fn test_dry_run_prints_plan_without_running() {
    let dir = workdir();
    std::fs::create_dir_all(dir.path().join("sources.list.d")).unwrap();
    std::fs::write(dir.path().join("sources.list.d/nginx-old.list"), "stale").unwrap();
    provision()
        .current_dir(dir.path())
        .args(["--config", "config.yaml", "--codename", "noble", "--dry-run"])
        .args(["nginx-repo.crt", "nginx-repo.key"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Provisioning plan:"))
        .stdout(predicate::str::contains("verify signing key 'nginx'"))
        .stdout(predicate::str::contains("573BFD6B3D8FBC641079A6ABABF5BD827BD9BF62"))
        .stdout(predicate::str::contains("nginx-old.list"))
        .stdout(predicate::str::contains("apt-get install -y app-protect-module-plus"));

    // Planning is read-only.
    assert!(dir.path().join("sources.list.d/nginx-old.list").exists());
}

#[test]
fn test_dry_run_json_is_parseable() {
    let dir = workdir();
    let output = provision()
        .current_dir(dir.path())
        .args(["--config", "config.yaml", "--codename", "jammy", "--dry-run", "--json"])
        .args(["nginx-repo.crt", "nginx-repo.key", "--with-companion"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let plan: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let steps = plan.as_array().unwrap();
    assert_eq!(steps[0]["name"], "create trust directory");
    assert!(
        steps
            .iter()
            .any(|s| s["command"].as_str().unwrap().contains("jammy")),
        "repository lines use the given codename"
    );
    assert!(
        steps
            .iter()
            .any(|s| s["command"].as_str().unwrap().starts_with("docker compose")),
        "companion steps are planned"
    );
}
