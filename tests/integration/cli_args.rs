//! CLI argument handling via the compiled binary.

use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;

fn bindrop() -> Command {
    Command::cargo_bin("bindrop").expect("binary")
}

#[test]
fn help_lists_subcommands() {
    bindrop()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("install"))
        .stdout(predicate::str::contains("validate"));
}

#[test]
fn install_requires_host_and_key() {
    bindrop()
        .arg("install")
        .assert()
        .failure()
        .stderr(predicate::str::contains("--host"));
}

#[test]
fn install_rejects_malformed_upload_spec() {
    bindrop()
        .args([
            "install",
            "--host",
            "example.com",
            "--key",
            "/keys/deploy.pem",
            "--upload",
            "dest=/usr/local/bin",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("missing required field 'path'"));
}

#[test]
fn install_reports_missing_manifest() {
    bindrop()
        .args(["install", "--manifest", "/nonexistent/deploy.toml"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("failed to read manifest"));
}

#[test]
fn validate_prints_install_plan() {
    bindrop()
        .args(["validate", "--upload", "path=/tmp/service_Linux_x86_64.tar.gz"])
        .assert()
        .success()
        .stdout(predicate::str::contains("/usr/local/bin/service"))
        .stdout(predicate::str::contains("1 upload(s) OK"));
}

#[test]
fn validate_rejects_naming_violations() {
    bindrop()
        .args(["validate", "--upload", "path=/tmp/_bad.tar.gz"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("unable to derive binary name"));
}

#[test]
fn validate_accepts_a_manifest_file() {
    let mut manifest = tempfile::NamedTempFile::new().expect("tempfile");
    writeln!(
        manifest,
        r#"
backup-dir = "/bak"

[target]
host = "example.com"
key = "/keys/deploy.pem"

[[upload]]
path = "/tmp/service_Linux_x86_64.tar.gz"
bind-low-ports = true
"#
    )
    .expect("write manifest");

    bindrop()
        .args(["validate", "--manifest"])
        .arg(manifest.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("is valid"))
        .stdout(predicate::str::contains("cap_net_bind_service"));
}

#[test]
fn validate_requires_some_input() {
    bindrop()
        .arg("validate")
        .assert()
        .failure()
        .stderr(predicate::str::contains("nothing to validate"));
}
