//! CLI interface tests
//!
//! Runs the assetpipe binary against fixture projects

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;

mod common;
use common::fixtures;

/// Helper to get the assetpipe binary command
fn get_bin() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_assetpipe"));
    cmd.arg("--no-emoji");
    cmd
}

#[test]
fn test_cli_help_flag_displays_usage_information() {
    get_bin()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Declarative static-asset build pipeline"));
}

#[test]
fn test_cli_version_flag_displays_version_number() {
    get_bin()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_build_prints_summary_and_writes_bundles() {
    let project = fixtures::web_project().unwrap();

    get_bin()
        .arg("build")
        .current_dir(project.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Build complete!"))
        .stdout(predicate::str::contains("dist/app.bundle.js"));

    assert!(project.path().join("dist/admin.bundle.js").is_file());
}

#[test]
fn test_build_json_output_is_parseable() {
    let project = fixtures::web_project().unwrap();

    let output = get_bin()
        .args(["build", "--json"])
        .current_dir(project.path())
        .output()
        .unwrap();
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let bundles = report["bundles"].as_array().unwrap();
    assert_eq!(bundles.len(), 2);
    assert_eq!(bundles[0]["name"], "app");
    assert_eq!(bundles[0]["modules"], 5);
}

#[test]
fn test_dry_run_writes_nothing() {
    let project = fixtures::web_project().unwrap();

    get_bin()
        .args(["build", "--dry-run"])
        .current_dir(project.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("[DRY RUN]"))
        .stdout(predicate::str::contains("dist/index.html"));

    assert!(!project.path().join("dist").exists());
}

#[test]
fn test_build_with_explicit_descriptor_uses_its_directory() {
    let project = fixtures::web_project().unwrap();
    let web = project.path().join("web");
    fs::create_dir_all(&web).unwrap();
    fs::rename(project.path().join("src"), web.join("src")).unwrap();
    fs::rename(
        project.path().join("assetpipe.toml"),
        web.join("build.toml"),
    )
    .unwrap();

    get_bin()
        .args(["build", "--config", "web/build.toml"])
        .current_dir(project.path())
        .assert()
        .success();

    assert!(web.join("dist/app.bundle.js").is_file());
}

#[test]
fn test_missing_descriptor_exits_with_noinput() {
    let temp = tempfile::TempDir::new().unwrap();

    get_bin()
        .arg("build")
        .current_dir(temp.path())
        .assert()
        .code(66)
        .stderr(predicate::str::contains("assetpipe init"));
}

#[test]
fn test_invalid_descriptor_exits_with_config_error() {
    let project = fixtures::web_project().unwrap();
    fixtures::write_file(
        project.path(),
        "assetpipe.toml",
        "[entry]\napp = \"src/nope.js\"\n",
    )
    .unwrap();

    get_bin()
        .arg("build")
        .current_dir(project.path())
        .assert()
        .code(78)
        .stderr(predicate::str::contains("entry"));
}

#[test]
fn test_check_reports_valid_descriptor() {
    let project = fixtures::web_project().unwrap();

    get_bin()
        .arg("check")
        .current_dir(project.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Descriptor is valid"));
}

#[test]
fn test_init_writes_minimal_preset_that_builds() {
    let temp = tempfile::TempDir::new().unwrap();

    get_bin()
        .args(["init", "--preset", "minimal"])
        .current_dir(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Created assetpipe.toml"));

    fixtures::write_file(temp.path(), "src/index.js", "module.exports = 1;\n").unwrap();
    get_bin()
        .arg("build")
        .current_dir(temp.path())
        .assert()
        .success();
    assert!(temp.path().join("dist/main.bundle.js").is_file());
}

#[test]
fn test_init_rejects_unknown_preset() {
    let temp = tempfile::TempDir::new().unwrap();

    get_bin()
        .args(["init", "--preset", "turbo"])
        .current_dir(temp.path())
        .assert()
        .code(64)
        .stderr(predicate::str::contains("production"));
    assert!(!temp.path().join("assetpipe.toml").exists());
}

#[test]
fn test_init_leaves_existing_descriptor_untouched() {
    let project = fixtures::web_project().unwrap();

    get_bin()
        .arg("init")
        .current_dir(project.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"));

    let text = fs::read_to_string(project.path().join("assetpipe.toml")).unwrap();
    assert_eq!(text, fixtures::WEB_DESCRIPTOR);
}

#[test]
fn test_completions_generate_bash_script() {
    get_bin()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("assetpipe"));
}
