use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// `sinrun` with its config directory pointed at `home`.
fn sinrun(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("sinrun").unwrap();
    cmd.env("HOME", home)
        .env("XDG_CONFIG_HOME", home.join(".config"))
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn help_mentions_sine() {
    let home = TempDir::new().unwrap();
    sinrun(home.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("sin(x)"));
}

#[test]
fn missing_model_directory_exits_with_1() {
    let home = TempDir::new().unwrap();
    let missing = home.path().join("sin_model_capi");

    sinrun(home.path())
        .args(["run", "--model-dir"])
        .arg(&missing)
        .assert()
        .code(1)
        .stdout(predicate::str::contains("failed to load model"));
}

#[test]
fn default_invocation_looks_for_sin_model_capi() {
    let home = TempDir::new().unwrap();

    sinrun(home.path())
        .current_dir(home.path())
        .assert()
        .code(1)
        .stdout(predicate::str::contains("sin_model_capi"));
}

#[test]
fn unrecognised_bundle_exits_with_1() {
    let home = TempDir::new().unwrap();
    let bundle = home.path().join("bundle");
    std::fs::create_dir_all(&bundle).unwrap();

    sinrun(home.path())
        .args(["run", "--model-dir"])
        .arg(&bundle)
        .assert()
        .code(1)
        .stdout(predicate::str::contains("unsupported model format"));
}

#[test]
fn ops_on_missing_model_exits_with_1() {
    let home = TempDir::new().unwrap();

    sinrun(home.path())
        .args(["ops", "--model-dir"])
        .arg(home.path().join("nope"))
        .assert()
        .code(1);
}

#[test]
fn mismatched_config_is_rejected_before_loading() {
    let home = TempDir::new().unwrap();
    let config = home.path().join("config.json");
    std::fs::write(&config, r#"{ "input": { "values": [0.1, 0.2], "shape": [3, 1] } }"#).unwrap();

    sinrun(home.path())
        .arg("-c")
        .arg(&config)
        .arg("run")
        .assert()
        .code(1)
        .stdout(predicate::str::contains("configuration error"));
}

#[test]
fn config_init_writes_defaults_once() {
    let home = TempDir::new().unwrap();
    let output = home.path().join("sinrun.json");

    sinrun(home.path())
        .args(["config", "init", "--output"])
        .arg(&output)
        .assert()
        .success();

    let written = std::fs::read_to_string(&output).unwrap();
    assert!(written.contains("serving_default_x"));
    assert!(written.contains("StatefulPartitionedCall"));

    sinrun(home.path())
        .args(["config", "init", "--output"])
        .arg(&output)
        .assert()
        .code(1)
        .stdout(predicate::str::contains("--force"));

    sinrun(home.path())
        .args(["config", "init", "--force", "--output"])
        .arg(&output)
        .assert()
        .success();
}

#[test]
fn config_path_reports_missing_file() {
    let home = TempDir::new().unwrap();

    sinrun(home.path())
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("not created"));
}

#[test]
fn config_show_follows_config_flag() {
    let home = TempDir::new().unwrap();
    let config = home.path().join("gpu.json");
    std::fs::write(&config, r#"{ "model": { "export_dir": "./sin_gpu", "tag": "gpu" } }"#).unwrap();

    sinrun(home.path())
        .arg("-c")
        .arg(&config)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""tag": "gpu""#))
        .stdout(predicate::str::contains("sin_gpu"))
        .stdout(predicate::str::contains("No config file found").not());
}

#[test]
fn config_show_without_file_prints_defaults() {
    let home = TempDir::new().unwrap();

    sinrun(home.path())
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No config file found"))
        .stdout(predicate::str::contains(r#""tag": "serve""#));
}

#[test]
fn rust_log_enables_debug_output() {
    let home = TempDir::new().unwrap();
    let config = home.path().join("sinrun.json");
    std::fs::write(&config, "{}").unwrap();

    sinrun(home.path())
        .arg("-c")
        .arg(&config)
        .args(["config", "show"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Loading config from").not());

    sinrun(home.path())
        .env("RUST_LOG", "debug")
        .arg("-c")
        .arg(&config)
        .args(["config", "show"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Loading config from"));
}
