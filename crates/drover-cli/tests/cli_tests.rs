use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// Helper function to create a temporary directory for CLI tests
fn create_cli_test_environment() -> TempDir {
    TempDir::new().expect("Failed to create temporary directory")
}

/// Helper function to create a Command for the drover binary
fn drover_cmd() -> Command {
    Command::cargo_bin("drover").expect("Failed to find drover binary")
}

/// Writes a settings file and a steps file into the test directory and
/// returns the settings path.
fn write_run_fixture(dir: &Path, prompts: &[&str]) -> std::path::PathBuf {
    let steps_path = dir.join("steps.json");
    let steps: Vec<serde_json::Value> = prompts
        .iter()
        .map(|prompt| serde_json::json!({ "sub_prompt": prompt, "timeout": 0 }))
        .collect();
    fs::write(
        &steps_path,
        serde_json::to_string_pretty(&serde_json::json!({ "steps": steps }))
            .expect("serialize steps"),
    )
    .expect("write steps file");

    let settings_path = dir.join("settings.json");
    let settings = serde_json::json!({
        "execution": {
            "entrypoint_url": "https://example.test/login",
            "steps_file": steps_path,
            "output_dir": dir.join("generated"),
        },
        "ai_agent": {
            "endpoint": "https://api.example.test/v1",
            "cost_input_token": 0.5,
            "cost_output_token": 1.0,
        }
    });
    fs::write(
        &settings_path,
        serde_json::to_string_pretty(&settings).expect("serialize settings"),
    )
    .expect("write settings file");

    settings_path
}

#[test]
fn test_cli_rejects_onlycache_with_nocache() {
    drover_cmd()
        .args(["--strength", "onlycache", "--nocache"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("onlycache"));
}

#[test]
fn test_cli_rejects_unknown_strength() {
    drover_cmd()
        .args(["--strength", "extreme"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid strength level"));
}

#[test]
fn test_cli_reports_missing_settings_file() {
    let temp_dir = create_cli_test_environment();
    drover_cmd()
        .args([
            "--settings",
            temp_dir.path().join("absent.json").to_str().unwrap(),
            "--mock",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load settings"));
}

#[test]
fn test_cli_mock_run_succeeds_end_to_end() {
    let temp_dir = create_cli_test_environment();
    let settings_path = write_run_fixture(temp_dir.path(), &["click login", "fill username"]);

    drover_cmd()
        .args(["--settings", settings_path.to_str().unwrap(), "--mock"])
        .assert()
        .success()
        .stdout(predicate::str::contains("✓ Step 1: click login"))
        .stdout(predicate::str::contains("✓ Step 2: fill username"))
        .stdout(predicate::str::contains("# Steps"))
        .stdout(predicate::str::contains("- click login: ✓ Succeeded"))
        .stdout(predicate::str::contains("# Usage"))
        .stdout(predicate::str::contains("Total tokens: 820"));

    // The run log gains one record.
    let log_raw = fs::read_to_string(temp_dir.path().join("generated/run-log.json"))
        .expect("run log exists");
    let log: serde_json::Value = serde_json::from_str(&log_raw).expect("run log is valid JSON");
    assert_eq!(log.as_array().map(Vec::len), Some(1));

    // The steps file is rewritten with fingerprints filled in.
    let steps_raw =
        fs::read_to_string(temp_dir.path().join("steps.json")).expect("steps file exists");
    let steps: serde_json::Value = serde_json::from_str(&steps_raw).expect("steps file is JSON");
    let first_id = steps["steps"][0]["id"].as_str().expect("id filled in");
    assert_eq!(first_id.len(), 12);

    // Generated code landed in the cache directory.
    let cache_file = temp_dir
        .path()
        .join("generated")
        .join(format!("step-{first_id}.js"));
    let code = fs::read_to_string(cache_file).expect("cache entry exists");
    assert!(code.starts_with("await page.waitForLoadState('networkidle');"));
}

#[test]
fn test_cli_mock_run_reuses_the_cache_on_the_second_invocation() {
    let temp_dir = create_cli_test_environment();
    let settings_path = write_run_fixture(temp_dir.path(), &["click login"]);
    let settings_arg = settings_path.to_str().unwrap().to_string();

    drover_cmd()
        .args(["--settings", &settings_arg, "--mock"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Total tokens: 410"));

    // Second run is served from the cache: zero tokens.
    drover_cmd()
        .args(["--settings", &settings_arg, "--mock"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Total tokens: 0"));

    let log_raw = fs::read_to_string(temp_dir.path().join("generated/run-log.json"))
        .expect("run log exists");
    let log: serde_json::Value = serde_json::from_str(&log_raw).expect("run log is valid JSON");
    assert_eq!(log.as_array().map(Vec::len), Some(2));
}

#[test]
fn test_cli_onlycache_without_cache_entries_exits_nonzero() {
    let temp_dir = create_cli_test_environment();
    let settings_path = write_run_fixture(temp_dir.path(), &["click login"]);

    drover_cmd()
        .args([
            "--settings",
            settings_path.to_str().unwrap(),
            "--mock",
            "--strength",
            "onlycache",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Cache not found (onlycache mode)"));
}

#[test]
fn test_cli_stepspack_resolves_paths_inside_the_pack_directory() {
    let temp_dir = create_cli_test_environment();
    let pack_dir = temp_dir.path().join("stepspacks/checkout");
    fs::create_dir_all(&pack_dir).expect("create pack directory");

    // Pack files carry relative paths; everything must resolve inside the
    // pack directory.
    fs::write(
        pack_dir.join("steps.json"),
        serde_json::to_string_pretty(&serde_json::json!({
            "steps": [{ "sub_prompt": "click checkout", "timeout": 0 }]
        }))
        .expect("serialize steps"),
    )
    .expect("write steps file");
    fs::write(
        pack_dir.join("settings.json"),
        serde_json::to_string_pretty(&serde_json::json!({
            "execution": {
                "entrypoint_url": "https://example.test/cart",
                "steps_file": "steps.json",
            },
            "ai_agent": { "endpoint": "https://api.example.test/v1" }
        }))
        .expect("serialize settings"),
    )
    .expect("write settings file");

    drover_cmd()
        .current_dir(temp_dir.path())
        .args(["--stepspack", "checkout", "--mock"])
        .assert()
        .success()
        .stdout(predicate::str::contains("✓ Step 1: click checkout"));

    assert!(pack_dir.join("generated/run-log.json").exists());

    let steps_raw = fs::read_to_string(pack_dir.join("steps.json")).expect("steps file exists");
    let steps: serde_json::Value = serde_json::from_str(&steps_raw).expect("steps file is JSON");
    assert!(steps["steps"][0]["id"].is_string());
}

#[test]
fn test_cli_stepspack_conflicts_with_explicit_settings() {
    drover_cmd()
        .args(["--stepspack", "checkout", "--settings", "x.json", "--mock"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot be used with"));
}

#[test]
fn test_cli_rejects_unknown_strip_rule() {
    drover_cmd()
        .args(["--strip", "minify"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid reduction rule"));
}
