use std::fs;
use std::path::PathBuf;

use assert_cmd::cargo::cargo_bin_cmd;
use serde_json::Value;
use tempfile::TempDir;

const PAYLOAD: &str = r#"{"question":"Proceed?","options":["Yes","No"]}"#;

fn write_payload(dir: &TempDir, contents: &str) -> PathBuf {
    let path = dir.path().join("payload.json");
    fs::write(&path, contents).unwrap();
    path
}

fn read_artifact(dir: &TempDir) -> Value {
    let text = fs::read_to_string(dir.path().join("answer.json")).unwrap();
    serde_json::from_str(&text).unwrap()
}

#[test]
fn test_prompt_without_terminal_records_error() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("answer.json");
    let payload = write_payload(&dir, PAYLOAD);

    cargo_bin_cmd!("followup")
        .env("TMPDIR", dir.path())
        .arg("prompt")
        .arg("--payload-file")
        .arg(&payload)
        .arg("--output")
        .arg(&output)
        .assert()
        .success();

    let artifact = read_artifact(&dir);
    assert!(artifact.get("error").is_some());
    assert!(artifact.get("result").is_none());
}

#[test]
fn test_prompt_with_invalid_payload_records_error() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("answer.json");
    let payload = write_payload(&dir, "not json!");

    cargo_bin_cmd!("followup")
        .env("TMPDIR", dir.path())
        .arg("prompt")
        .arg("--payload-file")
        .arg(&payload)
        .arg("--output")
        .arg(&output)
        .assert()
        .success();

    assert!(read_artifact(&dir)["error"].is_string());
}

#[cfg(target_os = "linux")]
#[test]
fn test_ask_without_display_reports_launch_failure() {
    let dir = TempDir::new().unwrap();

    let assert = cargo_bin_cmd!("followup")
        .env_clear()
        .env("TMPDIR", dir.path())
        .args(["ask", "Continue?", "-o", "Yes", "-o", "No"])
        .assert()
        .code(1);

    let value: Value = serde_json::from_slice(&assert.get_output().stdout).unwrap();
    assert_eq!(value["status"], "error");
    assert!(value["fallback_message"].is_string());
}
