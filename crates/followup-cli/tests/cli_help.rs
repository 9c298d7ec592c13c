use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;

#[test]
fn test_help_shows_all_commands() {
    cargo_bin_cmd!("followup")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("prompt"))
        .stdout(predicate::str::contains("ask"))
        .stdout(predicate::str::contains("serve"));
}

#[test]
fn test_ask_help_shows_options() {
    cargo_bin_cmd!("followup")
        .args(["ask", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--option"))
        .stdout(predicate::str::contains("timeout-minutes"))
        .stdout(predicate::str::contains("close-terminal"));
}

#[test]
fn test_version_flag() {
    cargo_bin_cmd!("followup")
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("0.1"));
}

#[test]
fn test_prompt_requires_output_and_payload() {
    cargo_bin_cmd!("followup")
        .arg("prompt")
        .assert()
        .failure()
        .stderr(predicate::str::contains("--output"));
}
