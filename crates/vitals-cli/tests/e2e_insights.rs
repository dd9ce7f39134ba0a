//! E2E tests for the insight control surface: palette, mute, mutes and
//! completions.

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::{Value, json};
use std::path::Path;
use tempfile::TempDir;

/// Build a Command targeting the vitals binary, rooted in `dir`.
fn vitals_cmd(dir: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("vitals"));
    cmd.current_dir(dir);
    cmd.env("VITALS_LOG", "error");
    cmd.env_remove("FORMAT");
    cmd
}

fn json_stdout(dir: &Path, args: &[&str]) -> Value {
    let output = vitals_cmd(dir)
        .args(args)
        .arg("--json")
        .output()
        .expect("command should not crash");
    assert!(
        output.status.success(),
        "{args:?} failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("--json should produce valid JSON")
}

#[test]
fn palette_lists_every_category_by_priority() {
    let dir = TempDir::new().expect("tempdir");
    let palette = json_stdout(dir.path(), &["palette"]);
    let categories = palette.as_array().expect("palette array");

    assert_eq!(categories.len(), 16);
    assert_eq!(categories[0]["type"], json!("business_impact"));
    assert_eq!(categories[0]["priority"], json!(2));
    assert_eq!(categories[15]["priority"], json!(7));
    let priorities: Vec<u64> = categories
        .iter()
        .filter_map(|category| category["priority"].as_u64())
        .collect();
    assert!(priorities.windows(2).all(|pair| pair[0] <= pair[1]));
}

#[test]
fn palette_is_unaffected_by_mutes() {
    let dir = TempDir::new().expect("tempdir");
    vitals_cmd(dir.path())
        .args(["mute", "redirects"])
        .assert()
        .success();

    let palette = json_stdout(dir.path(), &["palette"]);
    assert_eq!(palette.as_array().map(Vec::len), Some(16));
}

#[test]
fn mute_is_one_directional() {
    let dir = TempDir::new().expect("tempdir");

    let first = json_stdout(dir.path(), &["mute", "score_trend"]);
    assert_eq!(first["type"], json!("score_trend"));
    assert_eq!(first["outcome"], json!("added"));
    assert!(first["expires_at"].is_string());

    let second = json_stdout(dir.path(), &["mute", "score_trend"]);
    assert_eq!(second["outcome"], json!("already_muted"));
    assert_eq!(second["muted_at"], first["muted_at"]);

    assert!(dir.path().join(".vitals/mutes.json").exists());
}

#[test]
fn mutes_lists_active_entries() {
    let dir = TempDir::new().expect("tempdir");
    vitals_cmd(dir.path())
        .args(["mute", "font_display"])
        .assert()
        .success();
    vitals_cmd(dir.path())
        .args(["mute", "layout_shift"])
        .assert()
        .success();

    let mutes = json_stdout(dir.path(), &["mutes"]);
    let types: Vec<&str> = mutes
        .as_array()
        .expect("mutes array")
        .iter()
        .filter_map(|mute| mute["type"].as_str())
        .collect();
    assert_eq!(types, vec!["font_display", "layout_shift"]);
}

#[test]
fn mutes_text_lists_type_and_expiry() {
    let dir = TempDir::new().expect("tempdir");
    vitals_cmd(dir.path())
        .args(["mute", "third_party"])
        .assert()
        .success();

    vitals_cmd(dir.path())
        .args(["mutes"])
        .env("FORMAT", "text")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("third_party\t"));
}

#[test]
fn unknown_insight_type_is_rejected() {
    let dir = TempDir::new().expect("tempdir");
    vitals_cmd(dir.path())
        .args(["mute", "not_a_category", "--json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("E2002"));

    assert!(!dir.path().join(".vitals/mutes.json").exists());
}

#[test]
fn corrupt_mute_store_fails_mute_request() {
    let dir = TempDir::new().expect("tempdir");
    std::fs::create_dir_all(dir.path().join(".vitals")).expect("mkdir");
    std::fs::write(dir.path().join(".vitals/mutes.json"), "{broken").expect("write");

    vitals_cmd(dir.path())
        .args(["mute", "score"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("E3001"));
}

#[test]
fn completions_name_the_binary() {
    let dir = TempDir::new().expect("tempdir");
    vitals_cmd(dir.path())
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("vitals"));
}
