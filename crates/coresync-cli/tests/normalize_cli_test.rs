//! Integration tests for the `coresync normalize` command.
//!
//! These run the built binary against plan files in a temp directory; no
//! database is involved.

use std::path::Path;
use std::process::{Command, Output};

fn run_normalize(path: &Path, extra: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_coresync"))
        .arg("normalize")
        .arg(path)
        .args(extra)
        .env("RUST_LOG", "off")
        .output()
        .expect("failed to run coresync binary")
}

fn write(dir: &tempfile::TempDir, name: &str, contents: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, contents).unwrap();
    path
}

#[test]
fn prints_normalized_plan_for_text_input() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = write(
        &dir,
        "plan.txt",
        "Monday – Push Day\n• Push-ups (8-12)\n• Shoulder Press (8-10)\nWarmup: 5 min walk\n",
    );

    let output = run_normalize(&path, &["--goal", "Strength"]);
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

    let doc: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(doc["goal_label"], "Strength");
    let monday = &doc["weekly_plan"][0];
    assert_eq!(monday["day"], "Monday");
    assert_eq!(monday["warmup"], "5 min walk");
    assert_eq!(monday["exercises"].as_array().unwrap().len(), 2);
}

#[test]
fn merges_repeated_days_in_json_input() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = write(
        &dir,
        "plan.json",
        r#"{"weekly_plan": [
            {"day": "Wednesday", "exercises": [{"name": "A", "sets": 3, "reps": "10"}]},
            {"day": "Wednesday", "exercises": [{"name": "B", "sets": 3, "reps": "10"}]}
        ]}"#,
    );

    let output = run_normalize(&path, &[]);
    assert!(output.status.success());

    let doc: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let days = doc["weekly_plan"].as_array().unwrap();
    assert_eq!(days.len(), 1);
    let names: Vec<&str> = days[0]["exercises"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["A", "B"]);
}

#[test]
fn fails_with_invalid_plan_format() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = write(&dir, "empty.json", r#"{"weekly_plan":[{"day":"Tuesday","exercises":[]}]}"#);

    let output = run_normalize(&path, &[]);
    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("invalid plan format"), "stderr: {stderr}");
}
