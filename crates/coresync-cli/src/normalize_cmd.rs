//! `coresync normalize`: run the plan normalizer over a file.

use std::path::Path;

use anyhow::{Context, Result};
use serde_json::json;

use coresync_core::plan::{PlanInput, normalize};

/// Normalize the plan in `path` and print it as pretty JSON.
pub fn run_normalize(path: &Path, goal: &str) -> Result<()> {
    let output = normalize_file(path, goal)?;
    println!("{output}");
    Ok(())
}

/// Read and normalize `path`, returning the JSON document that would be
/// printed.
pub fn normalize_file(path: &Path, goal: &str) -> Result<String> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read plan file {}", path.display()))?;

    let normalized = normalize(PlanInput::Text(raw), goal)?;
    tracing::debug!(
        days = normalized.plan.days().len(),
        exercises = normalized.plan.exercise_count(),
        "normalized plan file"
    );

    let doc = json!({
        "goal_label": normalized.goal_label,
        "weekly_plan": normalized.plan.weekly_plan,
    });
    Ok(serde_json::to_string_pretty(&doc)?)
}
