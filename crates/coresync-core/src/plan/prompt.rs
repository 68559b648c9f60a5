//! Prompt construction for plan generation.
//!
//! Pure string assembly; the request goes out through a
//! [`PlanGenerator`](crate::generator::PlanGenerator).

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// What the user asked for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanRequest {
    pub goal: String,
    pub experience: String,
    pub days_per_week: u8,
    #[serde(default)]
    pub equipment: String,
    #[serde(default)]
    pub injuries: String,
}

/// Rejected plan request fields.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlanRequestError {
    #[error("goal is required")]
    MissingGoal,

    #[error("experience is required")]
    MissingExperience,

    #[error("days_per_week must be between 1 and 7, got {0}")]
    DaysOutOfRange(u8),
}

impl PlanRequest {
    pub fn validate(&self) -> Result<(), PlanRequestError> {
        if self.goal.trim().is_empty() {
            return Err(PlanRequestError::MissingGoal);
        }
        if self.experience.trim().is_empty() {
            return Err(PlanRequestError::MissingExperience);
        }
        if !(1..=7).contains(&self.days_per_week) {
            return Err(PlanRequestError::DaysOutOfRange(self.days_per_week));
        }
        Ok(())
    }
}

/// Output schema the model must follow.
const SCHEMA_REFERENCE: &str = r#"## Output Schema

Respond with a single JSON object and nothing else:

{
  "weekly_plan": [
    {
      "day": "Monday",
      "focus": "Upper body push",
      "warmup": "5 min brisk walk, arm circles",
      "exercises": [
        {"name": "Push-ups", "sets": 3, "reps": "8-12"}
      ],
      "cooldown": "Chest and shoulder stretches"
    }
  ]
}

- `day` is a weekday name.
- `sets` is a positive integer.
- `reps` is a string and may be a range ("8-12") or a duration ("30 sec").
- Include only training days; rest days are omitted.
"#;

const PROGRAMMING_GUIDELINES: &str = r#"## Programming Guidelines

1. Spread training days across the week with at least one rest day between hard sessions where possible.
2. Match volume to experience: beginners 2-3 sets per exercise, advanced lifters up to 5.
3. Use only the listed equipment. With no equipment, use bodyweight movements.
4. Avoid movements that load the listed injuries; pick a safe substitute.
5. Every training day has a warmup, 4-7 exercises, and a cooldown.
"#;

/// Build the prompt sent to the plan generator.
pub fn build_plan_prompt(request: &PlanRequest) -> String {
    let mut prompt = String::with_capacity(2048);

    prompt.push_str("# Weekly Workout Plan\n\n");
    prompt.push_str(
        "Design a one-week workout plan for the client described below. \
         Do not add commentary, Markdown, or code fences around the JSON.\n\n",
    );

    prompt.push_str(SCHEMA_REFERENCE);
    prompt.push('\n');
    prompt.push_str(PROGRAMMING_GUIDELINES);
    prompt.push('\n');

    prompt.push_str("## Client\n\n");
    prompt.push_str(&format!("- **Goal:** {}\n", request.goal.trim()));
    prompt.push_str(&format!("- **Experience:** {}\n", request.experience.trim()));
    prompt.push_str(&format!(
        "- **Training days per week:** {} (the plan must contain exactly {} days)\n",
        request.days_per_week, request.days_per_week
    ));
    prompt.push_str(&format!(
        "- **Equipment:** {}\n",
        or_none(&request.equipment, "none (bodyweight only)")
    ));
    prompt.push_str(&format!(
        "- **Injuries / limitations:** {}\n",
        or_none(&request.injuries, "none reported")
    ));

    prompt
}

fn or_none<'a>(value: &'a str, fallback: &'a str) -> &'a str {
    let trimmed = value.trim();
    if trimmed.is_empty() { fallback } else { trimmed }
}
