//! Canonical weekly plan types.
//!
//! These are the shapes the normalizer produces and the HTTP layer
//! returns. Serialized, a plan is `{"weekly_plan": [...]}`.

use serde::{Deserialize, Serialize};

/// Exercise name used when the source gives none.
pub const DEFAULT_EXERCISE_NAME: &str = "Unnamed exercise";

/// Set count used when the source gives none or an unusable one.
pub const DEFAULT_SETS: u32 = 3;

/// Rep prescription used when the source gives none.
pub const DEFAULT_REPS: &str = "8–12";

/// Raw plan content handed to the normalizer.
#[derive(Debug, Clone, PartialEq)]
pub enum PlanInput {
    /// Already-decoded JSON, e.g. a request body field.
    Structured(serde_json::Value),
    /// Model output or user-pasted text, possibly fenced JSON.
    Text(String),
}

impl From<serde_json::Value> for PlanInput {
    /// A JSON string is text to be parsed, not a structured plan.
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::String(s) => Self::Text(s),
            other => Self::Structured(other),
        }
    }
}

impl From<String> for PlanInput {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&str> for PlanInput {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

/// A normalized training week, in source order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyPlan {
    pub weekly_plan: Vec<DayEntry>,
}

impl WeeklyPlan {
    pub fn days(&self) -> &[DayEntry] {
        &self.weekly_plan
    }

    /// Total exercise count across all days.
    pub fn exercise_count(&self) -> usize {
        self.weekly_plan.iter().map(|d| d.exercises.len()).sum()
    }
}

/// One day of training.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayEntry {
    pub day: String,
    pub focus: String,
    pub exercises: Vec<ExerciseEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warmup: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cooldown: Option<String>,
}

impl DayEntry {
    pub(crate) fn new(day: impl Into<String>, focus: impl Into<String>) -> Self {
        Self {
            day: day.into(),
            focus: focus.into(),
            exercises: Vec::new(),
            warmup: None,
            cooldown: None,
        }
    }
}

/// A single prescribed exercise.
///
/// `category`, `warmup` and `cooldown` are filled in from the owning day
/// when days are grouped, so each exercise carries its context once it is
/// persisted on its own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExerciseEntry {
    pub name: String,
    pub sets: u32,
    pub reps: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warmup: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cooldown: Option<String>,
}

impl ExerciseEntry {
    pub fn new(name: impl Into<String>, sets: u32, reps: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sets,
            reps: reps.into(),
            category: None,
            warmup: None,
            cooldown: None,
        }
    }
}
