//! Routine records derived from a normalized plan.

use serde::Serialize;
use uuid::Uuid;

use super::model::{ExerciseEntry, WeeklyPlan};

/// Category stamped on every routine created from a generated plan.
pub const ROUTINE_CATEGORY: &str = "AI Generated Plan";

/// One routine row to be written, before it has an ID.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoutineRecord {
    pub owner_id: Uuid,
    pub plan_id: Option<Uuid>,
    pub title: String,
    pub category: String,
    pub exercises: Vec<ExerciseEntry>,
    pub goal_label: String,
}

/// Build one record per day of `plan` that has exercises.
pub fn routine_records(
    plan: &WeeklyPlan,
    owner_id: Uuid,
    plan_id: Option<Uuid>,
    goal_label: &str,
) -> Vec<RoutineRecord> {
    plan.weekly_plan
        .iter()
        .filter(|day| !day.exercises.is_empty())
        .map(|day| RoutineRecord {
            owner_id,
            plan_id,
            title: format!("{} Workout", day.day),
            category: ROUTINE_CATEGORY.to_string(),
            exercises: day.exercises.clone(),
            goal_label: goal_label.to_string(),
        })
        .collect()
}
