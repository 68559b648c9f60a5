use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Self-reported daily activity level, used to scale basal metabolic rate
/// into a daily calorie target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ActivityLevel {
    Sedentary,
    Light,
    #[default]
    Moderate,
    Active,
    VeryActive,
}

impl ActivityLevel {
    /// Multiplier applied to BMR for this level.
    pub fn multiplier(self) -> f64 {
        match self {
            Self::Sedentary => 1.2,
            Self::Light => 1.375,
            Self::Moderate => 1.55,
            Self::Active => 1.725,
            Self::VeryActive => 1.9,
        }
    }
}

impl fmt::Display for ActivityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Sedentary => "sedentary",
            Self::Light => "light",
            Self::Moderate => "moderate",
            Self::Active => "active",
            Self::VeryActive => "very_active",
        };
        f.write_str(s)
    }
}

impl FromStr for ActivityLevel {
    type Err = ActivityLevelParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sedentary" => Ok(Self::Sedentary),
            "light" => Ok(Self::Light),
            "moderate" => Ok(Self::Moderate),
            "active" => Ok(Self::Active),
            "very_active" => Ok(Self::VeryActive),
            other => Err(ActivityLevelParseError(other.to_owned())),
        }
    }
}

/// Error returned when parsing an invalid [`ActivityLevel`] string.
#[derive(Debug, Clone)]
pub struct ActivityLevelParseError(pub String);

impl fmt::Display for ActivityLevelParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid activity level: {:?}", self.0)
    }
}

impl std::error::Error for ActivityLevelParseError {}

// ---------------------------------------------------------------------------
// Row structs
// ---------------------------------------------------------------------------

/// A registered account.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// A free-form fitness goal.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Goal {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

/// A manually scheduled exercise on a given day.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Workout {
    pub id: Uuid,
    pub user_id: Uuid,
    pub exercise: String,
    pub sets: i32,
    pub reps: String,
    pub day: String,
    pub created_at: DateTime<Utc>,
}

/// A completed, timed workout session.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct WorkoutSession {
    pub id: Uuid,
    pub user_id: Uuid,
    pub performed_at: DateTime<Utc>,
    pub duration_seconds: i32,
    pub details: serde_json::Value,
}

/// Body measurements and display preferences. One per user.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UserProfile {
    pub id: Uuid,
    pub user_id: Uuid,
    pub display_name: Option<String>,
    pub email: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub height_cm: Option<f64>,
    pub weight_kg: Option<f64>,
    pub profile_image_url: Option<String>,
    pub activity_level: ActivityLevel,
    pub created_at: DateTime<Utc>,
}

/// A workout saved to the user's profile history.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct WorkoutHistoryEntry {
    pub id: Uuid,
    pub user_id: Uuid,
    pub workout_name: String,
    pub duration_seconds: i32,
    pub exercises: serde_json::Value,
    pub progress_photo: Option<String>,
    pub completed_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// A generated plan: the request parameters, the raw model output, and the
/// normalized weekly plan document.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AiPlan {
    pub id: Uuid,
    pub user_id: Uuid,
    pub goal: String,
    pub experience: String,
    pub days_per_week: i32,
    pub equipment: String,
    pub injuries: String,
    pub raw_plan: String,
    pub plan: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

/// One persisted day group of a normalized plan.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Routine {
    pub id: Uuid,
    pub user_id: Uuid,
    pub plan_id: Option<Uuid>,
    pub title: String,
    pub category: String,
    pub exercises: serde_json::Value,
    pub goal_label: String,
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
