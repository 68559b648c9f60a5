//! Goals, manually scheduled workouts, timed sessions and exercise search.

use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde::Deserialize;
use serde_json::{Value, json};
use uuid::Uuid;

use coresync_db::queries::workouts::NewWorkout;
use coresync_db::queries::{goals, sessions, workouts};

use super::{AppError, AppState, AuthUser};

// ---------------------------------------------------------------------------
// Goals
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct GoalRequest {
    title: Option<String>,
    #[serde(default)]
    description: String,
}

pub async fn create_goal(
    State(state): State<AppState>,
    auth: AuthUser,
    payload: Result<Json<GoalRequest>, JsonRejection>,
) -> Result<axum::response::Response, AppError> {
    let Json(req) = payload?;
    let title = req.title.as_deref().map(str::trim).unwrap_or_default();
    if title.is_empty() {
        return Err(AppError::bad_request("title is required"));
    }

    let goal = goals::insert_goal(&state.pool, auth.user_id, title, &req.description)
        .await
        .map_err(AppError::internal)?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Goal created successfully", "goal": goal })),
    )
        .into_response())
}

pub async fn list_goals(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<axum::response::Response, AppError> {
    let goals = goals::list_goals_for_user(&state.pool, auth.user_id)
        .await
        .map_err(AppError::internal)?;
    Ok(Json(goals).into_response())
}

// ---------------------------------------------------------------------------
// Workouts
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct WorkoutRequest {
    exercise: Option<String>,
    sets: Option<i32>,
    reps: Option<Value>,
    day: Option<String>,
}

/// Reps arrive as either `"8-12"` or `10`.
fn reps_text(reps: Option<&Value>) -> Option<String> {
    match reps? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

pub async fn create_workout(
    State(state): State<AppState>,
    auth: AuthUser,
    payload: Result<Json<WorkoutRequest>, JsonRejection>,
) -> Result<axum::response::Response, AppError> {
    let Json(req) = payload?;

    let exercise = req.exercise.as_deref().map(str::trim).unwrap_or_default();
    let day = req.day.as_deref().map(str::trim).unwrap_or_default();
    let reps = reps_text(req.reps.as_ref());
    let (Some(sets), Some(reps)) = (req.sets, reps) else {
        return Err(AppError::bad_request("exercise, sets, reps and day are required"));
    };
    if exercise.is_empty() || day.is_empty() {
        return Err(AppError::bad_request("exercise, sets, reps and day are required"));
    }
    if sets <= 0 {
        return Err(AppError::bad_request("sets must be positive"));
    }

    let workout = workouts::insert_workout(
        &state.pool,
        &NewWorkout {
            user_id: auth.user_id,
            exercise,
            sets,
            reps: &reps,
            day,
        },
    )
    .await
    .map_err(AppError::internal)?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Workout added successfully!", "workout": workout })),
    )
        .into_response())
}

pub async fn list_workouts(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(day): Path<String>,
) -> Result<axum::response::Response, AppError> {
    let workouts = workouts::list_workouts_for_day(&state.pool, auth.user_id, &day)
        .await
        .map_err(AppError::internal)?;
    Ok(Json(workouts).into_response())
}

pub async fn delete_workout(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<axum::response::Response, AppError> {
    let deleted = workouts::delete_workout(&state.pool, auth.user_id, id)
        .await
        .map_err(AppError::internal)?;
    if !deleted {
        return Err(AppError::not_found("Workout not found"));
    }
    Ok(Json(json!({ "message": "Workout deleted" })).into_response())
}

// ---------------------------------------------------------------------------
// Sessions
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRequest {
    #[serde(default)]
    duration_seconds: i32,
    #[serde(default = "empty_list")]
    exercises: Value,
}

fn empty_list() -> Value {
    Value::Array(Vec::new())
}

pub async fn save_session(
    State(state): State<AppState>,
    auth: AuthUser,
    payload: Result<Json<SessionRequest>, JsonRejection>,
) -> Result<axum::response::Response, AppError> {
    let Json(req) = payload?;
    if req.duration_seconds < 0 {
        return Err(AppError::bad_request("durationSeconds must not be negative"));
    }

    let session = sessions::insert_session(
        &state.pool,
        auth.user_id,
        req.duration_seconds,
        &req.exercises,
    )
    .await
    .map_err(AppError::internal)?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Session Saved", "id": session.id })),
    )
        .into_response())
}

// ---------------------------------------------------------------------------
// Exercise search
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    q: Option<String>,
}

impl SearchQuery {
    pub(super) fn require(&self) -> Result<&str, AppError> {
        self.q
            .as_deref()
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .ok_or_else(|| AppError::bad_request("Missing search query ?q="))
    }
}

pub async fn search_exercises(
    State(state): State<AppState>,
    _auth: AuthUser,
    query: Result<Query<SearchQuery>, QueryRejection>,
) -> Result<axum::response::Response, AppError> {
    let Query(query) = query?;
    let q = query.require()?;

    let results = state.exercises.search(q).await.map_err(|e| {
        tracing::warn!(error = %e, "exercise search failed");
        AppError::bad_gateway("Failed to fetch data")
    })?;

    Ok(Json(results).into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reps_accept_text_or_number() {
        assert_eq!(reps_text(Some(&json!("8-12"))).as_deref(), Some("8-12"));
        assert_eq!(reps_text(Some(&json!(10))).as_deref(), Some("10"));
        assert_eq!(reps_text(Some(&json!("  "))), None);
        assert_eq!(reps_text(Some(&json!(null))), None);
        assert_eq!(reps_text(None), None);
    }

    #[test]
    fn search_query_requires_non_blank_q() {
        let blank = SearchQuery {
            q: Some("   ".to_string()),
        };
        assert!(blank.require().is_err());
        assert!(SearchQuery { q: None }.require().is_err());

        let ok = SearchQuery {
            q: Some(" squat ".to_string()),
        };
        assert_eq!(ok.require().unwrap(), "squat");
    }
}
