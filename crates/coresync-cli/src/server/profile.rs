//! Profile and saved workout history.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use uuid::Uuid;

use coresync_db::models::{ActivityLevel, UserProfile};
use coresync_db::queries::history::{self, NewHistoryEntry};
use coresync_db::queries::profiles::{self, ProfileUpdate};
use coresync_db::queries::users;

use super::{AppError, AppState, AuthUser};

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    id: Uuid,
    username: String,
    display_name: String,
    email: Option<String>,
    date_of_birth: Option<NaiveDate>,
    height_cm: Option<f64>,
    weight_kg: Option<f64>,
    profile_image_url: Option<String>,
    activity_level: ActivityLevel,
    created_at: DateTime<Utc>,
}

impl ProfileResponse {
    fn new(profile: UserProfile, username: String) -> Self {
        Self {
            id: profile.id,
            display_name: profile.display_name.unwrap_or_else(|| username.clone()),
            username,
            email: profile.email,
            date_of_birth: profile.date_of_birth,
            height_cm: profile.height_cm,
            weight_kg: profile.weight_kg,
            profile_image_url: profile.profile_image_url,
            activity_level: profile.activity_level,
            created_at: profile.created_at,
        }
    }
}

/// Load the caller's profile, creating it on first access. 404 when the
/// user row itself is gone.
pub(super) async fn load_profile(state: &AppState, user_id: Uuid) -> Result<(UserProfile, String), AppError> {
    let user = users::get_user(&state.pool, user_id)
        .await
        .map_err(AppError::internal)?
        .ok_or_else(|| AppError::not_found("User not found"))?;

    let profile = profiles::get_or_create_profile(&state.pool, user_id, &user.username)
        .await
        .map_err(AppError::internal)?;

    Ok((profile, user.username))
}

pub async fn get_profile(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<axum::response::Response, AppError> {
    let (profile, username) = load_profile(&state, auth.user_id).await?;
    Ok(Json(ProfileResponse::new(profile, username)).into_response())
}

#[derive(Debug, Default, Deserialize)]
pub struct ProfileRequest {
    display_name: Option<String>,
    email: Option<String>,
    date_of_birth: Option<Value>,
    height_cm: Option<f64>,
    weight_kg: Option<f64>,
    profile_image_url: Option<String>,
    activity_level: Option<String>,
}

impl ProfileRequest {
    fn into_update(self) -> Result<ProfileUpdate, AppError> {
        let date_of_birth = self.date_of_birth.as_ref().and_then(parse_date_of_birth);
        if self.date_of_birth.is_some() && date_of_birth.is_none() {
            tracing::debug!("ignoring unparseable date_of_birth");
        }

        let activity_level = self
            .activity_level
            .map(|level| level.parse::<ActivityLevel>())
            .transpose()
            .map_err(|e| AppError::bad_request(e.to_string()))?;

        Ok(ProfileUpdate {
            display_name: self.display_name,
            email: self.email,
            date_of_birth,
            height_cm: self.height_cm,
            weight_kg: self.weight_kg,
            profile_image_url: self.profile_image_url,
            activity_level,
        })
    }
}

/// `YYYY-MM-DD`; anything else is dropped.
fn parse_date_of_birth(value: &Value) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.as_str()?.trim(), "%Y-%m-%d").ok()
}

pub async fn update_profile(
    State(state): State<AppState>,
    auth: AuthUser,
    payload: Result<Json<ProfileRequest>, JsonRejection>,
) -> Result<axum::response::Response, AppError> {
    let Json(req) = payload?;
    let update = req.into_update()?;

    let (_, username) = load_profile(&state, auth.user_id).await?;
    let profile = profiles::update_profile(&state.pool, auth.user_id, &update)
        .await
        .map_err(AppError::internal)?;

    Ok(Json(json!({
        "message": "Profile updated successfully",
        "profile": ProfileResponse::new(profile, username),
    }))
    .into_response())
}

// ---------------------------------------------------------------------------
// History
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct HistoryRequest {
    #[serde(default = "default_workout_name")]
    workout_name: String,
    #[serde(default)]
    duration_seconds: i32,
    #[serde(default)]
    exercises: Option<Value>,
    progress_photo: Option<String>,
    completed_at: Option<String>,
}

fn default_workout_name() -> String {
    "Workout".to_string()
}

/// RFC 3339, or a naive ISO timestamp taken as UTC. Falls back to `now`.
fn parse_completed_at(raw: Option<&str>, now: DateTime<Utc>) -> DateTime<Utc> {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return now;
    };
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return ts.with_timezone(&Utc);
    }
    match NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        Ok(naive) => naive.and_utc(),
        Err(_) => {
            tracing::debug!(completed_at = raw, "unparseable completed_at, using now");
            now
        }
    }
}

pub async fn save_history(
    State(state): State<AppState>,
    auth: AuthUser,
    payload: Result<Json<HistoryRequest>, JsonRejection>,
) -> Result<axum::response::Response, AppError> {
    let Json(req) = payload?;
    if req.duration_seconds < 0 {
        return Err(AppError::bad_request("duration_seconds must not be negative"));
    }

    let entry = history::insert_history_entry(
        &state.pool,
        &NewHistoryEntry {
            user_id: auth.user_id,
            completed_at: parse_completed_at(req.completed_at.as_deref(), Utc::now()),
            workout_name: req.workout_name,
            duration_seconds: req.duration_seconds,
            exercises: req.exercises.unwrap_or_else(|| Value::Array(Vec::new())),
            progress_photo: req.progress_photo,
        },
    )
    .await
    .map_err(AppError::internal)?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Workout saved to profile", "id": entry.id })),
    )
        .into_response())
}

pub async fn list_history(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<axum::response::Response, AppError> {
    let entries = history::list_history_for_user(&state.pool, auth.user_id)
        .await
        .map_err(AppError::internal)?;
    Ok(Json(entries).into_response())
}

pub async fn delete_history(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<axum::response::Response, AppError> {
    let deleted = history::delete_history_entry(&state.pool, auth.user_id, id)
        .await
        .map_err(AppError::internal)?;
    if !deleted {
        return Err(AppError::not_found("History entry not found"));
    }
    Ok(Json(json!({ "message": "History entry deleted" })).into_response())
}
