//! Food search and BMR.

use axum::Json;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::response::IntoResponse;
use chrono::Utc;
use serde::Deserialize;

use coresync_core::nutrition::{BodyMetrics, compute_bmr};
use coresync_db::models::ActivityLevel;

use super::profile::load_profile;
use super::workouts::SearchQuery;
use super::{AppError, AppState, AuthUser};

pub async fn search_foods(
    State(state): State<AppState>,
    _auth: AuthUser,
    query: Result<Query<SearchQuery>, QueryRejection>,
) -> Result<axum::response::Response, AppError> {
    let Query(query) = query?;
    let q = query.require()?;

    let results = state.foods.search(q).await;
    tracing::debug!(query = q, count = results.foods.len(), fallback = results.is_fallback, "food search");
    Ok(Json(results).into_response())
}

#[derive(Debug, Deserialize)]
pub struct BmrQuery {
    activity: Option<String>,
}

pub async fn bmr(
    State(state): State<AppState>,
    auth: AuthUser,
    query: Result<Query<BmrQuery>, QueryRejection>,
) -> Result<axum::response::Response, AppError> {
    let Query(query) = query?;
    let (profile, _) = load_profile(&state, auth.user_id).await?;

    // Unknown levels fall back to the one stored on the profile.
    let activity = query
        .activity
        .as_deref()
        .and_then(|a| a.parse::<ActivityLevel>().ok())
        .unwrap_or(profile.activity_level);

    let metrics = BodyMetrics {
        weight_kg: profile.weight_kg,
        height_cm: profile.height_cm,
        date_of_birth: profile.date_of_birth,
    };
    let report = compute_bmr(&metrics, activity, Utc::now().date_naive());

    Ok(Json(report).into_response())
}
