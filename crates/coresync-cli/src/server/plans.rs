//! AI plan generation, stored plans, and saving plans as routines.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde::Deserialize;
use serde_json::{Value, json};
use uuid::Uuid;

use coresync_core::plan::{
    NormalizationError, PlanInput, PlanRequest, build_plan_prompt, get_plan_with_routines,
    normalize, routine_records, save_plan_as_routines,
};
use coresync_db::queries::ai_plans::{self, NewAiPlan};
use coresync_db::queries::routines;

use super::{AppError, AppState, AuthUser};

impl From<NormalizationError> for AppError {
    fn from(err: NormalizationError) -> Self {
        Self::unprocessable(err.to_string())
    }
}

pub async fn generate_plan(
    State(state): State<AppState>,
    auth: AuthUser,
    payload: Result<Json<PlanRequest>, JsonRejection>,
) -> Result<axum::response::Response, AppError> {
    let Json(request) = payload?;
    request
        .validate()
        .map_err(|e| AppError::bad_request(e.to_string()))?;

    let prompt = build_plan_prompt(&request);
    let raw_plan = state.generator.generate(&prompt).await.map_err(|e| {
        tracing::warn!(error = %e, "plan generation failed");
        AppError::bad_gateway(e.to_string())
    })?;

    let normalized = normalize(PlanInput::Text(raw_plan.clone()), &request.goal).map_err(|e| {
        tracing::warn!(raw_len = raw_plan.len(), "generated plan could not be normalized");
        AppError::from(e)
    })?;

    let plan = serde_json::to_value(&normalized.plan)
        .map_err(|e| AppError::internal(e.into()))?;

    let stored = ai_plans::insert_ai_plan(
        &state.pool,
        &NewAiPlan {
            user_id: auth.user_id,
            goal: request.goal.trim(),
            experience: request.experience.trim(),
            days_per_week: i32::from(request.days_per_week),
            equipment: &request.equipment,
            injuries: &request.injuries,
            raw_plan: &raw_plan,
            plan: &plan,
        },
    )
    .await
    .map_err(AppError::internal)?;

    tracing::info!(
        plan_id = %stored.id,
        days = normalized.plan.days().len(),
        exercises = normalized.plan.exercise_count(),
        "stored generated plan"
    );

    Ok((
        StatusCode::CREATED,
        Json(json!({ "id": stored.id, "plan": stored.plan })),
    )
        .into_response())
}

pub async fn list_plans(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<axum::response::Response, AppError> {
    let plans = ai_plans::list_ai_plans_for_user(&state.pool, auth.user_id)
        .await
        .map_err(AppError::internal)?;
    Ok(Json(plans).into_response())
}

pub async fn get_plan(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<axum::response::Response, AppError> {
    let (plan, routines) = get_plan_with_routines(&state.pool, auth.user_id, id)
        .await
        .map_err(AppError::internal)?
        .ok_or_else(|| AppError::not_found("Plan not found"))?;

    Ok(Json(json!({ "plan": plan, "routines": routines })).into_response())
}

/// Either a stored plan's ID or a plan document (object or text).
#[derive(Debug, Deserialize)]
pub struct SavePlanRequest {
    plan_id: Option<Uuid>,
    plan: Option<Value>,
    goal: Option<String>,
}

pub async fn save_plan(
    State(state): State<AppState>,
    auth: AuthUser,
    payload: Result<Json<SavePlanRequest>, JsonRejection>,
) -> Result<axum::response::Response, AppError> {
    let Json(req) = payload?;

    let (input, fallback_goal, plan_id) = match (req.plan_id, req.plan) {
        (Some(plan_id), _) => {
            let stored = ai_plans::get_ai_plan_for_user(&state.pool, auth.user_id, plan_id)
                .await
                .map_err(AppError::internal)?
                .ok_or_else(|| AppError::not_found("Plan not found"))?;
            (PlanInput::Structured(stored.plan), stored.goal, Some(plan_id))
        }
        (None, Some(plan)) => (PlanInput::from(plan), req.goal.unwrap_or_default(), None),
        (None, None) => return Err(AppError::bad_request("plan_id or plan is required")),
    };

    let normalized = normalize(input, &fallback_goal)?;
    let records = routine_records(&normalized.plan, auth.user_id, plan_id, &normalized.goal_label);
    let saved = save_plan_as_routines(&state.pool, &records)
        .await
        .map_err(AppError::internal)?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Plan saved as routines", "routines": saved })),
    )
        .into_response())
}

pub async fn list_routines(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<axum::response::Response, AppError> {
    let routines = routines::list_routines_for_user(&state.pool, auth.user_id)
        .await
        .map_err(AppError::internal)?;
    Ok(Json(routines).into_response())
}
