//! HTTP API for `coresync serve`.
//!
//! Every route except registration and login expects an
//! `Authorization: Bearer <token>` header carrying a session token.
//! Errors are returned as `{"error": "<message>"}`.

mod auth;
mod food;
mod plans;
mod profile;
mod workouts;


use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::extract::FromRequestParts;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use sqlx::PgPool;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use coresync_core::exercise::ExerciseSearchClient;
use coresync_core::generator::PlanGenerator;
use coresync_core::nutrition::FatSecretClient;
use coresync_core::token::{TokenConfig, validate_token};

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

/// Shared handles for every request.
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub token_config: Arc<TokenConfig>,
    pub generator: Arc<dyn PlanGenerator>,
    pub foods: Arc<FatSecretClient>,
    pub exercises: Arc<ExerciseSearchClient>,
}

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    message: String,
}

impl AppError {
    pub fn new(status: StatusCode, msg: impl Into<String>) -> Self {
        Self {
            status,
            message: msg.into(),
        }
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, msg)
    }

    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, msg)
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, msg)
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, msg)
    }

    pub fn unprocessable(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::UNPROCESSABLE_ENTITY, msg)
    }

    pub fn bad_gateway(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_GATEWAY, msg)
    }

    pub fn internal(err: anyhow::Error) -> Self {
        tracing::error!(error = %format!("{err:#}"), "request failed");
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, format!("{err:#}"))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let body = serde_json::json!({ "error": self.message });
        (self.status, Json(body)).into_response()
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

// ---------------------------------------------------------------------------
// Authentication
// ---------------------------------------------------------------------------

/// The caller, as identified by a valid bearer token.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser {
    pub user_id: Uuid,
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| AppError::unauthorized("missing authorization header"))?;

        let token = header
            .strip_prefix("Bearer ")
            .map(str::trim)
            .ok_or_else(|| AppError::unauthorized("authorization header must be 'Bearer <token>'"))?;

        let claims = validate_token(&state.token_config, token).map_err(|e| {
            tracing::debug!(error = %e, "rejected session token");
            AppError::unauthorized("invalid or expired token")
        })?;

        Ok(Self {
            user_id: claims.user_id,
        })
    }
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/me", get(auth::me))
        .route("/goals", get(workouts::list_goals).post(workouts::create_goal))
        .route("/workouts", post(workouts::create_workout))
        .route(
            "/workouts/{day}",
            get(workouts::list_workouts).delete(workouts::delete_workout),
        )
        .route("/workout/session", post(workouts::save_session))
        .route("/workout/search", get(workouts::search_exercises))
        .route(
            "/profile",
            get(profile::get_profile).put(profile::update_profile),
        )
        .route(
            "/profile/history",
            get(profile::list_history).post(profile::save_history),
        )
        .route("/profile/history/{id}", delete(profile::delete_history))
        .route("/ai/workout-plan", post(plans::generate_plan))
        .route("/ai/workout-plans", get(plans::list_plans))
        .route("/ai/workout-plans/{id}", get(plans::get_plan))
        .route("/workout/ai/workout-plan/save", post(plans::save_plan))
        .route("/routines", get(plans::list_routines))
        .route("/api/food/search", get(food::search_foods))
        .route("/api/food/bmr", get(food::bmr))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

pub async fn run_serve(state: AppState, bind: &str, port: u16) -> Result<()> {
    let app = build_router(state);
    let addr: SocketAddr = format!("{bind}:{port}").parse()?;
    tracing::info!("coresync serve listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    tracing::info!("coresync serve shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for ctrl-c; shutting down");
    }
}
