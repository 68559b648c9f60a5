//! Registration, login and the current-user probe.

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use coresync_core::token::generate_token;
use coresync_db::queries::users;

use super::{AppError, AppState, AuthUser};

const INVALID_CREDENTIALS: &str = "Incorrect username or password";

#[derive(Debug, Deserialize)]
pub struct Credentials {
    username: Option<String>,
    password: Option<String>,
}

impl Credentials {
    /// Trimmed username and raw password, both required.
    fn require(self) -> Result<(String, String), AppError> {
        let username = self.username.map(|u| u.trim().to_string()).unwrap_or_default();
        let password = self.password.unwrap_or_default();
        if username.is_empty() || password.is_empty() {
            return Err(AppError::bad_request("username and password are required"));
        }
        Ok((username, password))
    }
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    message: &'static str,
    access_token: String,
    username: String,
}

#[derive(Debug, Serialize)]
pub struct MeResponse {
    id: Uuid,
    username: String,
}

pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<Credentials>, JsonRejection>,
) -> Result<axum::response::Response, AppError> {
    let Json(credentials) = payload?;
    let (username, password) = credentials.require()?;

    let password_hash = tokio::task::spawn_blocking(move || bcrypt::hash(password, bcrypt::DEFAULT_COST))
        .await
        .map_err(|e| AppError::internal(anyhow::anyhow!("password hashing task failed: {e}")))?
        .map_err(|e| AppError::internal(anyhow::anyhow!("password hashing failed: {e}")))?;

    let user = users::insert_user(&state.pool, &username, &password_hash)
        .await
        .map_err(AppError::internal)?
        .ok_or_else(|| AppError::conflict("User already exists"))?;

    let access_token = generate_token(&state.token_config, user.id)
        .map_err(|e| AppError::internal(e.into()))?;

    tracing::info!(user_id = %user.id, "registered user");
    Ok((
        StatusCode::CREATED,
        Json(TokenResponse {
            message: "User created successfully",
            access_token,
            username: user.username,
        }),
    )
        .into_response())
}

pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<Credentials>, JsonRejection>,
) -> Result<axum::response::Response, AppError> {
    let Json(credentials) = payload?;
    let (username, password) = credentials.require()?;

    let Some(user) = users::get_user_by_username(&state.pool, &username)
        .await
        .map_err(AppError::internal)?
    else {
        return Err(AppError::unauthorized(INVALID_CREDENTIALS));
    };

    let password_hash = user.password_hash.clone();
    let valid = tokio::task::spawn_blocking(move || bcrypt::verify(password, &password_hash))
        .await
        .map_err(|e| AppError::internal(anyhow::anyhow!("password verification task failed: {e}")))?
        .unwrap_or(false);

    if !valid {
        tracing::warn!(username = %username, "failed login");
        return Err(AppError::unauthorized(INVALID_CREDENTIALS));
    }

    let access_token = generate_token(&state.token_config, user.id)
        .map_err(|e| AppError::internal(e.into()))?;

    Ok(Json(TokenResponse {
        message: "Login successful",
        access_token,
        username: user.username,
    })
    .into_response())
}

pub async fn me(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<axum::response::Response, AppError> {
    let user = users::get_user(&state.pool, auth.user_id)
        .await
        .map_err(AppError::internal)?
        .ok_or_else(|| AppError::not_found("User not found"))?;

    Ok(Json(MeResponse {
        id: user.id,
        username: user.username,
    })
    .into_response())
}
