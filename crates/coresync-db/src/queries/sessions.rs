//! Database query functions for the `workout_sessions` table.

use anyhow::{Context, Result};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::WorkoutSession;

/// Record a completed session. `details` is the exercise list as sent by
/// the client.
pub async fn insert_session(
    pool: &PgPool,
    user_id: Uuid,
    duration_seconds: i32,
    details: &serde_json::Value,
) -> Result<WorkoutSession> {
    let session = sqlx::query_as::<_, WorkoutSession>(
        "INSERT INTO workout_sessions (user_id, duration_seconds, details) \
         VALUES ($1, $2, $3) \
         RETURNING *",
    )
    .bind(user_id)
    .bind(duration_seconds)
    .bind(details)
    .fetch_one(pool)
    .await
    .context("failed to insert workout session")?;

    Ok(session)
}

/// List a user's sessions, most recent first.
pub async fn list_sessions_for_user(pool: &PgPool, user_id: Uuid) -> Result<Vec<WorkoutSession>> {
    let sessions = sqlx::query_as::<_, WorkoutSession>(
        "SELECT * FROM workout_sessions WHERE user_id = $1 ORDER BY performed_at DESC",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
    .context("failed to list workout sessions")?;

    Ok(sessions)
}
