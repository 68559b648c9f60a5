//! Database query functions for the `workout_history` table.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::WorkoutHistoryEntry;

/// Parameters for inserting a history entry.
#[derive(Debug, Clone)]
pub struct NewHistoryEntry {
    pub user_id: Uuid,
    pub workout_name: String,
    pub duration_seconds: i32,
    pub exercises: serde_json::Value,
    pub progress_photo: Option<String>,
    pub completed_at: DateTime<Utc>,
}

/// Insert a history entry.
pub async fn insert_history_entry(
    pool: &PgPool,
    new: &NewHistoryEntry,
) -> Result<WorkoutHistoryEntry> {
    let entry = sqlx::query_as::<_, WorkoutHistoryEntry>(
        "INSERT INTO workout_history \
         (user_id, workout_name, duration_seconds, exercises, progress_photo, completed_at) \
         VALUES ($1, $2, $3, $4, $5, $6) \
         RETURNING *",
    )
    .bind(new.user_id)
    .bind(&new.workout_name)
    .bind(new.duration_seconds)
    .bind(&new.exercises)
    .bind(&new.progress_photo)
    .bind(new.completed_at)
    .fetch_one(pool)
    .await
    .context("failed to insert workout history entry")?;

    Ok(entry)
}

/// List a user's history, most recently completed first.
pub async fn list_history_for_user(
    pool: &PgPool,
    user_id: Uuid,
) -> Result<Vec<WorkoutHistoryEntry>> {
    let entries = sqlx::query_as::<_, WorkoutHistoryEntry>(
        "SELECT * FROM workout_history WHERE user_id = $1 ORDER BY completed_at DESC",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
    .context("failed to list workout history")?;

    Ok(entries)
}

/// Delete a history entry owned by `user_id`. Returns `false` when no row
/// matched.
pub async fn delete_history_entry(pool: &PgPool, user_id: Uuid, id: Uuid) -> Result<bool> {
    let result = sqlx::query("DELETE FROM workout_history WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(user_id)
        .execute(pool)
        .await
        .context("failed to delete workout history entry")?;

    Ok(result.rows_affected() > 0)
}
