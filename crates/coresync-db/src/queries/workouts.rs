//! Database query functions for the `workouts` table.

use anyhow::{Context, Result};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::Workout;

/// Parameters for inserting a new workout row.
#[derive(Debug, Clone)]
pub struct NewWorkout<'a> {
    pub user_id: Uuid,
    pub exercise: &'a str,
    pub sets: i32,
    pub reps: &'a str,
    pub day: &'a str,
}

/// Insert a workout row.
pub async fn insert_workout(pool: &PgPool, new: &NewWorkout<'_>) -> Result<Workout> {
    let workout = sqlx::query_as::<_, Workout>(
        "INSERT INTO workouts (user_id, exercise, sets, reps, day) \
         VALUES ($1, $2, $3, $4, $5) \
         RETURNING *",
    )
    .bind(new.user_id)
    .bind(new.exercise)
    .bind(new.sets)
    .bind(new.reps)
    .bind(new.day)
    .fetch_one(pool)
    .await
    .with_context(|| format!("failed to insert workout {:?}", new.exercise))?;

    Ok(workout)
}

/// List a user's workouts for one day label, in insertion order.
pub async fn list_workouts_for_day(pool: &PgPool, user_id: Uuid, day: &str) -> Result<Vec<Workout>> {
    let workouts = sqlx::query_as::<_, Workout>(
        "SELECT * FROM workouts WHERE user_id = $1 AND day = $2 ORDER BY created_at",
    )
    .bind(user_id)
    .bind(day)
    .fetch_all(pool)
    .await
    .context("failed to list workouts")?;

    Ok(workouts)
}

/// Delete a workout owned by `user_id`. Returns `false` when no row matched.
pub async fn delete_workout(pool: &PgPool, user_id: Uuid, id: Uuid) -> Result<bool> {
    let result = sqlx::query("DELETE FROM workouts WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(user_id)
        .execute(pool)
        .await
        .context("failed to delete workout")?;

    Ok(result.rows_affected() > 0)
}
