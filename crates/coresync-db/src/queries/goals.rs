//! Database query functions for the `goals` table.

use anyhow::{Context, Result};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::Goal;

/// Insert a goal for a user.
pub async fn insert_goal(
    pool: &PgPool,
    user_id: Uuid,
    title: &str,
    description: &str,
) -> Result<Goal> {
    let goal = sqlx::query_as::<_, Goal>(
        "INSERT INTO goals (user_id, title, description) \
         VALUES ($1, $2, $3) \
         RETURNING *",
    )
    .bind(user_id)
    .bind(title)
    .bind(description)
    .fetch_one(pool)
    .await
    .context("failed to insert goal")?;

    Ok(goal)
}

/// List a user's goals, newest first.
pub async fn list_goals_for_user(pool: &PgPool, user_id: Uuid) -> Result<Vec<Goal>> {
    let goals = sqlx::query_as::<_, Goal>(
        "SELECT * FROM goals WHERE user_id = $1 ORDER BY created_at DESC",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
    .context("failed to list goals")?;

    Ok(goals)
}
