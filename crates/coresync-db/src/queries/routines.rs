//! Database query functions for the `routines` table.
//!
//! Routines are written in bulk by the plan service inside a transaction;
//! this module only reads them.

use anyhow::{Context, Result};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::Routine;

/// List a user's routines, newest first.
pub async fn list_routines_for_user(pool: &PgPool, user_id: Uuid) -> Result<Vec<Routine>> {
    let routines = sqlx::query_as::<_, Routine>(
        "SELECT * FROM routines WHERE user_id = $1 ORDER BY created_at DESC, title",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
    .context("failed to list routines")?;

    Ok(routines)
}

/// List the routines created from one generated plan.
pub async fn list_routines_for_plan(pool: &PgPool, plan_id: Uuid) -> Result<Vec<Routine>> {
    let routines = sqlx::query_as::<_, Routine>(
        "SELECT * FROM routines WHERE plan_id = $1 ORDER BY created_at, title",
    )
    .bind(plan_id)
    .fetch_all(pool)
    .await
    .context("failed to list routines for plan")?;

    Ok(routines)
}
