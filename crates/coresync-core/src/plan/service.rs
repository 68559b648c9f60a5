//! Plan service layer.
//!
//! Persists the day groups of a normalized plan as routines. All routines
//! from one save are inserted in a single transaction.

use anyhow::{Context, Result};
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use coresync_db::models::{AiPlan, Routine};
use coresync_db::queries::{ai_plans as plan_queries, routines as routine_queries};

use super::records::RoutineRecord;

/// Insert every record as a routine row.
///
/// Either all routines are written or none are.
pub async fn save_plan_as_routines(pool: &PgPool, records: &[RoutineRecord]) -> Result<Vec<Routine>> {
    let mut tx = pool.begin().await.context("failed to begin transaction")?;
    let mut saved = Vec::with_capacity(records.len());

    for record in records {
        let exercises = serde_json::to_value(&record.exercises)
            .with_context(|| format!("failed to encode exercises for {:?}", record.title))?;

        let routine = sqlx::query_as::<_, Routine>(
            "INSERT INTO routines (user_id, plan_id, title, category, exercises, goal_label) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING *",
        )
        .bind(record.owner_id)
        .bind(record.plan_id)
        .bind(&record.title)
        .bind(&record.category)
        .bind(&exercises)
        .bind(&record.goal_label)
        .fetch_one(&mut *tx)
        .await
        .with_context(|| format!("failed to insert routine {:?}", record.title))?;

        saved.push(routine);
    }

    tx.commit().await.context("failed to commit transaction")?;

    info!(count = saved.len(), "saved plan routines");
    Ok(saved)
}

/// Fetch a user's generated plan and the routines saved from it. `None` when
/// the plan does not exist or belongs to someone else.
pub async fn get_plan_with_routines(
    pool: &PgPool,
    user_id: Uuid,
    plan_id: Uuid,
) -> Result<Option<(AiPlan, Vec<Routine>)>> {
    let Some(plan) = plan_queries::get_ai_plan_for_user(pool, user_id, plan_id).await? else {
        return Ok(None);
    };

    let routines = routine_queries::list_routines_for_plan(pool, plan_id).await?;

    Ok(Some((plan, routines)))
}
