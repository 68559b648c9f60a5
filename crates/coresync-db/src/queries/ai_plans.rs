//! Database query functions for the `ai_plans` table.

use anyhow::{Context, Result};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::AiPlan;

/// Parameters for inserting a generated plan.
#[derive(Debug, Clone)]
pub struct NewAiPlan<'a> {
    pub user_id: Uuid,
    pub goal: &'a str,
    pub experience: &'a str,
    pub days_per_week: i32,
    pub equipment: &'a str,
    pub injuries: &'a str,
    pub raw_plan: &'a str,
    pub plan: &'a serde_json::Value,
}

/// Insert a generated plan.
pub async fn insert_ai_plan(pool: &PgPool, new: &NewAiPlan<'_>) -> Result<AiPlan> {
    let plan = sqlx::query_as::<_, AiPlan>(
        "INSERT INTO ai_plans \
         (user_id, goal, experience, days_per_week, equipment, injuries, raw_plan, plan) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
         RETURNING *",
    )
    .bind(new.user_id)
    .bind(new.goal)
    .bind(new.experience)
    .bind(new.days_per_week)
    .bind(new.equipment)
    .bind(new.injuries)
    .bind(new.raw_plan)
    .bind(new.plan)
    .fetch_one(pool)
    .await
    .context("failed to insert AI plan")?;

    Ok(plan)
}

/// Fetch a plan by ID, scoped to its owner.
pub async fn get_ai_plan_for_user(pool: &PgPool, user_id: Uuid, id: Uuid) -> Result<Option<AiPlan>> {
    let plan = sqlx::query_as::<_, AiPlan>("SELECT * FROM ai_plans WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(user_id)
        .fetch_optional(pool)
        .await
        .context("failed to fetch AI plan")?;

    Ok(plan)
}

/// List a user's generated plans, newest first.
pub async fn list_ai_plans_for_user(pool: &PgPool, user_id: Uuid) -> Result<Vec<AiPlan>> {
    let plans = sqlx::query_as::<_, AiPlan>(
        "SELECT * FROM ai_plans WHERE user_id = $1 ORDER BY created_at DESC",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
    .context("failed to list AI plans")?;

    Ok(plans)
}
