//! Database query functions for the `user_profiles` table.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{ActivityLevel, UserProfile};

/// Partial profile update. `None` leaves the stored column untouched.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub display_name: Option<String>,
    pub email: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub height_cm: Option<f64>,
    pub weight_kg: Option<f64>,
    pub profile_image_url: Option<String>,
    pub activity_level: Option<ActivityLevel>,
}

/// Fetch a user's profile, if one exists.
pub async fn get_profile(pool: &PgPool, user_id: Uuid) -> Result<Option<UserProfile>> {
    let profile = sqlx::query_as::<_, UserProfile>("SELECT * FROM user_profiles WHERE user_id = $1")
        .bind(user_id)
        .fetch_optional(pool)
        .await
        .context("failed to fetch profile")?;

    Ok(profile)
}

/// Fetch a user's profile, creating an empty one on first access.
///
/// `display_name` seeds the new row only; an existing profile is returned
/// unchanged.
pub async fn get_or_create_profile(
    pool: &PgPool,
    user_id: Uuid,
    display_name: &str,
) -> Result<UserProfile> {
    sqlx::query(
        "INSERT INTO user_profiles (user_id, display_name) VALUES ($1, $2) \
         ON CONFLICT (user_id) DO NOTHING",
    )
    .bind(user_id)
    .bind(display_name)
    .execute(pool)
    .await
    .context("failed to create profile")?;

    get_profile(pool, user_id)
        .await?
        .with_context(|| format!("profile for user {user_id} missing after insert"))
}

/// Apply a partial update, creating the profile if needed.
pub async fn update_profile(
    pool: &PgPool,
    user_id: Uuid,
    update: &ProfileUpdate,
) -> Result<UserProfile> {
    let profile = sqlx::query_as::<_, UserProfile>(
        "INSERT INTO user_profiles \
         (user_id, display_name, email, date_of_birth, height_cm, weight_kg, profile_image_url, activity_level) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, COALESCE($8, 'moderate')) \
         ON CONFLICT (user_id) DO UPDATE SET \
           display_name      = COALESCE(EXCLUDED.display_name, user_profiles.display_name), \
           email             = COALESCE(EXCLUDED.email, user_profiles.email), \
           date_of_birth     = COALESCE(EXCLUDED.date_of_birth, user_profiles.date_of_birth), \
           height_cm         = COALESCE(EXCLUDED.height_cm, user_profiles.height_cm), \
           weight_kg         = COALESCE(EXCLUDED.weight_kg, user_profiles.weight_kg), \
           profile_image_url = COALESCE(EXCLUDED.profile_image_url, user_profiles.profile_image_url), \
           activity_level    = COALESCE($8, user_profiles.activity_level) \
         RETURNING *",
    )
    .bind(user_id)
    .bind(&update.display_name)
    .bind(&update.email)
    .bind(update.date_of_birth)
    .bind(update.height_cm)
    .bind(update.weight_kg)
    .bind(&update.profile_image_url)
    .bind(update.activity_level)
    .fetch_one(pool)
    .await
    .context("failed to update profile")?;

    Ok(profile)
}
