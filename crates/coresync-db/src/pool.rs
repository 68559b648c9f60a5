use std::time::Duration;

use anyhow::{Context, Result, bail};
use sqlx::postgres::PgPoolOptions;
use sqlx::{Executor, PgPool};
use tracing::info;

use crate::config::DbConfig;

/// Migrations embedded at compile time from `crates/coresync-db/migrations/`.
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!();

/// Application tables in the order `coresync db-init` reports them: accounts
/// first, then manual tracking, then AI plans and the routines saved from them.
pub const TABLES: [&str; 8] = [
    "users",
    "user_profiles",
    "goals",
    "workouts",
    "workout_sessions",
    "workout_history",
    "ai_plans",
    "routines",
];

const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(10);

/// Connect to the database named in `config`, sized by its `max_connections`.
pub async fn create_pool(config: &DbConfig) -> Result<PgPool> {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(ACQUIRE_TIMEOUT)
        .connect(&config.database_url)
        .await
        .with_context(|| format!("failed to connect to database at {}", config.database_url))
}

/// Run all pending embedded migrations against the pool.
pub async fn run_migrations(pool: &PgPool) -> Result<()> {
    MIGRATOR
        .run(pool)
        .await
        .context("failed to run database migrations")?;

    info!("migrations applied successfully");
    Ok(())
}

/// A single-connection pool on the server's `postgres` database.
async fn maintenance_pool(config: &DbConfig) -> Result<PgPool> {
    let url = config.maintenance_url();
    PgPoolOptions::new()
        .max_connections(1)
        .acquire_timeout(ACQUIRE_TIMEOUT)
        .connect(&url)
        .await
        .with_context(|| format!("failed to connect to maintenance database at {url}"))
}

/// The database name from `config`, restricted to characters that are safe
/// to splice into `CREATE DATABASE` / `DROP DATABASE`.
fn checked_database_name(config: &DbConfig) -> Result<&str> {
    let name = config
        .database_name()
        .context("could not determine database name from URL")?;
    if !is_plain_identifier(name) {
        bail!("database name {name:?} contains invalid characters");
    }
    Ok(name)
}

fn is_plain_identifier(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Create the database named in `config` unless it already exists.
pub async fn ensure_database_exists(config: &DbConfig) -> Result<()> {
    let db_name = checked_database_name(config)?;
    let maint = maintenance_pool(config).await?;

    let exists: bool =
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM pg_database WHERE datname = $1)")
            .bind(db_name)
            .fetch_one(&maint)
            .await
            .context("failed to query pg_database")?;

    if exists {
        info!(db = db_name, "database already exists");
    } else {
        maint
            .execute(format!("CREATE DATABASE {db_name}").as_str())
            .await
            .with_context(|| format!("failed to create database {db_name}"))?;
        info!(db = db_name, "database created");
    }

    maint.close().await;
    Ok(())
}

/// Disconnect every session on the database named in `config` and drop it.
/// Dropping a database that does not exist is not an error.
pub async fn drop_database(config: &DbConfig) -> Result<()> {
    let db_name = checked_database_name(config)?;
    let maint = maintenance_pool(config).await?;

    sqlx::query(
        "SELECT pg_terminate_backend(pid) FROM pg_stat_activity \
         WHERE datname = $1 AND pid <> pg_backend_pid()",
    )
    .bind(db_name)
    .execute(&maint)
    .await
    .context("failed to terminate connections")?;

    maint
        .execute(format!("DROP DATABASE IF EXISTS {db_name}").as_str())
        .await
        .with_context(|| format!("failed to drop database {db_name}"))?;

    maint.close().await;
    Ok(())
}

/// Row count for each of [`TABLES`], in that order.
pub async fn table_counts(pool: &PgPool) -> Result<Vec<(&'static str, i64)>> {
    let mut counts = Vec::with_capacity(TABLES.len());
    for table in TABLES {
        let count: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {table}"))
            .fetch_one(pool)
            .await
            .with_context(|| format!("failed to count rows in {table}"))?;
        counts.push((table, count));
    }
    Ok(counts)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn database_names_must_be_plain_identifiers() {
        assert!(is_plain_identifier("coresync"));
        assert!(is_plain_identifier("coresync_test_0f3a"));
        assert!(!is_plain_identifier(""));
        assert!(!is_plain_identifier("core-sync"));
        assert!(!is_plain_identifier("x; DROP TABLE users"));
    }

    #[test]
    fn checked_name_rejects_urls_without_a_database() {
        let cfg = DbConfig::new("postgresql://localhost:5432/");
        assert!(checked_database_name(&cfg).is_err());

        let cfg = DbConfig::new("postgresql://localhost:5432/fit\"ness");
        assert!(checked_database_name(&cfg).is_err());

        let cfg = DbConfig::new("postgresql://localhost:5432/fitness?sslmode=disable");
        assert_eq!(checked_database_name(&cfg).unwrap(), "fitness");
    }

    #[test]
    fn every_migrated_table_is_reported() {
        let schema = include_str!("../migrations/0001_initial_schema.sql");
        let created = schema.matches("CREATE TABLE ").count();
        assert_eq!(created, TABLES.len());
        for table in TABLES {
            assert!(
                schema.contains(&format!("CREATE TABLE {table} (")),
                "{table} missing from schema"
            );
        }
    }
}
