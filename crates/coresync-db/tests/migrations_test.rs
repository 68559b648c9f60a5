//! Integration tests for embedded migrations and table introspection.

use coresync_db::pool;
use coresync_test_utils::{create_test_db, drop_test_db};

#[tokio::test]
async fn migrations_create_all_tables() {
    let (pool, db_name) = create_test_db().await;

    let counts = pool::table_counts(&pool).await.expect("table counts");
    let names: Vec<&str> = counts.iter().map(|(name, _)| *name).collect();
    assert_eq!(names, pool::TABLES);
    assert!(counts.iter().all(|(_, count)| *count == 0));

    pool.close().await;
    drop_test_db(&db_name).await;
}

#[tokio::test]
async fn table_counts_follow_inserts() {
    let (pool, db_name) = create_test_db().await;
    coresync_test_utils::seed_user(&pool, "counted").await;

    let counts = pool::table_counts(&pool).await.expect("table counts");
    assert_eq!(counts[0], ("users", 1));
    assert!(counts[1..].iter().all(|(_, count)| *count == 0));

    pool.close().await;
    drop_test_db(&db_name).await;
}

#[tokio::test]
async fn drop_database_removes_it() {
    let (pool, db_name) = create_test_db().await;
    pool.close().await;

    let config = coresync_db::config::DbConfig::new(format!(
        "{}/{db_name}",
        coresync_test_utils::pg_url().await
    ));
    pool::drop_database(&config).await.expect("drop");
    pool::drop_database(&config).await.expect("second drop is a no-op");
    assert!(pool::create_pool(&config).await.is_err());
}

#[tokio::test]
async fn migrations_are_idempotent() {
    let (pool, db_name) = create_test_db().await;

    pool::run_migrations(&pool)
        .await
        .expect("second migration run should be a no-op");

    pool.close().await;
    drop_test_db(&db_name).await;
}

#[tokio::test]
async fn workouts_reject_non_positive_sets() {
    let (pool, db_name) = create_test_db().await;
    let user_id = coresync_test_utils::seed_user(&pool, "checker").await;

    let result = sqlx::query(
        "INSERT INTO workouts (user_id, exercise, sets, reps, day) VALUES ($1, 'Squat', 0, '5', 'Monday')",
    )
    .bind(user_id)
    .execute(&pool)
    .await;
    assert!(result.is_err(), "sets = 0 should violate the check constraint");

    pool.close().await;
    drop_test_db(&db_name).await;
}
