//! Shared test utilities for coresync integration tests.
//!
//! Provides a PostgreSQL instance shared across tests. Each test gets its
//! own database within the instance.
//!
//! Two modes:
//! - **`CORESYNC_TEST_PG_URL`** set: use that server directly, e.g. a
//!   database started once by CI.
//! - **No env var** (`cargo test`): spin up a container via testcontainers,
//!   shared per binary through a `OnceCell`.

use sqlx::PgPool;
use testcontainers::ContainerAsync;
use testcontainers::ImageExt;
use testcontainers::runners::AsyncRunner;
use testcontainers_modules::postgres::Postgres;
use tokio::sync::OnceCell;
use uuid::Uuid;

use coresync_db::config::DbConfig;
use coresync_db::pool;

/// Per-test pools stay small so many tests can share one server.
const TEST_POOL_SIZE: u32 = 5;

/// Shared container state: base URL and optional container handle (kept alive).
struct SharedPg {
    base_url: String,
    /// Held to keep the container alive. `None` when using an external URL.
    _container: Option<ContainerAsync<Postgres>>,
}

/// Lazily-initialized shared PostgreSQL.
static SHARED_PG: OnceCell<SharedPg> = OnceCell::const_new();

async fn init_shared_pg() -> SharedPg {
    if let Ok(url) = std::env::var("CORESYNC_TEST_PG_URL") {
        return SharedPg {
            base_url: url,
            _container: None,
        };
    }

    let container = Postgres::default()
        .with_tag("16-alpine")
        .start()
        .await
        .expect("failed to start PostgreSQL container");

    let host = container.get_host().await.expect("failed to get host");
    let port = container
        .get_host_port_ipv4(5432)
        .await
        .expect("failed to get mapped port");

    let base_url = format!("postgresql://postgres:postgres@{host}:{port}");

    SharedPg {
        base_url,
        _container: Some(container),
    }
}

/// Base URL for the shared PostgreSQL.
///
/// Lazily starts a container on first call (unless `CORESYNC_TEST_PG_URL` is
/// set). The URL points at the server root (no database name appended).
pub async fn pg_url() -> &'static str {
    let shared = SHARED_PG.get_or_init(init_shared_pg).await;
    &shared.base_url
}

/// Config for database `db_name` on the shared server.
async fn test_db_config(db_name: &str) -> DbConfig {
    DbConfig::new(format!("{}/{db_name}", pg_url().await)).with_max_connections(TEST_POOL_SIZE)
}

/// Create a uniquely named database with migrations applied.
///
/// Returns `(pool, db_name)`. Pass `db_name` to [`drop_test_db`] when the
/// test is done.
pub async fn create_test_db() -> (PgPool, String) {
    let db_name = format!("coresync_test_{}", Uuid::new_v4().simple());
    let config = test_db_config(&db_name).await;

    pool::ensure_database_exists(&config)
        .await
        .unwrap_or_else(|e| panic!("failed to create temp database {db_name}: {e:#}"));
    let db_pool = pool::create_pool(&config)
        .await
        .unwrap_or_else(|e| panic!("failed to connect to temp database {db_name}: {e:#}"));
    pool::run_migrations(&db_pool)
        .await
        .expect("migrations should succeed");

    (db_pool, db_name)
}

/// Drop a database made by [`create_test_db`]. Failures are reported but do
/// not fail the test.
pub async fn drop_test_db(db_name: &str) {
    let config = test_db_config(db_name).await;
    if let Err(e) = pool::drop_database(&config).await {
        eprintln!("warning: could not drop {db_name}: {e:#}");
    }
}

/// Insert a user with a throwaway password hash and return its ID.
///
/// Most integration tests only need an owner row to satisfy foreign keys.
pub async fn seed_user(pool: &PgPool, username: &str) -> Uuid {
    coresync_db::queries::users::insert_user(pool, username, "$2b$04$not-a-real-hash")
        .await
        .expect("insert user")
        .expect("username should be free")
        .id
}
