use crate::config::Config;
use crate::error::{AppError, Result};
use deadpool_postgres::{Manager, ManagerConfig, Pool, RecyclingMethod, Runtime};
use std::time::Duration;
use tokio_postgres::NoTls;

/// Creates the database connection pool, sized from the configuration.
///
/// # Arguments
///
/// * `config` - The application's configuration.
///
/// # Returns
///
/// A `Result` containing the `Pool`.
pub fn create_pool(config: &Config) -> Result<Pool> {
    let pg_config: tokio_postgres::Config = config.database_url.parse()?;

    let manager = Manager::from_config(
        pg_config,
        NoTls,
        ManagerConfig {
            recycling_method: RecyclingMethod::Fast,
        },
    );

    Pool::builder(manager)
        .max_size(config.db_pool_size)
        .runtime(Runtime::Tokio1)
        .wait_timeout(Some(Duration::from_secs(5)))
        .create_timeout(Some(Duration::from_secs(2)))
        .recycle_timeout(Some(Duration::from_secs(1)))
        .build()
        .map_err(|e| AppError::Internal(format!("Failed to create pool: {}", e)))
}

/// Creates the schema if it does not exist yet. Idempotent, runs at startup.
///
/// Sessions are keyed UNIQUE on `user_id`: a user has at most one live
/// session, and logging in again replaces it. Images restrict endpoint
/// deletion while any remain attached.
pub async fn init_schema(pool: &Pool) -> Result<()> {
    let client = pool.get().await?;
    client
        .batch_execute(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id          TEXT PRIMARY KEY,
                username    TEXT NOT NULL UNIQUE,
                password    TEXT NOT NULL,
                role        INT NOT NULL DEFAULT 0,
                created_at  TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                updated_at  TIMESTAMPTZ NOT NULL DEFAULT NOW()
            );

            CREATE TABLE IF NOT EXISTS sessions (
                id             TEXT PRIMARY KEY,
                user_id        TEXT NOT NULL UNIQUE REFERENCES users(id) ON DELETE CASCADE,
                access_token   TEXT NOT NULL UNIQUE,
                refresh_token  TEXT NOT NULL UNIQUE,
                expires_at     BIGINT NOT NULL,
                created_at     TIMESTAMPTZ NOT NULL DEFAULT NOW()
            );

            CREATE TABLE IF NOT EXISTS endpoints (
                id          TEXT PRIMARY KEY,
                name        TEXT NOT NULL UNIQUE,
                created_at  TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                updated_at  TIMESTAMPTZ NOT NULL DEFAULT NOW()
            );

            CREATE TABLE IF NOT EXISTS images (
                id           TEXT PRIMARY KEY,
                endpoint_id  TEXT NOT NULL REFERENCES endpoints(id) ON DELETE RESTRICT,
                filename     TEXT NOT NULL,
                source       TEXT,
                artist_name  TEXT,
                artist_link  TEXT,
                created_at   TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                updated_at   TIMESTAMPTZ NOT NULL DEFAULT NOW()
            );
            "#,
        )
        .await?;
    tracing::info!("Database schema ready");
    Ok(())
}
