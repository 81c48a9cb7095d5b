use crate::config::Config;
use crate::error::Result;
use deadpool_postgres::Pool;
use std::time::Duration;

/// The application's state. Constructed once at startup and cloned into every
/// handler; there is no process-global store handle.
#[derive(Clone)]
pub struct AppState {
    /// The database connection pool.
    pub db: Pool,
    /// The HTTP client used for image ingest downloads.
    pub http: reqwest::Client,
    /// The application's configuration.
    pub config: Config,
}

impl AppState {
    /// Creates a new `AppState`.
    ///
    /// # Arguments
    ///
    /// * `config` - The application's configuration.
    ///
    /// # Returns
    ///
    /// A `Result` containing the `AppState`.
    pub async fn new(config: &Config) -> Result<Self> {
        let db = crate::db::create_pool(config)?;
        tracing::info!(
            "PostgreSQL pool initialized (max {} connections)",
            config.db_pool_size
        );

        // A hanging remote image server must not stall an ingest forever.
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.download_timeout_secs))
            .build()
            .map_err(crate::error::AppError::from)?;
        tracing::info!(
            "Download client initialized (timeout: {}s)",
            config.download_timeout_secs
        );

        tokio::fs::create_dir_all(&config.images_dir).await?;

        Ok(AppState {
            db,
            http,
            config: config.clone(),
        })
    }
}
