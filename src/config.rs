use anyhow::{Context, Result};
use std::env;

/// The application's configuration.
#[derive(Clone)]
pub struct Config {
    /// The URL of the PostgreSQL database.
    pub database_url: String,
    /// The maximum number of pooled database connections.
    pub db_pool_size: usize,
    /// The port the server listens on.
    pub port: u16,
    /// The externally visible base URL used to build image links.
    pub public_url: String,
    /// How long an access token stays valid, in seconds.
    pub session_ttl_secs: i64,
    /// The directory where ingested image files are stored.
    pub images_dir: String,
    /// The timeout applied to outbound image downloads, in seconds.
    pub download_timeout_secs: u64,
}

impl Config {
    /// Creates a new `Config` from environment variables.
    ///
    /// # Returns
    ///
    /// A `Result` containing the `Config`.
    pub fn from_env() -> Result<Self> {
        let port: u16 = env::var("PORT")
            .unwrap_or_else(|_| "1010".to_string())
            .parse()
            .context("Invalid PORT")?;

        Ok(Self {
            database_url: env::var("DATABASE_URL").context("DATABASE_URL must be set")?,
            db_pool_size: env::var("DB_POOL_SIZE")
                .unwrap_or_else(|_| "16".to_string())
                .parse()
                .context("Invalid DB_POOL_SIZE")?,
            port,
            public_url: env::var("PUBLIC_URL")
                .unwrap_or_else(|_| format!("http://localhost:{}", port)),
            session_ttl_secs: env::var("SESSION_TTL_SECS")
                .unwrap_or_else(|_| "3600".to_string())
                .parse()
                .context("Invalid SESSION_TTL_SECS")?,
            images_dir: env::var("IMAGES_DIR").unwrap_or_else(|_| "./images".to_string()),
            download_timeout_secs: env::var("DOWNLOAD_TIMEOUT_SECS")
                .unwrap_or_else(|_| "30".to_string())
                .parse()
                .context("Invalid DOWNLOAD_TIMEOUT_SECS")?,
        })
    }
}
