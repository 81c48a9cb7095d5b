use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// The application's error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// A database pool error.
    #[error("Pool error: {0}")]
    Pool(#[from] deadpool_postgres::PoolError),

    /// A database error.
    #[error("Database error: {0}")]
    Database(#[from] tokio_postgres::Error),

    /// An I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A failed outbound download.
    #[error("Download error: {0}")]
    Download(#[from] reqwest::Error),

    /// Wrong username or password. A single variant so that an unknown user
    /// and a bad password are indistinguishable to callers.
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// A missing, malformed, or unknown bearer/refresh token.
    #[error("Invalid token")]
    InvalidToken,

    /// A resource not found error, with the caller-facing message.
    #[error("Not found: {0}")]
    NotFound(&'static str),

    /// A uniqueness or referential conflict.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// A validation error.
    #[error("Validation error: {0}")]
    Validation(String),

    /// An internal server error.
    #[error("Internal server error: {0}")]
    Internal(String),
}

/// A `Result` type that uses `AppError` as the error type.
pub type Result<T> = std::result::Result<T, AppError>;

impl AppError {
    /// The diagnostic name reported in the `_errors` list.
    fn name(&self) -> &'static str {
        match self {
            AppError::Pool(_) => "PoolError",
            AppError::Database(_) => "DatabaseError",
            AppError::Io(_) => "IoError",
            AppError::Download(_) => "DownloadError",
            AppError::InvalidCredentials => "InvalidCredentials",
            AppError::InvalidToken => "InvalidToken",
            AppError::NotFound(_) => "NotFound",
            AppError::Conflict(_) => "Conflict",
            AppError::Validation(_) => "Validation",
            AppError::Internal(_) => "InternalError",
        }
    }

    /// The HTTP status this error maps to.
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Pool(_)
            | AppError::Database(_)
            | AppError::Io(_)
            | AppError::Download(_)
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::InvalidCredentials | AppError::InvalidToken => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) | AppError::Validation(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        let message = match &self {
            AppError::Pool(e) => {
                tracing::error!("Pool error: {}", e);
                "An internal error occurred.".to_string()
            }

            AppError::Database(e) => {
                tracing::error!("Database error: {}", e);
                "An internal error occurred.".to_string()
            }

            AppError::Io(e) => {
                tracing::error!("IO error: {}", e);
                "An internal error occurred.".to_string()
            }

            AppError::Download(e) => {
                tracing::error!("Download error: {}", e);
                "An error occurred while getting the image.".to_string()
            }

            AppError::InvalidCredentials => {
                tracing::warn!("Login failed: invalid credentials");
                "Invalid credentials.".to_string()
            }

            AppError::InvalidToken => {
                tracing::debug!("Rejected request with invalid token");
                "Invalid authorization header. Please refresh.".to_string()
            }

            AppError::NotFound(msg) => {
                tracing::debug!("Resource not found: {}", msg);
                msg.to_string()
            }

            AppError::Conflict(msg) => {
                tracing::debug!("Conflict: {}", msg);
                msg.clone()
            }

            AppError::Validation(msg) => {
                tracing::debug!("Validation error: {}", msg);
                msg.clone()
            }

            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                "An internal error occurred.".to_string()
            }
        };

        // 5xx responses carry a diagnostic pair; nothing beyond name/message
        // ever leaves the process.
        let body = if status.is_server_error() {
            sonic_rs::to_string(&sonic_rs::json!({
                "ok": false,
                "message": message,
                "_errors": [{ "name": self.name(), "messages": message }],
            }))
        } else {
            sonic_rs::to_string(&sonic_rs::json!({
                "ok": false,
                "message": message,
            }))
        }
        .unwrap_or_else(|_| r#"{"ok":false,"message":"An internal error occurred."}"#.to_string());

        (
            status,
            [(http::header::CONTENT_TYPE, "application/json")],
            body,
        )
            .into_response()
    }
}
