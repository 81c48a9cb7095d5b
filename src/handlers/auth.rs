use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension, Json,
};
use serde::Deserialize;

use crate::{
    error::{AppError, Result},
    models::user::CurrentUser,
    services::auth as auth_service,
    state::AppState,
    validation::auth::require_credentials,
};

/// The request payload for user login.
#[derive(Deserialize, Debug)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// The request payload for rotating an access token.
#[derive(Deserialize, Debug)]
pub struct RefreshRequest {
    #[serde(default, rename = "refreshToken")]
    pub refresh_token: String,
}

/// Authenticates a user and creates a session.
#[axum::debug_handler]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Response> {
    require_credentials(&payload.username, &payload.password)?;

    let session = auth_service::login(
        &state.db,
        &payload.username,
        &payload.password,
        state.config.session_ttl_secs,
    )
    .await?;

    let body = sonic_rs::to_string(&sonic_rs::json!({
        "ok": true,
        "message": "Log in successful.",
        "accessToken": session.access_token,
        "refreshToken": session.refresh_token,
        "exp": session.expires_at,
    }))
    .unwrap_or_default();

    Ok((
        StatusCode::OK,
        [(http::header::CONTENT_TYPE, "application/json")],
        body,
    )
        .into_response())
}

/// Regenerates the access token from a refresh token.
#[axum::debug_handler]
pub async fn token(
    State(state): State<AppState>,
    Json(payload): Json<RefreshRequest>,
) -> Result<Response> {
    if payload.refresh_token.is_empty() {
        return Err(AppError::Validation(
            "Refresh token is missing.".to_string(),
        ));
    }

    let session = auth_service::refresh(
        &state.db,
        &payload.refresh_token,
        state.config.session_ttl_secs,
    )
    .await?;

    let body = sonic_rs::to_string(&sonic_rs::json!({
        "ok": true,
        "message": "Token successfully regenerated.",
        "accessToken": session.access_token,
        "exp": session.expires_at,
    }))
    .unwrap_or_default();

    Ok((
        StatusCode::OK,
        [(http::header::CONTENT_TYPE, "application/json")],
        body,
    )
        .into_response())
}

/// Returns the identity attached by the authorization middleware.
#[axum::debug_handler]
pub async fn me(Extension(user): Extension<CurrentUser>) -> Response {
    let body = sonic_rs::to_string(&sonic_rs::json!({
        "ok": true,
        "message": "User data successfully gathered.",
        "user": {
            "id": user.id,
            "username": user.username,
            "role": user.role,
        },
    }))
    .unwrap_or_default();

    (
        StatusCode::OK,
        [(http::header::CONTENT_TYPE, "application/json")],
        body,
    )
        .into_response()
}
