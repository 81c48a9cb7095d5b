use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;

use crate::{
    error::{AppError, Result},
    repositories::user as user_repo,
    services::auth as auth_service,
    state::AppState,
    validation::auth::{require_credentials, validate_username},
};

/// The request payload for creating a user.
#[derive(Deserialize, Debug)]
pub struct CreateUserRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub role: i32,
}

/// Creates a new user. The password hash never leaves the process.
#[axum::debug_handler]
pub async fn create_user(
    State(state): State<AppState>,
    Json(payload): Json<CreateUserRequest>,
) -> Result<Response> {
    require_credentials(&payload.username, &payload.password)?;
    validate_username(&payload.username)?;

    let user =
        auth_service::create_user(&state.db, &payload.username, &payload.password, payload.role)
            .await?;

    let body = sonic_rs::to_string(&sonic_rs::json!({
        "ok": true,
        "message": "User successfully created.",
        "user": {
            "id": user.id,
            "username": user.username,
            "role": user.role,
            "createdAt": user.created_at.to_rfc3339(),
        },
    }))
    .unwrap_or_default();

    Ok((
        StatusCode::OK,
        [(http::header::CONTENT_TYPE, "application/json")],
        body,
    )
        .into_response())
}

/// Lists all users as `{id, username}` pairs.
#[axum::debug_handler]
pub async fn list_users(State(state): State<AppState>) -> Result<Response> {
    let users = user_repo::list_all(&state.db).await?;

    let users_json: Vec<_> = users
        .into_iter()
        .map(|user| {
            sonic_rs::json!({
                "id": user.id,
                "username": user.username,
            })
        })
        .collect();

    let body = sonic_rs::to_string(&sonic_rs::json!({
        "ok": true,
        "message": "Users successfully gathered.",
        "users": users_json,
    }))
    .unwrap_or_default();

    Ok((
        StatusCode::OK,
        [(http::header::CONTENT_TYPE, "application/json")],
        body,
    )
        .into_response())
}

/// Deletes a user. Their session, if any, goes with them.
#[axum::debug_handler]
pub async fn delete_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Response> {
    if !user_repo::delete(&state.db, &user_id).await? {
        return Err(AppError::NotFound("User not found."));
    }

    let body = sonic_rs::to_string(&sonic_rs::json!({
        "ok": true,
        "message": "User successfully deleted.",
    }))
    .unwrap_or_default();

    Ok((
        StatusCode::OK,
        [(http::header::CONTENT_TYPE, "application/json")],
        body,
    )
        .into_response())
}
