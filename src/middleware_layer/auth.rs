use axum::{
    body::Body,
    extract::State,
    http::{HeaderMap, Request},
    middleware::Next,
    response::Response,
};

use crate::{
    error::AppError,
    models::user::CurrentUser,
    services::auth as auth_service,
    state::AppState,
};

/// Extracts the bearer token from the `Authorization` header. `None` for a
/// missing header, a non-Bearer scheme, or an empty token.
fn extract_bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(http::header::AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ")?;
    (!token.is_empty()).then_some(token)
}

/// A middleware that requires a valid session bearer token.
///
/// Every failure path (missing header, wrong scheme, unknown or expired
/// token, orphaned session) answers with the same 401 envelope; the
/// downstream handler sees a `CurrentUser` extension on success.
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let token = extract_bearer_token(request.headers()).ok_or(AppError::InvalidToken)?;

    let (_, user) = auth_service::validate(&state.db, token)
        .await?
        .ok_or(AppError::InvalidToken)?;

    tracing::debug!("Authenticated user {}", user.id);

    request.extensions_mut().insert(CurrentUser {
        id: user.id,
        username: user.username,
        role: user.role,
    });

    Ok(next.run(request).await)
}
