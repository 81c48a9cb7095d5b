use axum::{
    body::Body,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tokio_util::io::ReaderStream;

use crate::{
    error::{AppError, Result},
    repositories::endpoint as endpoint_repo,
    repositories::image as image_repo,
    services::images as image_service,
    state::AppState,
};

/// Service info for the root route.
#[axum::debug_handler]
pub async fn info() -> Response {
    let body = sonic_rs::to_string(&sonic_rs::json!({
        "ok": true,
        "message": format!("Random image API v{}", env!("CARGO_PKG_VERSION")),
        "endpoints": [{
            "method": "GET",
            "path": "/:endpoint",
            "description": "Get a random image from an endpoint"
        }],
    }))
    .unwrap_or_default();

    (
        StatusCode::OK,
        [(http::header::CONTENT_TYPE, "application/json")],
        body,
    )
        .into_response()
}

/// Picks a uniformly-random image from the named endpoint and returns its
/// metadata with a constructed download URL.
#[axum::debug_handler]
pub async fn random_image(
    State(state): State<AppState>,
    Path(endpoint_name): Path<String>,
) -> Result<Response> {
    let endpoint = endpoint_repo::find_by_name(&state.db, &endpoint_name)
        .await?
        .ok_or(AppError::NotFound("Invalid image endpoint."))?;

    let image = image_repo::random_for_endpoint(&state.db, &endpoint.id)
        .await?
        .ok_or(AppError::NotFound("No images found for this endpoint."))?;

    let body = sonic_rs::to_string(&sonic_rs::json!({
        "ok": true,
        "image": {
            "id": image.id,
            "url": format!("{}/images/{}", state.config.public_url, image.id),
            "source": image.source,
            "artistName": image.artist_name,
            "artistLink": image.artist_link,
            "createdAt": image.created_at.to_rfc3339(),
            "updatedAt": image.updated_at.to_rfc3339(),
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

/// Streams the raw bytes of a stored image.
#[axum::debug_handler]
pub async fn image_bytes(
    State(state): State<AppState>,
    Path(image_id): Path<String>,
) -> Result<Response> {
    let image = image_repo::find_by_id(&state.db, &image_id)
        .await?
        .ok_or(AppError::NotFound("Invalid image."))?;

    let path = image_service::image_path(&state.config.images_dir, &image.filename);
    let file = tokio::fs::File::open(&path).await.map_err(|e| {
        tracing::warn!("Backing file missing for image {}: {}", image.id, e);
        AppError::NotFound("Image not found.")
    })?;

    let stream = ReaderStream::new(file);
    let body = Body::from_stream(stream);

    Ok((
        StatusCode::OK,
        [(
            http::header::CONTENT_TYPE,
            image_service::content_type_for(&image.filename),
        )],
        body,
    )
        .into_response())
}
