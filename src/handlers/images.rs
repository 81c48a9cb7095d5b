use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;

use crate::{
    error::{AppError, Result},
    repositories::endpoint as endpoint_repo,
    repositories::image as image_repo,
    services::images as image_service,
    state::AppState,
};

/// The request payload for ingesting a remote image.
#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct IngestImageRequest {
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub endpoint_id: String,
    pub source: Option<String>,
    pub artist_name: Option<String>,
    pub artist_link: Option<String>,
}

/// Lists all images of an endpoint along with the endpoint summary.
#[axum::debug_handler]
pub async fn list_images(
    State(state): State<AppState>,
    Path(endpoint_id): Path<String>,
) -> Result<Response> {
    let endpoint = endpoint_repo::find_by_id(&state.db, &endpoint_id)
        .await?
        .ok_or(AppError::NotFound("Invalid endpoint."))?;

    let images = image_repo::list_by_endpoint(&state.db, &endpoint.id).await?;

    let images_json: Vec<_> = images
        .into_iter()
        .map(|image| {
            sonic_rs::json!({
                "id": image.id,
                "filename": image.filename,
                "url": format!("{}/images/{}", state.config.public_url, image.id),
                "createdAt": image.created_at.to_rfc3339(),
                "updatedAt": image.updated_at.to_rfc3339(),
                "source": image.source,
                "artistName": image.artist_name,
                "artistLink": image.artist_link,
            })
        })
        .collect();

    let body = sonic_rs::to_string(&sonic_rs::json!({
        "ok": true,
        "images": images_json,
        "endpoint": {
            "id": endpoint.id,
            "name": endpoint.name,
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

/// Downloads an image from the supplied URL and stores it under the given
/// endpoint.
#[axum::debug_handler]
pub async fn create_image(
    State(state): State<AppState>,
    Json(payload): Json<IngestImageRequest>,
) -> Result<Response> {
    if payload.image_url.is_empty() || payload.endpoint_id.is_empty() {
        return Err(AppError::Validation(
            "Invalid image URL or endpoint.".to_string(),
        ));
    }

    image_service::ingest(
        &state,
        &payload.image_url,
        &payload.endpoint_id,
        payload.source.as_deref(),
        payload.artist_name.as_deref(),
        payload.artist_link.as_deref(),
    )
    .await?;

    Ok((
        StatusCode::OK,
        [(http::header::CONTENT_TYPE, "application/json")],
        r#"{"ok":true}"#,
    )
        .into_response())
}

/// Deletes an image record and its stored file.
#[axum::debug_handler]
pub async fn delete_image(
    State(state): State<AppState>,
    Path(image_id): Path<String>,
) -> Result<Response> {
    image_service::delete(&state, &image_id).await?;

    let body = sonic_rs::to_string(&sonic_rs::json!({
        "ok": true,
        "message": "Image successfully deleted.",
    }))
    .unwrap_or_default();

    Ok((
        StatusCode::OK,
        [(http::header::CONTENT_TYPE, "application/json")],
        body,
    )
        .into_response())
}
