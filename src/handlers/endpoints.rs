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
    state::AppState,
};

/// The request payload for creating an endpoint.
#[derive(Deserialize, Debug)]
pub struct CreateEndpointRequest {
    #[serde(default)]
    pub name: String,
}

/// Lists all endpoints, each with its nested images.
#[axum::debug_handler]
pub async fn list_endpoints(State(state): State<AppState>) -> Result<Response> {
    let endpoints = endpoint_repo::list_all(&state.db).await?;

    let mut endpoints_json = Vec::with_capacity(endpoints.len());
    for endpoint in endpoints {
        let images = image_repo::list_by_endpoint(&state.db, &endpoint.id).await?;
        let images_json: Vec<_> = images
            .into_iter()
            .map(|image| {
                sonic_rs::json!({
                    "id": image.id,
                    "filename": image.filename,
                    "source": image.source,
                    "artistName": image.artist_name,
                    "artistLink": image.artist_link,
                    "createdAt": image.created_at.to_rfc3339(),
                    "updatedAt": image.updated_at.to_rfc3339(),
                })
            })
            .collect();

        endpoints_json.push(sonic_rs::json!({
            "id": endpoint.id,
            "name": endpoint.name,
            "createdAt": endpoint.created_at.to_rfc3339(),
            "updatedAt": endpoint.updated_at.to_rfc3339(),
            "images": images_json,
        }));
    }

    let body = sonic_rs::to_string(&sonic_rs::json!({
        "ok": true,
        "endpoints": endpoints_json,
    }))
    .unwrap_or_default();

    Ok((
        StatusCode::OK,
        [(http::header::CONTENT_TYPE, "application/json")],
        body,
    )
        .into_response())
}

/// Creates a new named endpoint.
#[axum::debug_handler]
pub async fn create_endpoint(
    State(state): State<AppState>,
    Json(payload): Json<CreateEndpointRequest>,
) -> Result<Response> {
    if payload.name.trim().is_empty() {
        return Err(AppError::Validation("Invalid endpoint name.".to_string()));
    }

    let endpoint =
        endpoint_repo::create(&state.db, &crate::crypto::tokens::generate_id(), &payload.name)
            .await?;

    let body = sonic_rs::to_string(&sonic_rs::json!({
        "ok": true,
        "message": "Endpoint created.",
        "endpoint": {
            "id": endpoint.id,
            "name": endpoint.name,
            "createdAt": endpoint.created_at.to_rfc3339(),
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

/// Deletes an endpoint. Rejected while images remain attached.
#[axum::debug_handler]
pub async fn delete_endpoint(
    State(state): State<AppState>,
    Path(endpoint_id): Path<String>,
) -> Result<Response> {
    if !endpoint_repo::delete(&state.db, &endpoint_id).await? {
        return Err(AppError::NotFound("Invalid endpoint."));
    }

    let body = sonic_rs::to_string(&sonic_rs::json!({
        "ok": true,
        "message": "Endpoint deleted.",
    }))
    .unwrap_or_default();

    Ok((
        StatusCode::OK,
        [(http::header::CONTENT_TYPE, "application/json")],
        body,
    )
        .into_response())
}
