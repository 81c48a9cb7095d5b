use crate::crypto::tokens;
use crate::error::{AppError, Result};
use crate::models::image::Image;
use crate::repositories::endpoint as endpoint_repo;
use crate::repositories::image as image_repo;
use crate::state::AppState;
use chrono::Utc;
use std::path::{Path, PathBuf};

/// File extensions an ingested image may keep. Anything else falls back to
/// `jpg`.
const ALLOWED_EXTENSIONS: [&str; 6] = ["jpg", "jpeg", "png", "gif", "avif", "webp"];

/// Infers a file extension from the trailing path segment of a URL,
/// falling back to `jpg` when the segment has no recognized extension.
pub fn infer_extension(url: &str) -> &'static str {
    let path = url
        .split(['?', '#'])
        .next()
        .unwrap_or(url);
    let segment = path.rsplit('/').next().unwrap_or(path);

    let Some((_, ext)) = segment.rsplit_once('.') else {
        return "jpg";
    };
    let ext = ext.to_ascii_lowercase();
    ALLOWED_EXTENSIONS
        .iter()
        .find(|allowed| **allowed == ext)
        .copied()
        .unwrap_or("jpg")
}

/// The content type an image is served with, derived from its stored
/// filename.
pub fn content_type_for(filename: &str) -> &'static str {
    match filename.rsplit_once('.').map(|(_, ext)| ext) {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("avif") => "image/avif",
        Some("webp") => "image/webp",
        _ => "application/octet-stream",
    }
}

/// The on-disk path of a stored image.
pub fn image_path(images_dir: &str, filename: &str) -> PathBuf {
    Path::new(images_dir).join(filename)
}

/// Downloads an image from a remote URL and persists it locally with its
/// metadata.
///
/// The download honors the client's bounded timeout, and the payload must
/// actually look like an image. The file is written before the row is
/// inserted, so a crash in between orphans a file rather than leaving a
/// record pointing at nothing.
pub async fn ingest(
    state: &AppState,
    image_url: &str,
    endpoint_id: &str,
    source: Option<&str>,
    artist_name: Option<&str>,
    artist_link: Option<&str>,
) -> Result<Image> {
    endpoint_repo::find_by_id(&state.db, endpoint_id)
        .await?
        .ok_or(AppError::NotFound("Invalid endpoint."))?;

    let response = state.http.get(image_url).send().await?;
    let data = response.error_for_status()?.bytes().await?;

    if !infer::get(&data).is_some_and(|t| t.matcher_type() == infer::MatcherType::Image) {
        return Err(AppError::Validation(
            "The URL did not return an image.".to_string(),
        ));
    }

    let extension = infer_extension(image_url);
    let filename = format!("{}.{}", Utc::now().timestamp_millis(), extension);
    let path = image_path(&state.config.images_dir, &filename);

    tokio::fs::write(&path, &data).await?;
    tracing::debug!("Wrote {} bytes to {}", data.len(), path.display());

    let image = image_repo::create(
        &state.db,
        &tokens::generate_id(),
        endpoint_id,
        &filename,
        source,
        artist_name,
        artist_link,
    )
    .await?;

    tracing::info!("Ingested image {} into endpoint {}", image.id, endpoint_id);
    Ok(image)
}

/// Deletes an image record and best-effort removes its backing file. A
/// failed unlink is logged, not surfaced; the record is already gone.
pub async fn delete(state: &AppState, image_id: &str) -> Result<()> {
    let image = image_repo::delete(&state.db, image_id)
        .await?
        .ok_or(AppError::NotFound("Invalid image."))?;

    let path = image_path(&state.config.images_dir, &image.filename);
    if let Err(e) = tokio::fs::remove_file(&path).await {
        tracing::warn!("Could not remove {}: {}", path.display(), e);
    }

    tracing::info!("Image {} deleted", image_id);
    Ok(())
}
