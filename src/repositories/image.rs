use crate::{error::Result, models::image::Image};
use deadpool_postgres::Pool;
use tokio_postgres::Row;

/// A helper function to map a `tokio_postgres::Row` to an `Image`.
fn row_to_image(row: &Row) -> Result<Image> {
    Ok(Image {
        id: row.try_get("id")?,
        endpoint_id: row.try_get("endpoint_id")?,
        filename: row.try_get("filename")?,
        source: row.try_get("source")?,
        artist_name: row.try_get("artist_name")?,
        artist_link: row.try_get("artist_link")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

/// Inserts a new image record.
pub async fn create(
    pool: &Pool,
    id: &str,
    endpoint_id: &str,
    filename: &str,
    source: Option<&str>,
    artist_name: Option<&str>,
    artist_link: Option<&str>,
) -> Result<Image> {
    let client = pool.get().await?;
    let row = client
        .query_one(
            r#"
            INSERT INTO images (id, endpoint_id, filename, source, artist_name, artist_link)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
            &[&id, &endpoint_id, &filename, &source, &artist_name, &artist_link],
        )
        .await?;
    row_to_image(&row)
}

/// Finds an image by its ID.
pub async fn find_by_id(pool: &Pool, image_id: &str) -> Result<Option<Image>> {
    let client = pool.get().await?;
    let row = client
        .query_opt(
            r#"
            SELECT * FROM images WHERE id = $1
            "#,
            &[&image_id],
        )
        .await?;
    row.map(|r| row_to_image(&r)).transpose()
}

/// Lists all images belonging to an endpoint.
pub async fn list_by_endpoint(pool: &Pool, endpoint_id: &str) -> Result<Vec<Image>> {
    let client = pool.get().await?;
    let rows = client
        .query(
            r#"
            SELECT * FROM images WHERE endpoint_id = $1 ORDER BY created_at ASC
            "#,
            &[&endpoint_id],
        )
        .await?;
    rows.iter().map(row_to_image).collect()
}

/// Picks one image of the endpoint uniformly at random, or `None` when the
/// endpoint has no images.
pub async fn random_for_endpoint(pool: &Pool, endpoint_id: &str) -> Result<Option<Image>> {
    let client = pool.get().await?;
    let row = client
        .query_opt(
            r#"
            SELECT * FROM images WHERE endpoint_id = $1 ORDER BY random() LIMIT 1
            "#,
            &[&endpoint_id],
        )
        .await?;
    row.map(|r| row_to_image(&r)).transpose()
}

/// Deletes an image by ID, returning the deleted row so the caller can
/// remove the backing file. Returns `None` if no such image existed.
pub async fn delete(pool: &Pool, image_id: &str) -> Result<Option<Image>> {
    let client = pool.get().await?;
    let row = client
        .query_opt(
            r#"
            DELETE FROM images WHERE id = $1
            RETURNING *
            "#,
            &[&image_id],
        )
        .await?;
    row.map(|r| row_to_image(&r)).transpose()
}
