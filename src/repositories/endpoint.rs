use crate::{
    error::{AppError, Result},
    models::endpoint::Endpoint,
};
use deadpool_postgres::Pool;
use tokio_postgres::{error::SqlState, Row};

/// A helper function to map a `tokio_postgres::Row` to an `Endpoint`.
fn row_to_endpoint(row: &Row) -> Result<Endpoint> {
    Ok(Endpoint {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

/// Creates a new endpoint. A duplicate name surfaces as `Conflict`.
pub async fn create(pool: &Pool, id: &str, name: &str) -> Result<Endpoint> {
    let client = pool.get().await?;
    let row = client
        .query_one(
            r#"
            INSERT INTO endpoints (id, name)
            VALUES ($1, $2)
            RETURNING *
            "#,
            &[&id, &name],
        )
        .await
        .map_err(|e| {
            if e.code() == Some(&SqlState::UNIQUE_VIOLATION) {
                AppError::Conflict("An endpoint with this name already exists.".to_string())
            } else {
                AppError::Database(e)
            }
        })?;
    row_to_endpoint(&row)
}

/// Finds an endpoint by its ID.
pub async fn find_by_id(pool: &Pool, endpoint_id: &str) -> Result<Option<Endpoint>> {
    let client = pool.get().await?;
    let row = client
        .query_opt(
            r#"
            SELECT * FROM endpoints WHERE id = $1
            "#,
            &[&endpoint_id],
        )
        .await?;
    row.map(|r| row_to_endpoint(&r)).transpose()
}

/// Finds an endpoint by its unique name.
pub async fn find_by_name(pool: &Pool, name: &str) -> Result<Option<Endpoint>> {
    let client = pool.get().await?;
    let row = client
        .query_opt(
            r#"
            SELECT * FROM endpoints WHERE name = $1
            "#,
            &[&name],
        )
        .await?;
    row.map(|r| row_to_endpoint(&r)).transpose()
}

/// Lists all endpoints.
pub async fn list_all(pool: &Pool) -> Result<Vec<Endpoint>> {
    let client = pool.get().await?;
    let rows = client
        .query(
            r#"
            SELECT * FROM endpoints ORDER BY created_at ASC
            "#,
            &[],
        )
        .await?;
    rows.iter().map(row_to_endpoint).collect()
}

/// Deletes an endpoint by ID. Deletion is restricted while images remain
/// attached; the foreign-key violation surfaces as `Conflict`. Returns
/// `false` if no such endpoint existed.
pub async fn delete(pool: &Pool, endpoint_id: &str) -> Result<bool> {
    let client = pool.get().await?;
    let affected = client
        .execute(
            r#"
            DELETE FROM endpoints WHERE id = $1
            "#,
            &[&endpoint_id],
        )
        .await
        .map_err(|e| {
            if e.code() == Some(&SqlState::FOREIGN_KEY_VIOLATION) {
                AppError::Conflict("This endpoint still has images attached.".to_string())
            } else {
                AppError::Database(e)
            }
        })?;
    Ok(affected > 0)
}
