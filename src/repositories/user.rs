use crate::{
    error::{AppError, Result},
    models::user::User,
};
use deadpool_postgres::Pool;
use tokio_postgres::{error::SqlState, Row};

/// A helper function to map a `tokio_postgres::Row` to a `User`.
fn row_to_user(row: &Row) -> Result<User> {
    Ok(User {
        id: row.try_get("id")?,
        username: row.try_get("username")?,
        password: row.try_get("password")?,
        role: row.try_get("role")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

/// Creates a new user. The unique constraint on `username` closes the
/// check-then-create race; a violation surfaces as `Conflict`.
pub async fn create(
    pool: &Pool,
    id: &str,
    username: &str,
    password_hash: &str,
    role: i32,
) -> Result<User> {
    let client = pool.get().await?;
    let row = client
        .query_one(
            r#"
            INSERT INTO users (id, username, password, role)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
            &[&id, &username, &password_hash, &role],
        )
        .await
        .map_err(|e| {
            if e.code() == Some(&SqlState::UNIQUE_VIOLATION) {
                AppError::Conflict("This user already exists.".to_string())
            } else {
                AppError::Database(e)
            }
        })?;
    row_to_user(&row)
}

/// Finds a user by their username.
pub async fn find_by_username(pool: &Pool, username: &str) -> Result<Option<User>> {
    let client = pool.get().await?;
    let row = client
        .query_opt(
            r#"
            SELECT * FROM users WHERE username = $1
            "#,
            &[&username],
        )
        .await?;
    row.map(|r| row_to_user(&r)).transpose()
}

/// Finds a user by their ID.
pub async fn find_by_id(pool: &Pool, user_id: &str) -> Result<Option<User>> {
    let client = pool.get().await?;
    let row = client
        .query_opt(
            r#"
            SELECT * FROM users WHERE id = $1
            "#,
            &[&user_id],
        )
        .await?;
    row.map(|r| row_to_user(&r)).transpose()
}

/// Lists all users.
pub async fn list_all(pool: &Pool) -> Result<Vec<User>> {
    let client = pool.get().await?;
    let rows = client
        .query(
            r#"
            SELECT * FROM users ORDER BY created_at ASC
            "#,
            &[],
        )
        .await?;
    rows.iter().map(row_to_user).collect()
}

/// Deletes a user by ID. The user's session, if any, cascades away with the
/// row. Returns `false` if no such user existed.
pub async fn delete(pool: &Pool, user_id: &str) -> Result<bool> {
    let client = pool.get().await?;
    let affected = client
        .execute(
            r#"
            DELETE FROM users WHERE id = $1
            "#,
            &[&user_id],
        )
        .await?;
    Ok(affected > 0)
}
