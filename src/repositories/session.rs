use crate::{error::Result, models::session::Session};
use deadpool_postgres::Pool;
use tokio_postgres::Row;

/// A helper function to map a `tokio_postgres::Row` to a `Session`.
fn row_to_session(row: &Row) -> Result<Session> {
    Ok(Session {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        access_token: row.try_get("access_token")?,
        refresh_token: row.try_get("refresh_token")?,
        expires_at: row.try_get("expires_at")?,
        created_at: row.try_get("created_at")?,
    })
}

/// Creates a session for a user, replacing any existing one. The UNIQUE
/// constraint on `user_id` makes login revoke-on-login: the previous
/// session's tokens stop resolving the moment the new one lands.
pub async fn replace_for_user(
    pool: &Pool,
    id: &str,
    user_id: &str,
    access_token: &str,
    refresh_token: &str,
    expires_at: i64,
) -> Result<Session> {
    let client = pool.get().await?;
    let row = client
        .query_one(
            r#"
            INSERT INTO sessions (id, user_id, access_token, refresh_token, expires_at)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (user_id) DO UPDATE
            SET access_token = EXCLUDED.access_token,
                refresh_token = EXCLUDED.refresh_token,
                expires_at = EXCLUDED.expires_at
            RETURNING *
            "#,
            &[&id, &user_id, &access_token, &refresh_token, &expires_at],
        )
        .await?;
    row_to_session(&row)
}

/// Finds a session by its access token.
pub async fn find_by_access_token(pool: &Pool, access_token: &str) -> Result<Option<Session>> {
    let client = pool.get().await?;
    let row = client
        .query_opt(
            r#"
            SELECT * FROM sessions WHERE access_token = $1
            "#,
            &[&access_token],
        )
        .await?;
    row.map(|r| row_to_session(&r)).transpose()
}

/// Finds a session by its refresh token.
pub async fn find_by_refresh_token(pool: &Pool, refresh_token: &str) -> Result<Option<Session>> {
    let client = pool.get().await?;
    let row = client
        .query_opt(
            r#"
            SELECT * FROM sessions WHERE refresh_token = $1
            "#,
            &[&refresh_token],
        )
        .await?;
    row.map(|r| row_to_session(&r)).transpose()
}

/// Rotates a session's access token and pushes out its expiry. The refresh
/// token is left as-is.
pub async fn rotate_access_token(
    pool: &Pool,
    session_id: &str,
    access_token: &str,
    expires_at: i64,
) -> Result<Session> {
    let client = pool.get().await?;
    let row = client
        .query_one(
            r#"
            UPDATE sessions
            SET access_token = $2, expires_at = $3
            WHERE id = $1
            RETURNING *
            "#,
            &[&session_id, &access_token, &expires_at],
        )
        .await?;
    row_to_session(&row)
}
