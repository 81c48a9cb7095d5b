use crate::crypto::tokens;
use crate::error::{AppError, Result};
use crate::models::session::Session;
use crate::models::user::User;
use crate::repositories::session as session_repo;
use crate::repositories::user as user_repo;
use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2, ParamsBuilder,
};
use chrono::Utc;
use deadpool_postgres::Pool;
use rand::{rngs::OsRng, RngCore};
use zeroize::Zeroize;

/// The memory cost for Argon2 in MB.
const ARGON2_MEMORY_MB: u32 = 19;
/// The number of iterations for Argon2.
const ARGON2_ITERATIONS: u32 = 3;
/// The parallelism factor for Argon2.
const ARGON2_PARALLELISM: u32 = 1;

/// Hashes a password using Argon2id.
///
/// # Arguments
///
/// * `password` - The password to hash.
///
/// # Returns
///
/// A `Result` containing the hashed password.
pub fn hash_password(password: &str) -> Result<String> {
    let mut password_bytes = password.as_bytes().to_vec();

    let mut salt_bytes = [0u8; 16];
    OsRng.fill_bytes(&mut salt_bytes);

    let salt = SaltString::encode_b64(&salt_bytes)
        .map_err(|e| AppError::Internal(format!("Salt encoding error: {}", e)))?;

    let argon2 = Argon2::new(
        argon2::Algorithm::Argon2id,
        argon2::Version::V0x13,
        ParamsBuilder::new()
            .m_cost(ARGON2_MEMORY_MB * 1024)
            .t_cost(ARGON2_ITERATIONS)
            .p_cost(ARGON2_PARALLELISM)
            .build()
            .map_err(|e| AppError::Internal(format!("Argon2 params: {}", e)))?,
    );

    let password_hash = argon2
        .hash_password(&password_bytes, &salt)
        .map_err(|e| AppError::Internal(format!("Argon2 hash error: {}", e)))?
        .to_string();

    password_bytes.zeroize();
    tracing::debug!("Password hashed with Argon2id");
    Ok(password_hash)
}

/// Verifies a password against a hash.
///
/// # Arguments
///
/// * `password` - The password to verify.
/// * `hash` - The hash to verify against.
///
/// # Returns
///
/// A `Result` containing `true` if the password is valid, `false` otherwise.
pub fn verify_password(password: &str, hash: &str) -> Result<bool> {
    let mut password_bytes = password.as_bytes().to_vec();
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|e| AppError::Internal(format!("Hash parse error: {}", e)))?;
    let result = Argon2::default()
        .verify_password(&password_bytes, &parsed_hash)
        .is_ok();

    password_bytes.zeroize();
    Ok(result)
}

/// Computes the absolute expiry for a session issued now.
fn expiry_from_now(ttl_secs: i64) -> i64 {
    Utc::now().timestamp() + ttl_secs
}

/// True when an absolute expiry is at or before `now`. A session is live
/// strictly until its expiry second.
fn is_expired(expires_at: i64, now: i64) -> bool {
    expires_at <= now
}

/// Authenticates a user and issues a session with two independently
/// generated opaque tokens. Replaces the user's previous session, if any.
///
/// An unknown username and a wrong password both produce
/// `InvalidCredentials` so login reveals nothing about which usernames
/// exist.
pub async fn login(db: &Pool, username: &str, password: &str, ttl_secs: i64) -> Result<Session> {
    tracing::debug!("Login attempt for {}", username);

    let user = user_repo::find_by_username(db, username)
        .await?
        .ok_or(AppError::InvalidCredentials)?;

    if !verify_password(password, &user.password)? {
        return Err(AppError::InvalidCredentials);
    }

    let session = session_repo::replace_for_user(
        db,
        &tokens::generate_id(),
        &user.id,
        &tokens::generate_token(),
        &tokens::generate_token(),
        expiry_from_now(ttl_secs),
    )
    .await?;

    tracing::info!("User {} logged in", user.id);
    Ok(session)
}

/// Rotates the access token of the session identified by `refresh_token`
/// and pushes out its expiry. The refresh token itself is not rotated.
pub async fn refresh(db: &Pool, refresh_token: &str, ttl_secs: i64) -> Result<Session> {
    let session = session_repo::find_by_refresh_token(db, refresh_token)
        .await?
        .ok_or(AppError::InvalidToken)?;

    let session = session_repo::rotate_access_token(
        db,
        &session.id,
        &tokens::generate_token(),
        expiry_from_now(ttl_secs),
    )
    .await?;

    tracing::info!("Access token rotated for user {}", session.user_id);
    Ok(session)
}

/// Resolves an access token to its session and owning user. Returns `None`
/// for an unknown token, an expired session, or an orphaned session whose
/// user no longer exists.
pub async fn validate(db: &Pool, access_token: &str) -> Result<Option<(Session, User)>> {
    let Some(session) = session_repo::find_by_access_token(db, access_token).await? else {
        return Ok(None);
    };

    if is_expired(session.expires_at, Utc::now().timestamp()) {
        tracing::debug!("Rejected expired session for user {}", session.user_id);
        return Ok(None);
    }

    let Some(user) = user_repo::find_by_id(db, &session.user_id).await? else {
        return Ok(None);
    };

    Ok(Some((session, user)))
}

/// Creates a new user with a hashed password.
pub async fn create_user(db: &Pool, username: &str, password: &str, role: i32) -> Result<User> {
    let hashed_password = hash_password(password)?;
    let user = user_repo::create(db, &tokens::generate_id(), username, &hashed_password, role).await?;
    tracing::info!("User created with ID {}", user.id);
    Ok(user)
}

/// Creates the bootstrap `admin`/`admin` user if no user with that name
/// exists yet. Returns the created user, or `None` when it already existed.
pub async fn bootstrap_admin(db: &Pool) -> Result<Option<User>> {
    if user_repo::find_by_username(db, "admin").await?.is_some() {
        return Ok(None);
    }
    let user = create_user(db, "admin", "admin", 0).await?;
    Ok(Some(user))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_accepts_the_original_plaintext() {
        let hash = hash_password("correct horse battery staple").unwrap();
        assert!(verify_password("correct horse battery staple", &hash).unwrap());
    }

    #[test]
    fn verify_rejects_any_other_string() {
        let hash = hash_password("hunter2").unwrap();
        assert!(!verify_password("hunter3", &hash).unwrap());
        assert!(!verify_password("", &hash).unwrap());
        assert!(!verify_password("hunter2 ", &hash).unwrap());
    }

    #[test]
    fn hashes_are_salted() {
        let a = hash_password("same password").unwrap();
        let b = hash_password("same password").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn expiry_is_in_the_future() {
        let exp = expiry_from_now(3600);
        let now = Utc::now().timestamp();
        assert!(exp > now);
        assert!(exp <= now + 3601);
    }

    #[test]
    fn past_expiries_are_rejected() {
        assert!(is_expired(999, 1000));
        assert!(is_expired(0, 1000));
    }

    #[test]
    fn expiry_boundary_counts_as_expired() {
        assert!(is_expired(1000, 1000));
        assert!(!is_expired(1001, 1000));
    }

    #[test]
    fn freshly_issued_sessions_are_live_and_zero_ttl_sessions_are_not() {
        let now = Utc::now().timestamp();
        assert!(!is_expired(expiry_from_now(3600), now));
        assert!(is_expired(expiry_from_now(0), now));
    }
}
