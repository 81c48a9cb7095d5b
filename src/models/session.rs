use chrono::{DateTime, Utc};

/// Represents a user session. Exactly one live session exists per user;
/// logging in again replaces the previous one.
#[derive(Clone, Debug)]
pub struct Session {
    /// The unique identifier for the session.
    pub id: String,
    /// The ID of the user this session belongs to.
    pub user_id: String,
    /// The opaque bearer token presented on each authenticated request.
    /// Rotated on refresh.
    pub access_token: String,
    /// The opaque token used to mint a new access token. Not rotated.
    pub refresh_token: String,
    /// Absolute expiry of the access token, epoch seconds. Enforced during
    /// validation.
    pub expires_at: i64,
    /// The timestamp when the session was created.
    pub created_at: DateTime<Utc>,
}
