use chrono::{DateTime, Utc};

/// Represents a user in the system.
#[derive(Clone, Debug)]
pub struct User {
    /// The unique identifier for the user.
    pub id: String,
    /// The user's username.
    pub username: String,
    /// The user's hashed password. Never serialized into responses.
    pub password: String,
    /// The user's role. Stored but not consulted anywhere: any authenticated
    /// user can perform any admin action.
    pub role: i32,
    /// The timestamp when the user was created.
    pub created_at: DateTime<Utc>,
    /// The timestamp when the user was last updated.
    pub updated_at: DateTime<Utc>,
}

/// The identity projection attached to authenticated requests.
#[derive(Clone, Debug)]
pub struct CurrentUser {
    /// The user's ID.
    pub id: String,
    /// The user's username.
    pub username: String,
    /// The user's role.
    pub role: i32,
}
