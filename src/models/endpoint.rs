use chrono::{DateTime, Utc};

/// A named bucket of images (e.g. "cats"). Unrelated to the network route
/// concept.
#[derive(Clone, Debug)]
pub struct Endpoint {
    /// The unique identifier for the endpoint.
    pub id: String,
    /// The endpoint's unique name.
    pub name: String,
    /// The timestamp when the endpoint was created.
    pub created_at: DateTime<Utc>,
    /// The timestamp when the endpoint was last updated.
    pub updated_at: DateTime<Utc>,
}
