use chrono::{DateTime, Utc};

/// Represents a stored image. The bytes live on disk under the configured
/// images directory; this row carries the filename and attribution metadata.
#[derive(Clone, Debug)]
pub struct Image {
    /// The unique identifier for the image.
    pub id: String,
    /// The ID of the endpoint this image belongs to.
    pub endpoint_id: String,
    /// The filename on local storage.
    pub filename: String,
    /// Where the image came from.
    pub source: Option<String>,
    /// The artist's name.
    pub artist_name: Option<String>,
    /// A link to the artist.
    pub artist_link: Option<String>,
    /// The timestamp when the image was created.
    pub created_at: DateTime<Utc>,
    /// The timestamp when the image was last updated.
    pub updated_at: DateTime<Utc>,
}
