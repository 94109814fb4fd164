use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use super::TagId;

/// A tag record from the host's tag registry.
///
/// Identity is the `id`; uniqueness of meaning is the `title`, compared
/// exactly and case-sensitively. Two tags whose titles differ only in case
/// are distinct tags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    /// Opaque identifier assigned by the host.
    pub id: TagId,
    /// The tag's display title.
    pub title: String,
    /// When the tag was created.
    #[serde(with = "time::serde::rfc3339")]
    pub created_time: OffsetDateTime,
    /// When the tag was last updated.
    #[serde(with = "time::serde::rfc3339")]
    pub updated_time: OffsetDateTime,
}

impl Tag {
    /// Creates a tag with both timestamps set to now.
    pub fn new(id: TagId, title: impl Into<String>) -> Self {
        let now = OffsetDateTime::now_utc();
        Self {
            id,
            title: title.into(),
            created_time: now,
            updated_time: now,
        }
    }
}
