use serde::{Deserialize, Serialize};

use super::NoteId;

/// A note as seen by the auto-tagging core.
///
/// The host tracks many more fields per note (geolocation, encryption state,
/// markup language and so on); the core only ever reads the ID, the title
/// for display and the body for matching, so only those are modeled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    /// Opaque identifier assigned by the host.
    pub id: NoteId,
    /// The note's title, used for display in batch results.
    pub title: String,
    /// The note's full text body.
    pub body: String,
}

impl Note {
    /// Creates a new note record.
    pub fn new(id: NoteId, title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            body: body.into(),
        }
    }
}
