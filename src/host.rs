//! Host application interface.
//!
//! This module defines the seam between the auto-tagging core and the note
//! application hosting it. The host owns all persistent data (notes, tags,
//! note-tag links, settings); the core reaches it exclusively through the
//! `HostApi` trait so it can be exercised against mocks and the bundled
//! in-memory implementation.

mod memory;

pub use memory::MemoryHost;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{Note, NoteId, Tag, TagId};

/// Page size used for note traversal, matching the host's pagination sweet
/// spot for body-carrying reads.
pub const NOTE_PAGE_SIZE: u32 = 100;

/// Page size used for tag-registry and note-tag reads.
pub const TAG_PAGE_SIZE: u32 = 20;

/// Errors surfaced by host API calls.
///
/// Host failures are not locally recovered; they propagate and abort the
/// operation that issued the call.
#[derive(Debug, Error)]
pub enum HostError {
    /// A referenced note or tag does not exist.
    #[error("{kind} not found: {id}")]
    NotFound {
        kind: &'static str,
        id: String,
    },

    /// Storage or transport failure inside the host.
    #[error("host storage error: {0}")]
    Storage(String),

    /// A stored value could not be decoded.
    #[error("host serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// One page of a paginated read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    /// The records on this page.
    pub items: Vec<T>,
    /// Whether another page follows.
    pub has_more: bool,
}

impl<T> Page<T> {
    /// An empty final page.
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            has_more: false,
        }
    }
}

/// Query parameters for a paginated note read.
///
/// Pages are 1-indexed, as in the host API. The default query is the one
/// the batch runner uses: pages of 100, id/title/body only, ordered by
/// creation time ascending.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteQuery {
    /// 1-indexed page number.
    pub page: u32,
    /// Maximum records per page.
    pub limit: u32,
    /// Field names the caller wants populated.
    pub fields: Vec<String>,
    /// Sort field.
    pub order_by: String,
    /// Sort direction, `ASC` or `DESC`.
    pub order_dir: String,
}

impl NoteQuery {
    /// The batch-traversal query for the given page.
    pub fn batch_page(page: u32) -> Self {
        Self {
            page,
            limit: NOTE_PAGE_SIZE,
            fields: vec!["id".into(), "title".into(), "body".into()],
            order_by: "created_time".into(),
            order_dir: "ASC".into(),
        }
    }
}

/// Callback invoked when the open note changes (switch or edit), with the
/// ID of the note now open.
pub type NoteChangedHandler = Box<dyn Fn(NoteId) + Send + Sync>;

/// Callback invoked after any plugin setting changes.
pub type SettingsChangedHandler = Box<dyn Fn() + Send + Sync>;

/// The host application's data and workspace API.
///
/// All reads are paginated with 1-indexed pages. Implementations must be
/// shareable across the batch worker thread and event handlers.
pub trait HostApi: Send + Sync {
    /// Paginated note read.
    fn get_notes(&self, query: &NoteQuery) -> Result<Page<Note>, HostError>;

    /// Paginated read of the complete tag registry.
    fn get_all_tags(&self, page: u32, limit: u32) -> Result<Page<Tag>, HostError>;

    /// Paginated read of the tags attached to one note.
    fn get_note_tags(
        &self,
        note_id: &NoteId,
        page: u32,
        limit: u32,
    ) -> Result<Page<Tag>, HostError>;

    /// Looks a tag up by title through the host's search endpoint.
    fn search_tag(&self, title: &str) -> Result<Option<Tag>, HostError>;

    /// Creates a new tag with the given title.
    fn create_tag(&self, title: &str) -> Result<Tag, HostError>;

    /// Attaches a tag to a note. Attaching an already-attached tag is a
    /// no-op, not an error.
    fn attach_tag(&self, tag_id: &TagId, note_id: &NoteId) -> Result<(), HostError>;

    /// Detaches a tag from a note.
    fn detach_tag(&self, tag_id: &TagId, note_id: &NoteId) -> Result<(), HostError>;

    /// The note currently open in the host, if any.
    fn selected_note(&self) -> Result<Option<Note>, HostError>;

    /// Reads one value from the host's settings store.
    fn setting(&self, key: &str) -> Result<Option<String>, HostError>;

    /// Writes one value to the host's settings store.
    fn set_setting(&self, key: &str, value: &str) -> Result<(), HostError>;

    /// Asks the host to open the given note in its editor.
    fn open_note(&self, note_id: &NoteId) -> Result<(), HostError>;

    /// Registers a note-change callback.
    ///
    /// Hosts that never emit events (mocks, one-shot embeddings) may keep
    /// the default, which drops the registration.
    fn on_note_changed(&self, handler: NoteChangedHandler) -> Result<(), HostError> {
        let _ = handler;
        Ok(())
    }

    /// Registers a settings-change callback. Same default as
    /// [`HostApi::on_note_changed`].
    fn on_settings_changed(&self, handler: SettingsChangedHandler) -> Result<(), HostError> {
        let _ = handler;
        Ok(())
    }
}
