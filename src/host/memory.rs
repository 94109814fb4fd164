use std::collections::BTreeMap;
use std::sync::Mutex;

use crate::models::{Note, NoteId, Tag, TagId};

use super::{HostApi, HostError, NoteChangedHandler, NoteQuery, Page, SettingsChangedHandler};

/// In-memory implementation of [`HostApi`].
///
/// Backs the integration tests and lets the engine be embedded without a
/// real host. Notes keep insertion order, which doubles as creation order
/// for the batch runner's `created_time ASC` traversal.
///
/// Handlers live outside `inner` so they can call back into the host while
/// they run.
pub struct MemoryHost {
    inner: Mutex<Inner>,
    note_handlers: Mutex<Vec<NoteChangedHandler>>,
    settings_handlers: Mutex<Vec<SettingsChangedHandler>>,
}

#[derive(Default)]
struct Inner {
    notes: Vec<Note>,
    tags: Vec<Tag>,
    /// note id -> attached tag ids, in attach order.
    links: BTreeMap<NoteId, Vec<TagId>>,
    settings: BTreeMap<String, String>,
    selected: Option<NoteId>,
    opened: Vec<NoteId>,
    next_tag_id: u64,
}

impl MemoryHost {
    /// Creates an empty host workspace.
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner::default()),
            note_handlers: Mutex::new(Vec::new()),
            settings_handlers: Mutex::new(Vec::new()),
        }
    }

    /// Adds a note to the workspace and returns its ID.
    pub fn seed_note(&self, title: &str, body: &str) -> NoteId {
        let mut inner = self.inner.lock().unwrap();
        let id = NoteId::new(format!("note-{}", inner.notes.len() + 1));
        inner.notes.push(Note::new(id.clone(), title, body));
        id
    }

    /// Adds a tag to the registry and returns it.
    pub fn seed_tag(&self, title: &str) -> Tag {
        let mut inner = self.inner.lock().unwrap();
        inner.mint_tag(title)
    }

    /// Marks a note as the one open in the editor and fires note-changed
    /// handlers, like a real host does when the user switches notes.
    pub fn select_note(&self, note_id: Option<NoteId>) {
        self.inner.lock().unwrap().selected = note_id.clone();
        if let Some(id) = note_id {
            for handler in self.note_handlers.lock().unwrap().iter() {
                handler(id.clone());
            }
        }
    }

    /// Titles of the tags attached to a note, in attach order.
    pub fn attached_titles(&self, note_id: &NoteId) -> Vec<String> {
        let inner = self.inner.lock().unwrap();
        let Some(tag_ids) = inner.links.get(note_id) else {
            return Vec::new();
        };
        tag_ids
            .iter()
            .filter_map(|id| inner.tags.iter().find(|tag| &tag.id == id))
            .map(|tag| tag.title.clone())
            .collect()
    }

    /// Number of tags in the registry.
    pub fn tag_count(&self) -> usize {
        self.inner.lock().unwrap().tags.len()
    }

    /// Note IDs the host was asked to open, in call order.
    pub fn opened_notes(&self) -> Vec<NoteId> {
        self.inner.lock().unwrap().opened.clone()
    }
}

impl Default for MemoryHost {
    fn default() -> Self {
        Self::new()
    }
}

impl Inner {
    fn mint_tag(&mut self, title: &str) -> Tag {
        self.next_tag_id += 1;
        let tag = Tag::new(TagId::new(format!("tag-{}", self.next_tag_id)), title);
        self.tags.push(tag.clone());
        tag
    }

    fn note_exists(&self, note_id: &NoteId) -> bool {
        self.notes.iter().any(|note| &note.id == note_id)
    }

    fn tag_exists(&self, tag_id: &TagId) -> bool {
        self.tags.iter().any(|tag| &tag.id == tag_id)
    }
}

/// Slices one 1-indexed page out of a full record list.
fn paginate<T: Clone>(items: &[T], page: u32, limit: u32) -> Page<T> {
    if page == 0 || limit == 0 {
        return Page::empty();
    }
    let start = (page as usize - 1) * limit as usize;
    if start >= items.len() {
        return Page::empty();
    }
    let end = (start + limit as usize).min(items.len());
    Page {
        items: items[start..end].to_vec(),
        has_more: end < items.len(),
    }
}

impl HostApi for MemoryHost {
    fn get_notes(&self, query: &NoteQuery) -> Result<Page<Note>, HostError> {
        let inner = self.inner.lock().unwrap();
        Ok(paginate(&inner.notes, query.page, query.limit))
    }

    fn get_all_tags(&self, page: u32, limit: u32) -> Result<Page<Tag>, HostError> {
        let inner = self.inner.lock().unwrap();
        Ok(paginate(&inner.tags, page, limit))
    }

    fn get_note_tags(
        &self,
        note_id: &NoteId,
        page: u32,
        limit: u32,
    ) -> Result<Page<Tag>, HostError> {
        let inner = self.inner.lock().unwrap();
        let attached: Vec<Tag> = inner
            .links
            .get(note_id)
            .map(|tag_ids| {
                tag_ids
                    .iter()
                    .filter_map(|id| inner.tags.iter().find(|tag| &tag.id == id))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        Ok(paginate(&attached, page, limit))
    }

    fn search_tag(&self, title: &str) -> Result<Option<Tag>, HostError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.tags.iter().find(|tag| tag.title == title).cloned())
    }

    fn create_tag(&self, title: &str) -> Result<Tag, HostError> {
        let mut inner = self.inner.lock().unwrap();
        Ok(inner.mint_tag(title))
    }

    fn attach_tag(&self, tag_id: &TagId, note_id: &NoteId) -> Result<(), HostError> {
        let mut inner = self.inner.lock().unwrap();
        if !inner.tag_exists(tag_id) {
            return Err(HostError::NotFound {
                kind: "tag",
                id: tag_id.to_string(),
            });
        }
        if !inner.note_exists(note_id) {
            return Err(HostError::NotFound {
                kind: "note",
                id: note_id.to_string(),
            });
        }
        let attached = inner.links.entry(note_id.clone()).or_default();
        if !attached.contains(tag_id) {
            attached.push(tag_id.clone());
        }
        Ok(())
    }

    fn detach_tag(&self, tag_id: &TagId, note_id: &NoteId) -> Result<(), HostError> {
        let mut inner = self.inner.lock().unwrap();
        if let Some(attached) = inner.links.get_mut(note_id) {
            attached.retain(|id| id != tag_id);
        }
        Ok(())
    }

    fn selected_note(&self) -> Result<Option<Note>, HostError> {
        let inner = self.inner.lock().unwrap();
        let Some(selected) = &inner.selected else {
            return Ok(None);
        };
        Ok(inner.notes.iter().find(|note| &note.id == selected).cloned())
    }

    fn setting(&self, key: &str) -> Result<Option<String>, HostError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.settings.get(key).cloned())
    }

    fn set_setting(&self, key: &str, value: &str) -> Result<(), HostError> {
        {
            let mut inner = self.inner.lock().unwrap();
            inner.settings.insert(key.to_string(), value.to_string());
        }
        for handler in self.settings_handlers.lock().unwrap().iter() {
            handler();
        }
        Ok(())
    }

    fn open_note(&self, note_id: &NoteId) -> Result<(), HostError> {
        let mut inner = self.inner.lock().unwrap();
        if !inner.note_exists(note_id) {
            return Err(HostError::NotFound {
                kind: "note",
                id: note_id.to_string(),
            });
        }
        inner.opened.push(note_id.clone());
        Ok(())
    }

    fn on_note_changed(&self, handler: NoteChangedHandler) -> Result<(), HostError> {
        self.note_handlers.lock().unwrap().push(handler);
        Ok(())
    }

    fn on_settings_changed(&self, handler: SettingsChangedHandler) -> Result<(), HostError> {
        self.settings_handlers.lock().unwrap().push(handler);
        Ok(())
    }
}
