//! Reconciliation of candidate tag titles against the host's tag registry.
//!
//! The matcher produces bare tag titles; this module resolves them to real
//! tag records (creating missing ones when allowed), applies them to notes
//! and computes the actually-new subset for reporting.

use std::collections::HashSet;
use std::sync::Arc;

use anyhow::Result;
use log::debug;

use crate::host::{HostApi, TAG_PAGE_SIZE};
use crate::models::{NoteId, Tag};

/// Resolves candidate tag titles to tag records and manages note-tag links.
pub struct TagReconciler {
    host: Arc<dyn HostApi>,
}

impl TagReconciler {
    /// Creates a reconciler backed by the given host.
    pub fn new(host: Arc<dyn HostApi>) -> Self {
        Self { host }
    }

    /// Maps candidate titles to real tag records.
    ///
    /// Fetches the complete tag registry, then creates one tag per
    /// unmatched title (sequentially, one host call each) when
    /// `create_missing` is set. Title matching is exact and
    /// case-sensitive. With `create_missing` unset, unmatched titles are
    /// silently dropped; that is a no-op condition, not an error.
    pub fn reconcile(&self, candidates: &[String], create_missing: bool) -> Result<Vec<Tag>> {
        let mut registry = self.fetch_all_tags()?;

        let missing: Vec<String> = candidates
            .iter()
            .filter(|title| !registry.iter().any(|tag| &tag.title == *title))
            .cloned()
            .collect();

        if create_missing {
            for title in &missing {
                let created = self.host.create_tag(title)?;
                debug!("created missing tag `{}` ({})", created.title, created.id);
                registry.push(created);
            }
        } else if !missing.is_empty() {
            debug!(
                "{} candidate tag(s) have no registry entry and tag creation is off",
                missing.len()
            );
        }

        Ok(registry
            .into_iter()
            .filter(|tag| candidates.contains(&tag.title))
            .collect())
    }

    /// Attaches `tags` to the note and returns only the ones that were not
    /// already attached.
    ///
    /// Every tag is attached, including ones already on the note; the host's
    /// attach is idempotent. The returned delta is what batch results
    /// report to the user.
    pub fn apply_tags(&self, note_id: &NoteId, tags: &[Tag]) -> Result<Vec<Tag>> {
        let current: HashSet<_> = self
            .fetch_note_tags(note_id)?
            .into_iter()
            .map(|tag| tag.id)
            .collect();

        for tag in tags {
            self.host.attach_tag(&tag.id, note_id)?;
        }

        Ok(tags
            .iter()
            .filter(|tag| !current.contains(&tag.id))
            .cloned()
            .collect())
    }

    /// Detaches each tag from the note. Used by the batch-review flow to
    /// undo a single added tag.
    pub fn remove_tags(&self, note_id: &NoteId, tags: &[Tag]) -> Result<()> {
        for tag in tags {
            self.host.detach_tag(&tag.id, note_id)?;
            debug!("detached tag `{}` from note {}", tag.title, note_id);
        }
        Ok(())
    }

    /// Looks a single tag up by title through the host's search endpoint.
    pub fn tag_exists(&self, title: &str) -> Result<Option<Tag>> {
        Ok(self.host.search_tag(title)?)
    }

    /// Reads the complete tag registry, page by page.
    pub fn fetch_all_tags(&self) -> Result<Vec<Tag>> {
        let mut tags = Vec::new();
        let mut page = 1;

        loop {
            let result = self.host.get_all_tags(page, TAG_PAGE_SIZE)?;
            tags.extend(result.items);
            if !result.has_more {
                break;
            }
            page += 1;
        }

        Ok(tags)
    }

    /// Reads every tag attached to one note, page by page.
    pub fn fetch_note_tags(&self, note_id: &NoteId) -> Result<Vec<Tag>> {
        let mut tags = Vec::new();
        let mut page = 1;

        loop {
            let result = self.host.get_note_tags(note_id, page, TAG_PAGE_SIZE)?;
            tags.extend(result.items);
            if !result.has_more {
                break;
            }
            page += 1;
        }

        Ok(tags)
    }
}
