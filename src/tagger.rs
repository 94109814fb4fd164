//! Single-note auto-tagging.
//!
//! Composes the matcher and the reconciler for one note: load the current
//! rules, find candidate tag titles in the body, resolve them to tag
//! records and attach the net-new ones.

use std::sync::Arc;

use anyhow::Result;
use log::{debug, info};

use crate::host::HostApi;
use crate::matcher::find_tags;
use crate::models::{Note, Tag};
use crate::reconciler::TagReconciler;
use crate::settings::Settings;

/// Applies the configured word rules to individual notes.
pub struct AutoTagger {
    host: Arc<dyn HostApi>,
    reconciler: TagReconciler,
}

impl AutoTagger {
    /// Creates an auto-tagger backed by the given host.
    pub fn new(host: Arc<dyn HostApi>) -> Self {
        let reconciler = TagReconciler::new(host.clone());
        Self { host, reconciler }
    }

    /// Auto-tags one note and returns the tags that were newly attached.
    ///
    /// `None` is a no-op, not an error. When no rule matches the body the
    /// call returns early without touching the host: no registry fetch, no
    /// tag creation, no attach calls. That short circuit is part of the
    /// contract, not just an optimization.
    ///
    /// Settings are re-read on every call so rule edits take effect
    /// immediately.
    pub fn auto_tag_note(&self, note: Option<&Note>) -> Result<Vec<Tag>> {
        let Some(note) = note else {
            return Ok(Vec::new());
        };

        let settings = Settings::collect(self.host.as_ref())?;
        let candidates = find_tags(&note.body, &settings.stored_words)?;

        if candidates.is_empty() {
            debug!("no rule matched note {}", note.id);
            return Ok(Vec::new());
        }

        let titles: Vec<String> = candidates.into_iter().collect();
        let tags = self
            .reconciler
            .reconcile(&titles, settings.create_missing_tags)?;
        let added = self.reconciler.apply_tags(&note.id, &tags)?;

        if !added.is_empty() {
            info!("added {} tag(s) to note {}", added.len(), note.id);
        }
        Ok(added)
    }

    /// Auto-tags whichever note the user currently has open.
    ///
    /// Bound to the host's note-change event, which fires on every switch
    /// and edit. There is no debouncing here; rapid edits run it
    /// redundantly. Callers wanting coalescing should go through
    /// [`ChangeScheduler`](crate::scheduler::ChangeScheduler).
    pub fn auto_tag_current_note(&self) -> Result<Vec<Tag>> {
        let note = self.host.selected_note()?;
        self.auto_tag_note(note.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::host::{HostError, MemoryHost, NoteQuery, Page};
    use crate::matcher::MatchError;
    use crate::models::{NoteId, TagId, WordRule};
    use crate::settings::keys;

    fn store_rules(host: &MemoryHost, rules: &[WordRule]) {
        host.set_setting(keys::STORED_WORDS, &serde_json::to_string(rules).unwrap())
            .unwrap();
    }

    fn rule(word: &str, case_sensitive: bool, tags: &[&str]) -> WordRule {
        WordRule::new(word, case_sensitive, tags.iter().copied()).unwrap()
    }

    /// Host wrapper that counts registry reads and writes, so the
    /// empty-candidate short circuit is observable.
    struct CountingHost {
        inner: MemoryHost,
        registry_reads: AtomicUsize,
        creations: AtomicUsize,
        attaches: AtomicUsize,
    }

    impl CountingHost {
        fn new() -> Self {
            Self {
                inner: MemoryHost::new(),
                registry_reads: AtomicUsize::new(0),
                creations: AtomicUsize::new(0),
                attaches: AtomicUsize::new(0),
            }
        }
    }

    impl HostApi for CountingHost {
        fn get_notes(&self, query: &NoteQuery) -> Result<Page<Note>, HostError> {
            self.inner.get_notes(query)
        }

        fn get_all_tags(&self, page: u32, limit: u32) -> Result<Page<Tag>, HostError> {
            self.registry_reads.fetch_add(1, Ordering::SeqCst);
            self.inner.get_all_tags(page, limit)
        }

        fn get_note_tags(
            &self,
            note_id: &NoteId,
            page: u32,
            limit: u32,
        ) -> Result<Page<Tag>, HostError> {
            self.inner.get_note_tags(note_id, page, limit)
        }

        fn search_tag(&self, title: &str) -> Result<Option<Tag>, HostError> {
            self.inner.search_tag(title)
        }

        fn create_tag(&self, title: &str) -> Result<Tag, HostError> {
            self.creations.fetch_add(1, Ordering::SeqCst);
            self.inner.create_tag(title)
        }

        fn attach_tag(&self, tag_id: &TagId, note_id: &NoteId) -> Result<(), HostError> {
            self.attaches.fetch_add(1, Ordering::SeqCst);
            self.inner.attach_tag(tag_id, note_id)
        }

        fn detach_tag(&self, tag_id: &TagId, note_id: &NoteId) -> Result<(), HostError> {
            self.inner.detach_tag(tag_id, note_id)
        }

        fn selected_note(&self) -> Result<Option<Note>, HostError> {
            self.inner.selected_note()
        }

        fn setting(&self, key: &str) -> Result<Option<String>, HostError> {
            self.inner.setting(key)
        }

        fn set_setting(&self, key: &str, value: &str) -> Result<(), HostError> {
            self.inner.set_setting(key, value)
        }

        fn open_note(&self, note_id: &NoteId) -> Result<(), HostError> {
            self.inner.open_note(note_id)
        }
    }

    #[test]
    fn absent_note_is_a_no_op() {
        let host = Arc::new(MemoryHost::new());
        let tagger = AutoTagger::new(host);

        let added = tagger.auto_tag_note(None).unwrap();
        assert!(added.is_empty());
    }

    #[test]
    fn no_matching_rule_issues_no_host_writes() {
        let host = Arc::new(CountingHost::new());
        let note_id = host.inner.seed_note("n", "nothing of interest");
        store_rules(&host.inner, &[rule("unmatched", false, &["tag"])]);
        let note = Note::new(note_id, "n", "nothing of interest");
        let tagger = AutoTagger::new(host.clone());

        let added = tagger.auto_tag_note(Some(&note)).unwrap();

        assert!(added.is_empty());
        assert_eq!(host.registry_reads.load(Ordering::SeqCst), 0);
        assert_eq!(host.creations.load(Ordering::SeqCst), 0);
        assert_eq!(host.attaches.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn matching_rule_creates_and_attaches_tags() {
        let host = Arc::new(MemoryHost::new());
        let note_id = host.seed_note("Bills", "Please pay this Invoice by Friday");
        store_rules(&host, &[rule("invoice", false, &["finance", "todo"])]);
        let note = Note::new(note_id.clone(), "Bills", "Please pay this Invoice by Friday");
        let tagger = AutoTagger::new(host.clone());

        let added = tagger.auto_tag_note(Some(&note)).unwrap();

        let mut titles: Vec<String> = added.iter().map(|t| t.title.clone()).collect();
        titles.sort_unstable();
        assert_eq!(titles, vec!["finance", "todo"]);
        assert_eq!(host.tag_count(), 2);

        let mut attached = host.attached_titles(&note_id);
        attached.sort_unstable();
        assert_eq!(attached, vec!["finance", "todo"]);
    }

    #[test]
    fn second_run_on_unchanged_note_adds_nothing() {
        let host = Arc::new(MemoryHost::new());
        let note_id = host.seed_note("n", "the invoice arrived");
        store_rules(&host, &[rule("invoice", false, &["finance"])]);
        let note = Note::new(note_id, "n", "the invoice arrived");
        let tagger = AutoTagger::new(host.clone());

        let first = tagger.auto_tag_note(Some(&note)).unwrap();
        assert_eq!(first.len(), 1);

        let second = tagger.auto_tag_note(Some(&note)).unwrap();
        assert!(second.is_empty());
    }

    #[test]
    fn creation_gate_drops_missing_tags() {
        let host = Arc::new(MemoryHost::new());
        let note_id = host.seed_note("n", "the invoice arrived");
        store_rules(&host, &[rule("invoice", false, &["finance"])]);
        host.set_setting(keys::CREATE_MISSING_TAGS, "false").unwrap();
        let note = Note::new(note_id.clone(), "n", "the invoice arrived");
        let tagger = AutoTagger::new(host.clone());

        let added = tagger.auto_tag_note(Some(&note)).unwrap();

        assert!(added.is_empty());
        assert_eq!(host.tag_count(), 0);
        assert!(host.attached_titles(&note_id).is_empty());
    }

    #[test]
    fn invalid_rule_pattern_fails_the_call() {
        let host = Arc::new(MemoryHost::new());
        let note_id = host.seed_note("n", "body");
        // The pattern only fails at compile time inside the matcher.
        host.set_setting(
            keys::STORED_WORDS,
            r#"[{"word":"bro(ken","caseSensitive":false,"tags":["bad"]}]"#,
        )
        .unwrap();
        let note = Note::new(note_id, "n", "body");
        let tagger = AutoTagger::new(host);

        let err = tagger.auto_tag_note(Some(&note)).unwrap_err();
        assert!(err.downcast_ref::<MatchError>().is_some());
    }

    #[test]
    fn current_note_path_uses_the_host_selection() {
        let host = Arc::new(MemoryHost::new());
        let note_id = host.seed_note("n", "the invoice arrived");
        store_rules(&host, &[rule("invoice", false, &["finance"])]);
        let tagger = AutoTagger::new(host.clone());

        // Nothing selected: no-op.
        assert!(tagger.auto_tag_current_note().unwrap().is_empty());

        host.select_note(Some(note_id.clone()));
        let added = tagger.auto_tag_current_note().unwrap();
        assert_eq!(added.len(), 1);
        assert_eq!(host.attached_titles(&note_id), vec!["finance"]);
    }
}
