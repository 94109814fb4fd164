//! Coalescing scheduler for note-change events.
//!
//! The host fires a note-change event on every edit and note switch;
//! running the auto-tagger once per event is redundant under rapid typing.
//! This scheduler collapses the stream into a latest-wins slot: each event
//! schedules a tagging task for the currently open note, and a newer event
//! supersedes a still-pending one instead of queueing behind it. One worker
//! thread drains the slot.
//!
//! The task always tags whichever note is open when it runs, so a
//! superseded event loses nothing: its note either is still open (the
//! newer task covers it) or was switched away from mid-edit and gets
//! picked up again on its next change event.

use std::sync::{Arc, Condvar, Mutex};
use std::thread::JoinHandle;

use log::{debug, error};

use crate::host::HostApi;
use crate::models::NoteId;
use crate::tagger::AutoTagger;

/// Latest-wins scheduler driving [`AutoTagger::auto_tag_current_note`]
/// from note-change events.
pub struct ChangeScheduler {
    inner: Arc<Inner>,
    worker: Option<JoinHandle<()>>,
}

struct Inner {
    tagger: AutoTagger,
    slot: Mutex<Slot>,
    signal: Condvar,
}

#[derive(Default)]
struct Slot {
    pending: Option<NoteId>,
    busy: bool,
    shutdown: bool,
    superseded: u64,
}

impl ChangeScheduler {
    /// Creates the scheduler and spawns its worker thread.
    pub fn new(host: Arc<dyn HostApi>) -> Self {
        let inner = Arc::new(Inner {
            tagger: AutoTagger::new(host),
            slot: Mutex::new(Slot::default()),
            signal: Condvar::new(),
        });

        let worker_inner = Arc::clone(&inner);
        let worker = std::thread::spawn(move || worker_inner.run());

        Self {
            inner,
            worker: Some(worker),
        }
    }

    /// Schedules a tagging task for the note a change event reported.
    ///
    /// A task still pending for an earlier event is superseded, never run.
    pub fn schedule(&self, note_id: NoteId) {
        let mut slot = self.inner.slot.lock().unwrap();
        if let Some(previous) = slot.pending.replace(note_id) {
            slot.superseded += 1;
            debug!("superseding pending tagging task for note {previous}");
        }
        self.inner.signal.notify_all();
    }

    /// Blocks until no task is pending or running.
    pub fn flush(&self) {
        let mut slot = self.inner.slot.lock().unwrap();
        while slot.pending.is_some() || slot.busy {
            slot = self.inner.signal.wait(slot).unwrap();
        }
    }

    /// Number of pending tasks that were replaced before running.
    pub fn superseded_count(&self) -> u64 {
        self.inner.slot.lock().unwrap().superseded
    }
}

impl Drop for ChangeScheduler {
    fn drop(&mut self) {
        {
            let mut slot = self.inner.slot.lock().unwrap();
            slot.shutdown = true;
            self.inner.signal.notify_all();
        }
        if let Some(worker) = self.worker.take()
            && worker.join().is_err()
        {
            error!("change-scheduler worker thread panicked");
        }
    }
}

impl Inner {
    fn run(&self) {
        loop {
            let note_id = {
                let mut slot = self.slot.lock().unwrap();
                loop {
                    if slot.shutdown {
                        return;
                    }
                    if let Some(note_id) = slot.pending.take() {
                        slot.busy = true;
                        self.signal.notify_all();
                        break note_id;
                    }
                    slot = self.signal.wait(slot).unwrap();
                }
            };

            // Tag whichever note is open now; the scheduled id is only
            // event bookkeeping.
            if let Err(err) = self.tagger.auto_tag_current_note() {
                error!("auto-tagging after change event for note {note_id} failed: {err:#}");
            }

            let mut slot = self.slot.lock().unwrap();
            slot.busy = false;
            self.signal.notify_all();
        }
    }
}
