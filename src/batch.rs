//! Batch auto-tagging over the whole note collection.
//!
//! One batch run walks every note (paginated, creation order), applies the
//! single-note auto-tagger to each and accumulates the notes that gained
//! tags. The run lives on a single background worker thread; the UI polls
//! its state. Cancellation is cooperative: a stop request sets a flag the
//! loop checks before each note, never interrupting the note in flight.
//!
//! The note count shown as progress denominator comes from a separate
//! pre-count traversal. Notes created or deleted between the two passes can
//! make the processed count overshoot or undershoot it; that drift is
//! accepted, not corrected.

use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

use anyhow::Result;
use log::{error, info, warn};
use serde::{Deserialize, Serialize};

use crate::host::{HostApi, NoteQuery};
use crate::models::{Note, Tag};
use crate::tagger::AutoTagger;

/// A note that gained tags during a batch run, with the tags that were
/// newly attached to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatedNote {
    pub note: Note,
    pub added_tags: Vec<Tag>,
}

/// Snapshot returned by [`BatchRunner::poll`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PollReply {
    /// Percentage of pre-counted notes processed, clamped to [0, 100].
    pub progress: f64,
    /// Whether the run has finished (exhausted or cancelled).
    pub completed: bool,
    /// Published once the run finishes; empty while it is in flight.
    pub updated_notes: Vec<UpdatedNote>,
}

/// Mutable state of one batch run.
///
/// Owned by the runner and only reachable through `start`, `stop` and
/// `poll`; there is no ambient global. Reset at the start of each run.
#[derive(Debug, Default)]
struct BatchState {
    notes_count: usize,
    notes_processed_count: usize,
    completed: bool,
    cancel_pending: bool,
    running: bool,
    updated_notes: Vec<UpdatedNote>,
    /// Failure that halted the run early, kept for diagnostics.
    last_error: Option<String>,
}

/// Drives batch auto-tagging runs.
///
/// At most one run is active at a time; `start` while running is a
/// log-only no-op. The state lock doubles as the run guard, so the check
/// holds even with the worker on its own thread.
pub struct BatchRunner {
    host: Arc<dyn HostApi>,
    state: Arc<Mutex<BatchState>>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl BatchRunner {
    /// Creates an idle runner backed by the given host.
    pub fn new(host: Arc<dyn HostApi>) -> Self {
        Self {
            host,
            state: Arc::new(Mutex::new(BatchState::default())),
            worker: Mutex::new(None),
        }
    }

    /// Starts a batch run on a background worker thread.
    ///
    /// Returns `false` without touching any state when a run is already
    /// active; that rejection is logged, not surfaced as an error.
    pub fn start(&self) -> bool {
        {
            let mut state = self.state.lock().unwrap();
            if state.running {
                warn!("batch run already in progress; ignoring start request");
                return false;
            }
            *state = BatchState {
                running: true,
                ..BatchState::default()
            };
        }

        // Reap the previous run's worker, if any. It has already finished,
        // since running was false.
        if let Some(handle) = self.worker.lock().unwrap().take() {
            let _ = handle.join();
        }

        info!("starting batch auto-tagging run");
        let host = Arc::clone(&self.host);
        let state = Arc::clone(&self.state);
        let handle = std::thread::spawn(move || run_batch(host, state));
        *self.worker.lock().unwrap() = Some(handle);
        true
    }

    /// Requests cancellation of the active run.
    ///
    /// The in-flight note finishes; the flag only prevents the next
    /// iteration from starting.
    pub fn stop(&self) {
        let mut state = self.state.lock().unwrap();
        if state.running {
            info!("batch cancellation requested");
        }
        state.cancel_pending = true;
    }

    /// Side-effect-free snapshot of the current run.
    pub fn poll(&self) -> PollReply {
        let state = self.state.lock().unwrap();
        let progress = if state.notes_count == 0 {
            0.0
        } else {
            let ratio = state.notes_processed_count as f64 / state.notes_count as f64;
            (ratio * 100.0).min(100.0)
        };
        PollReply {
            progress,
            completed: state.completed,
            updated_notes: state.updated_notes.clone(),
        }
    }

    /// Blocks until the current worker thread finishes.
    pub fn wait(&self) {
        if let Some(handle) = self.worker.lock().unwrap().take()
            && handle.join().is_err()
        {
            error!("batch worker thread panicked");
        }
    }
}

/// Worker-thread body: count, process, publish.
fn run_batch(host: Arc<dyn HostApi>, state: Arc<Mutex<BatchState>>) {
    let tagger = AutoTagger::new(Arc::clone(&host));
    let mut updated = Vec::new();

    let result = count_notes(host.as_ref()).and_then(|total| {
        state.lock().unwrap().notes_count = total;
        process_notes(host.as_ref(), &tagger, &state, &mut updated)
    });

    let mut state = state.lock().unwrap();
    if let Err(err) = result {
        // Halt-on-first-error: notes after the failing one stay
        // unprocessed for this run.
        error!("batch run aborted: {err:#}");
        state.last_error = Some(format!("{err:#}"));
    } else {
        info!(
            "batch run finished: {} of {} note(s) processed, {} updated",
            state.notes_processed_count,
            state.notes_count,
            updated.len()
        );
    }
    state.updated_notes = updated;
    state.completed = true;
    state.running = false;
}

/// Pre-count pass: a full traversal independent of the processing pass.
fn count_notes(host: &dyn HostApi) -> Result<usize> {
    let mut count = 0;
    let mut page = 1;

    loop {
        let result = host.get_notes(&NoteQuery::batch_page(page))?;
        count += result.items.len();
        if !result.has_more {
            break;
        }
        page += 1;
    }

    Ok(count)
}

fn process_notes(
    host: &dyn HostApi,
    tagger: &AutoTagger,
    state: &Mutex<BatchState>,
    updated: &mut Vec<UpdatedNote>,
) -> Result<()> {
    let mut page = 1;

    'pages: loop {
        let result = host.get_notes(&NoteQuery::batch_page(page))?;
        let has_more = result.has_more;

        for note in result.items {
            if state.lock().unwrap().cancel_pending {
                info!("batch run cancelled; leaving remaining notes unprocessed");
                break 'pages;
            }

            let added = tagger.auto_tag_note(Some(&note))?;
            if !added.is_empty() {
                updated.push(UpdatedNote {
                    note,
                    added_tags: added,
                });
            }
            state.lock().unwrap().notes_processed_count += 1;
        }

        if !has_more {
            break;
        }
        page += 1;
    }

    Ok(())
}
