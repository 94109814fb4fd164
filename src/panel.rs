//! Message protocol between the batch-tagging panel and the core.
//!
//! The panel itself (HTML, progress bar, result lists) lives in the host's
//! webview and is out of scope here; this module defines the messages it
//! posts and the replies it expects, plus the dispatcher wiring them to the
//! batch runner and the reconciler. Messages travel as JSON envelopes with
//! a `name` and an optional `data` payload.

use std::sync::Arc;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::batch::{BatchRunner, PollReply};
use crate::host::HostApi;
use crate::models::{Note, NoteId, Tag};
use crate::reconciler::TagReconciler;
use crate::settings::Settings;

/// A message posted by the panel webview.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "name", content = "data", rename_all = "kebab-case")]
pub enum PanelMessage {
    /// Progress snapshot request; the panel polls until `completed`.
    Poll,
    /// Start a batch run.
    StartAutoTagging,
    /// Request cancellation of the active batch run.
    StopAutoTagging,
    /// Undo one tag added to one note from the result list.
    RemoveTagFromNote { note: Note, tag: Tag },
    /// Open a note from the result list in the host editor.
    OpenNote(NoteId),
    /// Asked once at panel init to mirror the debug setting.
    LoggingEnabled,
}

/// Reply sent back to the panel. Serialized untagged: the panel knows what
/// it asked for.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PanelReply {
    Poll(PollReply),
    LoggingEnabled(bool),
    /// Fire-and-forget messages acknowledge with null.
    Ack,
}

/// Dispatches panel messages onto the core components.
pub struct PanelHandler {
    host: Arc<dyn HostApi>,
    runner: Arc<BatchRunner>,
    reconciler: TagReconciler,
}

impl PanelHandler {
    /// Creates a handler with its own batch runner over the given host.
    pub fn new(host: Arc<dyn HostApi>) -> Self {
        let runner = Arc::new(BatchRunner::new(host.clone()));
        let reconciler = TagReconciler::new(host.clone());
        Self {
            host,
            runner,
            reconciler,
        }
    }

    /// The batch runner serving this panel.
    pub fn runner(&self) -> &Arc<BatchRunner> {
        &self.runner
    }

    /// Handles one panel message and produces its reply.
    pub fn handle(&self, message: PanelMessage) -> Result<PanelReply> {
        match message {
            PanelMessage::Poll => Ok(PanelReply::Poll(self.runner.poll())),
            PanelMessage::StartAutoTagging => {
                self.runner.start();
                Ok(PanelReply::Ack)
            }
            PanelMessage::StopAutoTagging => {
                self.runner.stop();
                Ok(PanelReply::Ack)
            }
            PanelMessage::RemoveTagFromNote { note, tag } => {
                self.reconciler.remove_tags(&note.id, &[tag])?;
                Ok(PanelReply::Ack)
            }
            PanelMessage::OpenNote(note_id) => {
                self.host.open_note(&note_id)?;
                Ok(PanelReply::Ack)
            }
            PanelMessage::LoggingEnabled => {
                let settings = Settings::collect(self.host.as_ref())?;
                Ok(PanelReply::LoggingEnabled(settings.debug_enabled))
            }
        }
    }
}
