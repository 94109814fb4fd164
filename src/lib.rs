//! Keyword auto-tagging engine for a note-taking host application.
//!
//! Users configure word rules (a regex pattern, a case-sensitivity flag and
//! a list of tags); the engine scans note bodies against those rules,
//! resolves matching tag titles against the host's tag registry (creating
//! missing tags on demand) and attaches only the net-new tags. A batch
//! runner applies the same logic across the whole note collection with
//! progress reporting and cooperative cancellation.
//!
//! The host application is reached exclusively through the [`host::HostApi`]
//! trait; [`host::MemoryHost`] is a self-contained implementation for tests
//! and embedding without a real host.

pub mod batch;
pub mod host;
pub mod logging;
pub mod matcher;
pub mod models;
pub mod panel;
pub mod plugin;
pub mod reconciler;
pub mod scheduler;
pub mod settings;
pub mod tagger;

pub use batch::{BatchRunner, PollReply, UpdatedNote};
pub use host::{HostApi, HostError, MemoryHost, NoteQuery, Page};
pub use matcher::find_tags;
pub use models::{Note, NoteId, Tag, TagId, WordDictionary, WordRule};
pub use panel::{PanelHandler, PanelMessage, PanelReply};
pub use plugin::Plugin;
pub use reconciler::TagReconciler;
pub use scheduler::ChangeScheduler;
pub use settings::Settings;
pub use tagger::AutoTagger;
