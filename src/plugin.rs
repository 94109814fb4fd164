//! Plugin entry point.
//!
//! [`Plugin::start`] is the one-call bootstrap for embedders: it reads the
//! stored settings, brings up logging, registers the host event handlers
//! and hands back the panel handler and change scheduler that the rest of
//! the plugin surface talks to.

use std::sync::Arc;

use anyhow::Result;
use log::error;

use crate::host::HostApi;
use crate::logging;
use crate::panel::PanelHandler;
use crate::scheduler::ChangeScheduler;
use crate::settings::Settings;

/// A fully wired plugin instance.
pub struct Plugin {
    scheduler: Arc<ChangeScheduler>,
    panel: PanelHandler,
}

impl Plugin {
    /// Wires the plugin up against a host.
    ///
    /// Note-change events feed the [`ChangeScheduler`]; settings changes
    /// re-apply the debug log level. Logging init failure is non-fatal:
    /// the embedder may already have installed a logger.
    pub fn start(host: Arc<dyn HostApi>) -> Result<Self> {
        let settings = Settings::collect(host.as_ref())?;
        if let Err(err) = logging::init_logging(settings.debug_enabled) {
            eprintln!("autotag: {err}");
        }

        let scheduler = Arc::new(ChangeScheduler::new(host.clone()));
        let schedule_target = Arc::clone(&scheduler);
        host.on_note_changed(Box::new(move |note_id| {
            schedule_target.schedule(note_id);
        }))?;

        let settings_host = host.clone();
        host.on_settings_changed(Box::new(move || {
            match Settings::collect(settings_host.as_ref()) {
                Ok(settings) => logging::set_debug(settings.debug_enabled),
                Err(err) => error!("failed to reload settings: {err:#}"),
            }
        }))?;

        let panel = PanelHandler::new(host);
        Ok(Self { scheduler, panel })
    }

    /// The handler for panel webview messages.
    pub fn panel(&self) -> &PanelHandler {
        &self.panel
    }

    /// The scheduler fed by note-change events.
    pub fn scheduler(&self) -> &ChangeScheduler {
        &self.scheduler
    }
}
