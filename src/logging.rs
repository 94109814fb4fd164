//! Logging bootstrap.
//!
//! The engine logs through the `log` facade; embedders that do not bring
//! their own backend can call [`init_logging`] once to get a stderr logger.
//! The user-facing `debugEnabled` setting maps onto the log level: debug
//! diagnostics are emitted only when it is on, warnings and errors always
//! get through.

use flexi_logger::{LogSpecification, Logger, LoggerHandle};
use once_cell::sync::OnceCell;

static LOGGER: OnceCell<LoggerHandle> = OnceCell::new();

fn level_spec(debug_enabled: bool) -> &'static str {
    if debug_enabled { "debug" } else { "info" }
}

/// Initializes stderr logging once per process.
///
/// Calling it again is idempotent and only re-applies the debug level, so
/// it is safe to call from a settings-changed handler.
pub fn init_logging(debug_enabled: bool) -> Result<(), String> {
    if LOGGER.get().is_some() {
        set_debug(debug_enabled);
        return Ok(());
    }

    let handle = Logger::try_with_str(level_spec(debug_enabled))
        .map_err(|err| format!("invalid log specification: {err}"))?
        .log_to_stderr()
        .start()
        .map_err(|err| format!("failed to start logger: {err}"))?;

    // A concurrent init may have won the race; dropping our handle then is
    // harmless.
    let _ = LOGGER.set(handle);
    Ok(())
}

/// Adjusts the active log level to follow the `debugEnabled` setting.
///
/// A no-op when logging has not been initialized through this module.
pub fn set_debug(debug_enabled: bool) {
    if let Some(handle) = LOGGER.get()
        && let Ok(spec) = LogSpecification::parse(level_spec(debug_enabled))
    {
        handle.set_new_spec(spec);
    }
}
