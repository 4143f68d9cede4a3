//! Ctrl+C handling.
//!
//! A shared `AtomicBool` is set when the user interrupts. The record loader
//! polls it between batches and the application checks it between phases,
//! exiting with code 130 (128 + SIGINT).
//!
//! ```rust,no_run
//! use linegroup::input::LoaderConfig;
//! use linegroup::signal::install_handler;
//!
//! let handler = install_handler();
//! let config = LoaderConfig::default().with_shutdown_flag(handler.get_flag());
//! ```

use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

/// Shared shutdown flag.
#[derive(Debug, Clone, Default)]
pub struct ShutdownHandler {
    flag: Arc<AtomicBool>,
}

impl ShutdownHandler {
    /// Create a handler with no shutdown requested.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// `true` once Ctrl+C was pressed or [`Self::request_shutdown`] was called.
    #[must_use]
    pub fn is_shutdown_requested(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// Set the flag manually.
    pub fn request_shutdown(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    /// Clone of the flag for the loader.
    #[must_use]
    pub fn get_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.flag)
    }

    /// Clear the flag.
    pub fn reset(&self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}

static GLOBAL_HANDLER: OnceLock<ShutdownHandler> = OnceLock::new();

/// Install the process-wide Ctrl+C hook and return its handler.
///
/// The hook is registered once per process. Later calls (several `run_app`
/// invocations from tests, say) reset and return the same handler. If the
/// hook cannot be registered the returned handler still works for manual
/// shutdown requests.
pub fn install_handler() -> ShutdownHandler {
    let handler = GLOBAL_HANDLER
        .get_or_init(|| {
            let handler = ShutdownHandler::new();
            let flag = handler.get_flag();
            let hooked = ctrlc::set_handler(move || {
                flag.store(true, Ordering::SeqCst);
                let mut stderr = std::io::stderr();
                let _ = writeln!(stderr, "\nInterrupted. Stopping...");
                let _ = stderr.flush();
                log::info!("Shutdown signal received");
            });
            if let Err(e) = hooked {
                log::debug!("Ctrl+C hook not installed: {}", e);
            }
            handler
        })
        .clone();
    handler.reset();
    handler
}
