//! Control surface: stop and reload from outside the event loop.
//!
//! A [`ControlHandle`] is cheap to clone and safe to use from any thread or
//! task.  The helper wires it to process signals:
//!
//! | Signal            | Operation  |
//! |-------------------|------------|
//! | Ctrl-C / SIGTERM  | `stop()`   |
//! | SIGHUP (Unix)     | `reload()` |
//!
//! Stopping clears the shared running flag; the event loop notices on its
//! next iteration and applies the shutdown policy.  Reloading swaps the
//! mapping table and leaves running sequences alone.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{error, info};

use crate::application::reload_config::{ReloadCoordinator, ReloadError};

/// Handle for stopping the helper and reloading its mappings.
#[derive(Clone)]
pub struct ControlHandle {
    running: Arc<AtomicBool>,
    reloader: Arc<ReloadCoordinator>,
}

impl ControlHandle {
    /// Creates a handle in the running state.
    pub fn new(reloader: Arc<ReloadCoordinator>) -> Self {
        Self {
            running: Arc::new(AtomicBool::new(true)),
            reloader,
        }
    }

    /// Asks the event loop to stop.
    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    /// Reloads the mapping file.  Returns the new mapping count.
    pub fn reload(&self) -> Result<usize, ReloadError> {
        self.reloader.reload()
    }

    /// Returns `false` once `stop()` has been called.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// The flag the event loop polls.
    pub fn running_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.running)
    }
}

/// Spawns tasks that clear `running` on Ctrl-C or SIGTERM.
///
/// Used on its own by modes that have nothing to reload.  Must be called
/// from within a Tokio runtime.
pub fn spawn_stop_handlers(running: Arc<AtomicBool>) {
    let stopper = Arc::clone(&running);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("shutdown signal received");
            stopper.store(false, Ordering::SeqCst);
        }
    });

    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                tokio::spawn(async move {
                    if term.recv().await.is_some() {
                        info!("SIGTERM received");
                        running.store(false, Ordering::SeqCst);
                    }
                });
            }
            Err(e) => error!("failed to install SIGTERM handler: {e}"),
        }
    }
}

/// Spawns tasks that map process signals onto `handle`: Ctrl-C and SIGTERM
/// stop, SIGHUP reloads.
///
/// Must be called from within a Tokio runtime.
pub fn spawn_signal_handlers(handle: ControlHandle) {
    spawn_stop_handlers(handle.running_flag());

    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::hangup()) {
            Ok(mut hup) => {
                tokio::spawn(async move {
                    while hup.recv().await.is_some() {
                        info!("SIGHUP received, reloading mappings");
                        let reloader = handle.clone();
                        match tokio::task::spawn_blocking(move || reloader.reload()).await {
                            Ok(Ok(count)) => info!(mappings = count, "reload complete"),
                            // The coordinator already logged the failure.
                            Ok(Err(_)) => {}
                            Err(e) => error!("reload task failed: {e}"),
                        }
                    }
                });
            }
            Err(e) => error!("failed to install SIGHUP handler: {e}"),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
