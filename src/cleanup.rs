//! Exit-time cleanup for a published prompt.
//!
//! Once the approval prompt is on the phone, the hook owes one remote
//! delete unless the phone itself answered. The host kills the hook
//! (SIGTERM) as soon as the terminal prompt is answered, so the delete has
//! to run from the signal path as well as on a normal exit.
//!
//! [`ExitCleanup`] is a shared slot holding that pending action. Whoever
//! takes it first runs it: the main thread on return (via a scope guard in
//! `main`) or the signal thread installed by [`ExitCleanup::exit_on_signal`].

use anyhow::{Context, Result};
use signal_hook::consts::signal::{SIGHUP, SIGINT, SIGTERM};
use signal_hook::iterator::Signals;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread;

type Action = Box<dyn FnOnce() + Send + 'static>;

/// Shared, run-at-most-once cleanup slot.
#[derive(Clone, Default)]
pub struct ExitCleanup {
    slot: Arc<Mutex<Option<Action>>>,
}

impl std::fmt::Debug for ExitCleanup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExitCleanup")
            .field("armed", &self.is_armed())
            .finish()
    }
}

impl ExitCleanup {
    /// Creates an empty (disarmed) slot.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Option<Action>> {
        // A panic while holding the lock leaves the Option intact
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Stores the action to run at exit, replacing any previous one.
    pub fn arm(&self, action: impl FnOnce() + Send + 'static) {
        *self.lock() = Some(Box::new(action));
    }

    /// Drops the pending action without running it.
    ///
    /// Returns `false` if there was nothing to disarm (already run or never armed).
    pub fn disarm(&self) -> bool {
        self.lock().take().is_some()
    }

    /// Whether an action is pending.
    pub fn is_armed(&self) -> bool {
        self.lock().is_some()
    }

    /// Runs the pending action, if any. Later calls are no-ops.
    pub fn run(&self) {
        // Take under the lock, run outside it so a slow delete never blocks disarm()
        let action = self.lock().take();
        if let Some(action) = action {
            action();
        }
    }

    /// Spawns a thread that runs the cleanup and exits with status 0 on
    /// SIGINT, SIGTERM or SIGHUP.
    pub fn exit_on_signal(&self) -> Result<()> {
        let mut signals =
            Signals::new([SIGINT, SIGTERM, SIGHUP]).context("Failed to register signal handlers")?;
        let cleanup = self.clone();

        thread::Builder::new()
            .name("signals".to_string())
            .spawn(move || {
                if let Some(signal) = signals.forever().next() {
                    log::info!("Received signal {signal}, cleaning up before exit");
                    cleanup.run();
                    std::process::exit(0);
                }
            })
            .context("Failed to spawn signal thread")?;

        Ok(())
    }
}
