//! Run Manager - scoped acquisition of the single current-run slot
//!
//! The manager owns a single-slot register of "the current run". A scope
//! installs a context in the slot, persists `Running`, executes the body,
//! and on every exit path (ok, error, panic) persists a terminal status
//! with an end timestamp and clears the slot. Errors from the body
//! propagate unchanged; bookkeeping never masks them.

use std::sync::{Arc, Mutex, PoisonError};

use crate::error::{Error, Result};
use crate::store::MetadataStore;

use super::config::RunConfig;
use super::context::{RunContext, RunStatus};

/// Owns the current-run register and the metadata-store boundary.
///
/// One manager per script is the intended usage; consumers (such as the
/// provenance writer) receive it by constructor injection rather than
/// through process-global state.
pub struct RunManager {
    store: Arc<dyn MetadataStore>,
    slot: Mutex<Option<RunContext>>,
}

impl std::fmt::Debug for RunManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RunManager")
            .field("active", &self.has_active_run())
            .finish_non_exhaustive()
    }
}

impl RunManager {
    /// Create a manager over the given metadata store.
    #[must_use]
    pub fn new(store: Arc<dyn MetadataStore>) -> Self {
        Self {
            store,
            slot: Mutex::new(None),
        }
    }

    /// Open a run scope with an environment snapshot and execute `body`.
    ///
    /// Guarantees on every exit path: the store receives a terminal status
    /// (`Success` iff `body` returned `Ok`) with an end timestamp, and the
    /// current-run register is cleared. A panic in `body` is bookkept as
    /// `Failed` before it continues unwinding.
    ///
    /// # Errors
    ///
    /// Propagates the body's error unchanged; additionally fails with
    /// [`Error::RunScopeOccupied`] when a scope is already open, with
    /// [`Error::InvalidRunId`] for a malformed supplied run id, or with a
    /// store error when persistence fails.
    pub fn scope<T, F>(&self, config: RunConfig, body: F) -> Result<T>
    where
        F: FnOnce(&RunContext) -> Result<T>,
    {
        self.scope_with(config, true, body)
    }

    /// [`Self::scope`] with explicit control over environment capture.
    ///
    /// # Errors
    ///
    /// Same conditions as [`Self::scope`].
    pub fn scope_with<T, F>(&self, config: RunConfig, capture_env: bool, body: F) -> Result<T>
    where
        F: FnOnce(&RunContext) -> Result<T>,
    {
        let context = RunContext::open(config, capture_env)?;
        self.install(&context)?;

        if let Err(err) = self.store.save_run(&context) {
            self.take_slot();
            return Err(err);
        }
        tracing::info!(
            run_id = %context.run_id(),
            experiment_id = %context.experiment_id(),
            command = %context.config().command(),
            "run opened"
        );

        // Bookkeeps a panic in the body as a failed run before unwinding
        // continues.
        let mut panic_guard = PanicGuard {
            manager: self,
            armed: true,
        };
        let outcome = body(&context);
        panic_guard.armed = false;

        let status = if outcome.is_ok() {
            RunStatus::Success
        } else {
            RunStatus::Failed
        };
        let mut finished = self.take_slot().unwrap_or(context);
        finished.finish(status);
        tracing::info!(run_id = %finished.run_id(), status = ?status, "run closed");

        if let Err(store_err) = self.store.save_run(&finished) {
            if outcome.is_err() {
                // The body's error wins; losing it would mask the original
                // cause of the failure.
                tracing::error!(
                    run_id = %finished.run_id(),
                    error = %store_err,
                    "failed to persist terminal run status"
                );
            } else {
                return Err(store_err);
            }
        }
        outcome
    }

    /// Snapshot of the innermost active run.
    ///
    /// # Errors
    ///
    /// Fails with [`Error::NoActiveRun`] when no scope is open. Callers
    /// that may run outside a scope treat this as recoverable.
    pub fn current_run(&self) -> Result<RunContext> {
        self.lock_slot().clone().ok_or(Error::NoActiveRun)
    }

    /// Non-throwing probe for an active run.
    #[must_use]
    pub fn has_active_run(&self) -> bool {
        self.lock_slot().is_some()
    }

    fn install(&self, context: &RunContext) -> Result<()> {
        let mut slot = self.lock_slot();
        if let Some(active) = slot.as_ref() {
            return Err(Error::RunScopeOccupied {
                run_id: active.run_id().to_string(),
            });
        }
        *slot = Some(context.clone());
        Ok(())
    }

    fn take_slot(&self) -> Option<RunContext> {
        self.lock_slot().take()
    }

    fn lock_slot(&self) -> std::sync::MutexGuard<'_, Option<RunContext>> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Marks the run failed and clears the slot if the scope body panics.
struct PanicGuard<'a> {
    manager: &'a RunManager,
    armed: bool,
}

impl Drop for PanicGuard<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        if let Some(mut context) = self.manager.take_slot() {
            context.finish(RunStatus::Failed);
            if let Err(err) = self.manager.store.save_run(&context) {
                tracing::error!(
                    run_id = %context.run_id(),
                    error = %err,
                    "failed to persist run status during unwind"
                );
            }
        }
    }
}
