//! Metadata Store - the relational persistence boundary
//!
//! The core needs only a narrow interface: upsert a run row and fetch one
//! back for verification. `save_run` is called at least twice per run,
//! once at creation with `Running` and once at scope exit with a terminal
//! status. There is no retry policy; store errors propagate.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use crate::error::Result;
use crate::run::{RunContext, RunId};

/// Capability contract for run persistence.
pub trait MetadataStore: Send + Sync {
    /// Upsert a run row. Must tolerate repeated calls for the same run.
    ///
    /// # Errors
    ///
    /// Implementation-defined persistence failure, surfaced as
    /// [`crate::Error::Store`].
    fn save_run(&self, run: &RunContext) -> Result<()>;

    /// Fetch a run row by id.
    ///
    /// # Errors
    ///
    /// Implementation-defined persistence failure.
    fn get_run(&self, run_id: &RunId) -> Result<Option<RunContext>>;
}

/// In-memory store keyed by run id.
///
/// Backs tests and ad hoc scripts; the relational store used by the full
/// pipeline implements the same contract.
#[derive(Debug, Default)]
pub struct MemoryMetadataStore {
    runs: Mutex<HashMap<RunId, RunContext>>,
}

impl MemoryMetadataStore {
    /// Create a new empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of runs stored.
    #[must_use]
    pub fn run_count(&self) -> usize {
        self.lock().len()
    }

    /// Whether the store holds no runs.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Snapshot of all stored runs, in no particular order.
    #[must_use]
    pub fn runs(&self) -> Vec<RunContext> {
        self.lock().values().cloned().collect()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<RunId, RunContext>> {
        self.runs.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl MetadataStore for MemoryMetadataStore {
    fn save_run(&self, run: &RunContext) -> Result<()> {
        self.lock().insert(run.run_id().clone(), run.clone());
        Ok(())
    }

    fn get_run(&self, run_id: &RunId) -> Result<Option<RunContext>> {
        Ok(self.lock().get(run_id).cloned())
    }
}
