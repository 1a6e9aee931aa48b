//! Error types for Glyphtrace
//!
//! Enforcement violations are fatal by design: they indicate a pipeline
//! claimed to produce real results while using a stand-in. The "no active
//! run" condition is the one recoverable member of the taxonomy.

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Glyphtrace error types
#[derive(Error, Debug)]
pub enum Error {
    /// A non-computed fallback value was produced while strict enforcement
    /// was active. Never retried; the caller must supply real inputs or
    /// disable strict mode explicitly.
    #[error("simulated computation rejected: component={component} category={category} reason={reason}\nStrict enforcement is active; supply computed inputs or disable require_computed")]
    SimulationViolation {
        /// Component that produced the fallback value
        component: String,
        /// Category of the computation
        category: String,
        /// Free-text reason the fallback was used
        reason: String,
    },

    /// A stochastic operation was invoked without a required seed, or
    /// randomness was requested inside a no-randomness scope.
    #[error("randomness violation in {component}: {reason}")]
    RandomnessViolation {
        /// Component that requested the generator
        component: String,
        /// Why the request was rejected
        reason: String,
    },

    /// No run scope is currently open. Recoverable by design: provenance
    /// consumers degrade to an unattributed entry.
    #[error("no active run: open a run scope before querying the current run")]
    NoActiveRun,

    /// A second run scope was attempted while one is already active.
    /// Scopes never stack.
    #[error("run scope already occupied by run {run_id}: close it before opening another")]
    RunScopeOccupied {
        /// Identity of the incumbent run
        run_id: String,
    },

    /// An explicitly supplied run id failed UUID validation.
    #[error("invalid run id: {0} (must be a well-formed UUID)")]
    InvalidRunId(String),

    /// A result payload failed strict JSON serialization.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// Metadata-store failure. Propagated unmasked: hiding a persistence
    /// failure would silently corrupt the provenance trail.
    #[error("metadata store error: {0}")]
    Store(String),

    /// IO error at the filesystem boundary
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
