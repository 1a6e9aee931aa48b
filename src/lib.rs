//! # Glyphtrace: Run-Provenance & Reproducibility Core
//!
//! Glyphtrace is the connective tissue for a multi-phase manuscript-corpus
//! analysis pipeline: every randomized or simulated computation must either
//! be seeded and deterministic or declare itself as a non-computed fallback,
//! and every result is recorded with enough metadata (run identity, git
//! commit, timestamps, seeds) to prove it was regenerated deterministically.
//!
//! ## Subsystems
//!
//! - [`run`] — run identity and lifecycle: a scoped "active run" with
//!   guaranteed status/timestamp bookkeeping on every exit path
//! - [`enforce`] — computed-vs-simulated tracking with a hard stop when a
//!   fallback value is produced under strict enforcement
//! - [`random`] — the single source of pseudo-randomness, with explicit-seed
//!   enforcement and a scoped no-randomness assertion
//! - [`ident`] — content-addressed identifiers derived from semantic inputs
//! - [`store`] — the narrow metadata-store boundary (upsert/fetch run rows)
//! - [`provenance`] — provenance envelopes written as latest + immutable
//!   snapshot JSON files
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use glyphtrace::run::{RunConfig, RunManager};
//! use glyphtrace::store::MemoryMetadataStore;
//!
//! let store = Arc::new(MemoryMetadataStore::new());
//! let manager = Arc::new(RunManager::new(store));
//!
//! let config = RunConfig::new("phase1_entropy").with_seed(42);
//! let total = manager.scope(config, |run| {
//!     assert!(!run.experiment_id().is_empty());
//!     Ok(19 + 23)
//! })?;
//! assert_eq!(total, 42);
//! # Ok::<(), glyphtrace::Error>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

pub mod enforce;
pub mod error;
pub mod ident;
pub mod instrument;
pub mod provenance;
pub mod random;
pub mod run;
pub mod store;

pub use error::{Error, Result};
