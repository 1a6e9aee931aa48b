//! Run Context / Run Manager - scoped run identity and lifecycle
//!
//! A "run" is one execution attempt of a phase script: uniquely identified,
//! timestamped, tagged with the git commit and an environment snapshot, and
//! persisted with a terminal status on every exit path.
//!
//! Runs sharing the same seed/command configuration share an
//! `experiment_id` (the logical experiment) but never a `run_id` (the
//! particular attempt).
//!
//! ```text
//! RunManager::scope ──> RunContext (status=Running, persisted)
//!        │                   │
//!        │          body sees the context; current_run() resolves it
//!        │                   │
//!        └── exit ──> terminal status + timestamp_end persisted,
//!                     current-run slot cleared, error propagated unchanged
//! ```

mod config;
mod context;
mod environment;
mod manager;

pub use config::RunConfig;
pub use context::{RunContext, RunId, RunStatus};
pub use environment::{EnvironmentSnapshot, GitInfo};
pub use manager::RunManager;
