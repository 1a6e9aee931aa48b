//! Run identity and the in-memory record of an active run

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Error, Result};

use super::config::RunConfig;
use super::environment::{EnvironmentSnapshot, GitInfo};

/// Globally unique identifier for one execution attempt. Immutable once
/// created.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunId(Uuid);

impl RunId {
    /// Generate a fresh run id.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Validate an explicitly supplied run id.
    ///
    /// # Errors
    ///
    /// Fails with [`Error::InvalidRunId`] when the input is not a
    /// well-formed UUID.
    pub fn parse(input: &str) -> Result<Self> {
        Uuid::parse_str(input)
            .map(Self)
            .map_err(|_| Error::InvalidRunId(input.to_string()))
    }
}

impl std::fmt::Display for RunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Status of a run: `Running` until scope exit, then terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunStatus {
    /// The scope is open and the run is executing.
    Running,
    /// The scope exited without an error.
    Success,
    /// An error or panic escaped the scope.
    Failed,
}

/// The in-memory record of an active run. Mutated only by the
/// [`RunManager`](super::RunManager); downstream code receives snapshots.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RunContext {
    run_id: RunId,
    experiment_id: String,
    run_nonce: Uuid,
    config: RunConfig,
    git: GitInfo,
    environment: Option<EnvironmentSnapshot>,
    timestamp_start: DateTime<Utc>,
    timestamp_end: Option<DateTime<Utc>>,
    status: RunStatus,
}

impl RunContext {
    /// Open a context for the given config: fresh (or validated supplied)
    /// run id, derived experiment id, fresh nonce, git capture, optional
    /// environment snapshot, start timestamp, `Running` status.
    ///
    /// # Errors
    ///
    /// Fails with [`Error::InvalidRunId`] when a supplied run id is not a
    /// well-formed UUID. Git/environment capture never fails.
    pub fn open(config: RunConfig, capture_env: bool) -> Result<Self> {
        let run_id = match config.supplied_run_id() {
            Some(raw) => RunId::parse(raw)?,
            None => RunId::generate(),
        };
        let experiment_id = config.experiment_id();
        Ok(Self {
            run_id,
            experiment_id,
            run_nonce: Uuid::new_v4(),
            config,
            git: GitInfo::capture(),
            environment: capture_env.then(EnvironmentSnapshot::capture),
            timestamp_start: Utc::now(),
            timestamp_end: None,
            status: RunStatus::Running,
        })
    }

    /// The run identity.
    #[must_use]
    pub const fn run_id(&self) -> &RunId {
        &self.run_id
    }

    /// The logical experiment this attempt belongs to.
    #[must_use]
    pub fn experiment_id(&self) -> &str {
        &self.experiment_id
    }

    /// The per-attempt nonce: fresh even when the config is identical.
    #[must_use]
    pub const fn run_nonce(&self) -> &Uuid {
        &self.run_nonce
    }

    /// The configuration this run was opened with.
    #[must_use]
    pub const fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Git state captured at creation.
    #[must_use]
    pub const fn git(&self) -> &GitInfo {
        &self.git
    }

    /// Environment snapshot, when capture was requested.
    #[must_use]
    pub const fn environment(&self) -> Option<&EnvironmentSnapshot> {
        self.environment.as_ref()
    }

    /// When the scope was opened.
    #[must_use]
    pub const fn timestamp_start(&self) -> DateTime<Utc> {
        self.timestamp_start
    }

    /// When the scope exited; `None` while running.
    #[must_use]
    pub const fn timestamp_end(&self) -> Option<DateTime<Utc>> {
        self.timestamp_end
    }

    /// Current status.
    #[must_use]
    pub const fn status(&self) -> RunStatus {
        self.status
    }

    /// Transition to a terminal status and stamp the end time. Called by
    /// the manager on scope exit, exactly once per run.
    pub(super) fn finish(&mut self, status: RunStatus) {
        self.status = status;
        self.timestamp_end = Some(Utc::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_id_parse_roundtrip() {
        let id = RunId::generate();
        let parsed = RunId::parse(&id.to_string()).unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn test_run_id_rejects_garbage() {
        let err = RunId::parse("not-a-uuid").unwrap_err();
        assert!(matches!(err, Error::InvalidRunId(_)));
    }

    #[test]
    fn test_open_starts_running() {
        let ctx = RunContext::open(RunConfig::new("phase1"), false).unwrap();
        assert_eq!(ctx.status(), RunStatus::Running);
        assert!(ctx.timestamp_end().is_none());
        assert!(ctx.environment().is_none());
    }

    #[test]
    fn test_same_config_distinct_attempts() {
        let a = RunContext::open(RunConfig::new("phase1").with_seed(5), false).unwrap();
        let b = RunContext::open(RunConfig::new("phase1").with_seed(5), false).unwrap();
        assert_eq!(a.experiment_id(), b.experiment_id());
        assert_ne!(a.run_id(), b.run_id());
        assert_ne!(a.run_nonce(), b.run_nonce());
    }

    #[test]
    fn test_supplied_run_id_used() {
        let raw = "2f9c07f6-4b1a-4b58-9a5e-000000000001";
        let ctx = RunContext::open(RunConfig::new("phase1").with_run_id(raw), false).unwrap();
        assert_eq!(ctx.run_id().to_string(), raw);
    }

    #[test]
    fn test_finish_stamps_end() {
        let mut ctx = RunContext::open(RunConfig::new("phase1"), false).unwrap();
        ctx.finish(RunStatus::Success);
        assert_eq!(ctx.status(), RunStatus::Success);
        assert!(ctx.timestamp_end().is_some());
    }

    #[test]
    fn test_context_serialization_roundtrip() {
        let ctx = RunContext::open(RunConfig::new("phase1").with_seed(9), true).unwrap();
        let json = serde_json::to_string(&ctx).unwrap();
        let back: RunContext = serde_json::from_str(&json).unwrap();
        assert_eq!(ctx, back);
    }
}
