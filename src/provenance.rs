//! Provenance Writer - the output boundary
//!
//! Wraps a JSON-serializable result in a provenance envelope and writes it
//! twice: a stable "latest" file at the requested path, and an immutable
//! snapshot that never collides with a prior one. When no run is active the
//! envelope degrades to `run_id = "none"` rather than failing, because
//! fixture generators and ad hoc scripts legitimately write results outside
//! any run.
//!
//! Non-finite floats in the payload normalize to `null` during envelope
//! construction (strict JSON never carries NaN or infinities); payloads
//! that cannot serialize at all are rejected with a descriptive error.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};
use crate::run::RunManager;

/// Run identity recorded when results are written outside any run scope.
pub const UNATTRIBUTED_RUN_ID: &str = "none";

/// The provenance half of an envelope.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Provenance {
    /// Run identity, or [`UNATTRIBUTED_RUN_ID`] for out-of-scope writes.
    pub run_id: String,
    /// Commit hash captured at run creation; empty outside a repository
    /// or for unattributed writes.
    pub git_commit: String,
    /// When the envelope was written.
    pub timestamp: DateTime<Utc>,
    /// Logical experiment linkage; absent for unattributed writes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub experiment_id: Option<String>,
    /// Global seed the run declared, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

/// A result payload wrapped with its provenance.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Envelope {
    /// Who produced the results.
    pub provenance: Provenance,
    /// The payload itself.
    pub results: Value,
}

/// Paths produced by one [`ProvenanceWriter::save_results`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedPaths {
    /// Stable path, overwritten on each save of the same logical script.
    pub latest: PathBuf,
    /// Immutable per-save snapshot; never overwrites a prior snapshot.
    pub snapshot: PathBuf,
}

/// Writes provenance-wrapped result files.
#[derive(Debug, Clone)]
pub struct ProvenanceWriter {
    manager: Option<Arc<RunManager>>,
}

impl ProvenanceWriter {
    /// Create a writer that resolves the current run from `manager`.
    #[must_use]
    pub const fn new(manager: Arc<RunManager>) -> Self {
        Self {
            manager: Some(manager),
        }
    }

    /// Create a writer with no run linkage: every envelope is
    /// unattributed. Used by fixture generators and ad hoc scripts.
    #[must_use]
    pub const fn detached() -> Self {
        Self { manager: None }
    }

    /// Wrap `results` in a provenance envelope and write latest + snapshot.
    ///
    /// Parent directories are created as needed. The snapshot filename is
    /// parameterized by run id and timestamp and existence-checked, so
    /// repeated saves to the same path never overwrite a prior snapshot.
    ///
    /// # Errors
    ///
    /// Fails with [`Error::Serialization`] when `results` is not strictly
    /// JSON-serializable, or [`Error::Io`] at the filesystem boundary.
    /// Never fails merely because no run is active.
    pub fn save_results<T: Serialize>(
        &self,
        results: &T,
        output_path: impl AsRef<Path>,
    ) -> Result<SavedPaths> {
        let output_path = output_path.as_ref();
        let results = serde_json::to_value(results).map_err(|e| {
            Error::Serialization(format!(
                "results payload for {} is not JSON-serializable: {e}",
                output_path.display()
            ))
        })?;

        let provenance = self.current_provenance();
        let envelope = Envelope {
            provenance,
            results,
        };
        let body = serde_json::to_string_pretty(&envelope)
            .map_err(|e| Error::Serialization(format!("provenance envelope: {e}")))?;

        if let Some(parent) = output_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let snapshot = snapshot_path(output_path, &envelope.provenance);
        fs::write(output_path, &body)?;
        fs::write(&snapshot, &body)?;
        tracing::info!(
            run_id = %envelope.provenance.run_id,
            latest = %output_path.display(),
            snapshot = %snapshot.display(),
            "results saved"
        );
        Ok(SavedPaths {
            latest: output_path.to_path_buf(),
            snapshot,
        })
    }

    /// Read an envelope back from disk.
    ///
    /// # Errors
    ///
    /// Fails with [`Error::Io`] when the file is unreadable or
    /// [`Error::Serialization`] when it is not a valid envelope.
    pub fn read_results(path: impl AsRef<Path>) -> Result<Envelope> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)?;
        serde_json::from_str(&raw).map_err(|e| {
            Error::Serialization(format!("{} is not a provenance envelope: {e}", path.display()))
        })
    }

    fn current_provenance(&self) -> Provenance {
        let current = self
            .manager
            .as_ref()
            .and_then(|manager| manager.current_run().ok());
        current.map_or_else(
            || Provenance {
                run_id: UNATTRIBUTED_RUN_ID.to_string(),
                git_commit: String::new(),
                timestamp: Utc::now(),
                experiment_id: None,
                seed: None,
            },
            |run| Provenance {
                run_id: run.run_id().to_string(),
                git_commit: run.git().commit().to_string(),
                timestamp: Utc::now(),
                experiment_id: Some(run.experiment_id().to_string()),
                seed: run.config().seed(),
            },
        )
    }
}

/// Derive a snapshot path that is unique per save: stem + short run tag +
/// UTC timestamp, with a numeric suffix if that name somehow exists.
fn snapshot_path(latest: &Path, provenance: &Provenance) -> PathBuf {
    let stem = latest
        .file_stem()
        .map_or_else(|| "results".to_string(), |s| s.to_string_lossy().to_string());
    let dir = latest.parent().map_or_else(PathBuf::new, Path::to_path_buf);
    let tag: String = provenance.run_id.chars().take(8).collect();
    let ts = provenance.timestamp.format("%Y%m%dT%H%M%S%3f");
    let mut candidate = dir.join(format!("{stem}.{tag}.{ts}.json"));
    let mut n = 1u32;
    while candidate.exists() {
        candidate = dir.join(format!("{stem}.{tag}.{ts}-{n}.json"));
        n += 1;
    }
    candidate
}
