//! Best-effort capture of git state and the execution environment
//!
//! Absence of a repository degrades to empty values, never to a failure of
//! run creation.

use std::process::Command;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Environment variables folded into the snapshot hash.
const HASHED_ENV_VARS: &[&str] = &["PATH", "LANG", "TZ"];

/// Git state at run creation, captured once.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct GitInfo {
    commit: String,
    dirty: bool,
}

impl GitInfo {
    /// Capture the current commit hash and dirty flag. Outside a
    /// repository both degrade: empty commit, clean flag.
    #[must_use]
    pub fn capture() -> Self {
        let commit = git_output(&["rev-parse", "HEAD"]).unwrap_or_default();
        let dirty = !commit.is_empty()
            && git_output(&["status", "--porcelain"])
                .is_some_and(|out| !out.is_empty());
        Self { commit, dirty }
    }

    /// The commit hash; empty when not in a repository.
    #[must_use]
    pub fn commit(&self) -> &str {
        &self.commit
    }

    /// Whether the working tree had uncommitted changes.
    #[must_use]
    pub const fn dirty(&self) -> bool {
        self.dirty
    }
}

fn git_output(args: &[&str]) -> Option<String> {
    Command::new("git")
        .args(args)
        .output()
        .ok()
        .filter(|out| out.status.success())
        .and_then(|out| String::from_utf8(out.stdout).ok())
        .map(|s| s.trim().to_string())
}

/// Snapshot of the execution environment for reproducibility.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EnvironmentSnapshot {
    os: String,
    arch: String,
    crate_version: String,
    env_vars_hash: String,
    captured_at: DateTime<Utc>,
}

impl EnvironmentSnapshot {
    /// Capture the current environment.
    #[must_use]
    pub fn capture() -> Self {
        Self {
            os: std::env::consts::OS.to_string(),
            arch: std::env::consts::ARCH.to_string(),
            crate_version: env!("CARGO_PKG_VERSION").to_string(),
            env_vars_hash: Self::compute_env_vars_hash(),
            captured_at: Utc::now(),
        }
    }

    /// Operating system name.
    #[must_use]
    pub fn os(&self) -> &str {
        &self.os
    }

    /// CPU architecture.
    #[must_use]
    pub fn arch(&self) -> &str {
        &self.arch
    }

    /// Version of this crate at capture time.
    #[must_use]
    pub fn crate_version(&self) -> &str {
        &self.crate_version
    }

    /// SHA-256 hash over the relevant environment variables.
    #[must_use]
    pub fn env_vars_hash(&self) -> &str {
        &self.env_vars_hash
    }

    /// When the snapshot was taken.
    #[must_use]
    pub const fn captured_at(&self) -> DateTime<Utc> {
        self.captured_at
    }

    fn compute_env_vars_hash() -> String {
        let mut hasher = Sha256::new();
        for var in HASHED_ENV_VARS {
            let value = std::env::var(var).unwrap_or_default();
            hasher.update(var.as_bytes());
            hasher.update(b"=");
            hasher.update(value.as_bytes());
            hasher.update(b"\n");
        }
        format!("{:x}", hasher.finalize())
    }
}
