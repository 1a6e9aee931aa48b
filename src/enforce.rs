//! Computation Tracker - computed vs simulated enforcement
//!
//! Separates "can this code path run with placeholder data" (useful in
//! development) from "must this pipeline run on real computed data"
//! (required for published findings) via one boolean switch, inspected per
//! instantiation rather than baked in at import time.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Environment variable controlling the require-computed toggle.
pub const REQUIRE_COMPUTED_ENV: &str = "GLYPHTRACE_REQUIRE_COMPUTED";

/// Environment variable controlling the require-seed toggle.
pub const REQUIRE_SEED_ENV: &str = "GLYPHTRACE_REQUIRE_SEED";

/// Enforcement toggles, passed explicitly into tracker/controller
/// constructors so policy stays testable without mutating process state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnforcementConfig {
    /// Reject simulated/fallback results as fatal errors.
    pub require_computed: bool,
    /// Reject unseeded stochastic generators as fatal errors.
    pub require_seed: bool,
}

impl EnforcementConfig {
    /// Read the toggles from the environment once. Unset or unrecognized
    /// values default to lenient.
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            require_computed: env_flag(REQUIRE_COMPUTED_ENV),
            require_seed: env_flag(REQUIRE_SEED_ENV),
        }
    }

    /// Both toggles on: the mode required for published findings.
    #[must_use]
    pub const fn strict() -> Self {
        Self {
            require_computed: true,
            require_seed: true,
        }
    }
}

fn env_flag(name: &str) -> bool {
    std::env::var(name)
        .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(false)
}

/// Classification of a unit of work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ComputationKind {
    /// Derived from real input data.
    Computed,
    /// A stand-in/fallback value.
    Simulated,
}

/// One recorded computation event, for audit.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ComputationRecord {
    component: String,
    category: String,
    kind: ComputationKind,
    detail: String,
    recorded_at: DateTime<Utc>,
}

impl ComputationRecord {
    /// Component name that produced the computation.
    #[must_use]
    pub fn component(&self) -> &str {
        &self.component
    }

    /// Computation category.
    #[must_use]
    pub fn category(&self) -> &str {
        &self.category
    }

    /// Computed or simulated.
    #[must_use]
    pub const fn kind(&self) -> ComputationKind {
        self.kind
    }

    /// Free-text detail or reason.
    #[must_use]
    pub fn detail(&self) -> &str {
        &self.detail
    }

    /// When the event was recorded.
    #[must_use]
    pub const fn recorded_at(&self) -> DateTime<Utc> {
        self.recorded_at
    }
}

/// Process-wide registry classifying every significant computation as
/// computed or simulated. A fresh tracker re-reads its enforcement flag at
/// initialization; there is no silent one-time singleton.
#[derive(Debug, Default)]
pub struct ComputationTracker {
    require_computed: bool,
    records: Vec<ComputationRecord>,
}

impl ComputationTracker {
    /// Create a tracker with the given enforcement configuration.
    #[must_use]
    pub const fn new(enforcement: &EnforcementConfig) -> Self {
        Self {
            require_computed: enforcement.require_computed,
            records: Vec::new(),
        }
    }

    /// Create a tracker reading the enforcement toggles from the
    /// environment at initialization.
    #[must_use]
    pub fn from_env() -> Self {
        Self::new(&EnforcementConfig::from_env())
    }

    /// Whether strict enforcement is active.
    #[must_use]
    pub const fn require_computed(&self) -> bool {
        self.require_computed
    }

    /// Record a simulated (stand-in/fallback) computation.
    ///
    /// # Errors
    ///
    /// Fails with [`Error::SimulationViolation`] when `require_computed` is
    /// active: a hard stop, not a retryable condition.
    pub fn record_simulated(
        &mut self,
        component: impl Into<String>,
        category: impl Into<String>,
        reason: impl Into<String>,
    ) -> Result<()> {
        let component = component.into();
        let category = category.into();
        let reason = reason.into();
        if self.require_computed {
            return Err(Error::SimulationViolation {
                component,
                category,
                reason,
            });
        }
        tracing::warn!(
            component = %component,
            category = %category,
            reason = %reason,
            "simulated computation recorded"
        );
        self.records.push(ComputationRecord {
            component,
            category,
            kind: ComputationKind::Simulated,
            detail: reason,
            recorded_at: Utc::now(),
        });
        Ok(())
    }

    /// Record a computed result. Always succeeds; no enforcement branch.
    pub fn record_computed(
        &mut self,
        component: impl Into<String>,
        category: impl Into<String>,
        detail: impl Into<String>,
    ) {
        self.records.push(ComputationRecord {
            component: component.into(),
            category: category.into(),
            kind: ComputationKind::Computed,
            detail: detail.into(),
            recorded_at: Utc::now(),
        });
    }

    /// All recorded events, in recording order.
    #[must_use]
    pub fn records(&self) -> &[ComputationRecord] {
        &self.records
    }

    /// Recorded simulated events.
    pub fn simulated(&self) -> impl Iterator<Item = &ComputationRecord> {
        self.records
            .iter()
            .filter(|r| r.kind == ComputationKind::Simulated)
    }

    /// Number of simulated events recorded.
    #[must_use]
    pub fn simulated_count(&self) -> usize {
        self.simulated().count()
    }

    /// Number of computed events recorded.
    #[must_use]
    pub fn computed_count(&self) -> usize {
        self.records.len() - self.simulated_count()
    }

    /// Whether nothing has been recorded yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
