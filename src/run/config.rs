//! Run configuration - what a phase script declares about itself

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::ident;

/// Configuration for one run: the invoking command, the global seed, and
/// arbitrary JSON-safe extras. The experiment identity is derived from this
/// value, so two runs with equal configs belong to the same experiment.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RunConfig {
    command: String,
    seed: Option<u64>,
    run_id: Option<String>,
    extra: Map<String, Value>,
}

impl RunConfig {
    /// Create a config for the given command.
    #[must_use]
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            seed: None,
            run_id: None,
            extra: Map::new(),
        }
    }

    /// Set the global seed.
    #[must_use]
    pub const fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Supply an explicit run id instead of generating one. Validated at
    /// scope entry; must be a well-formed UUID.
    #[must_use]
    pub fn with_run_id(mut self, run_id: impl Into<String>) -> Self {
        self.run_id = Some(run_id.into());
        self
    }

    /// Attach an extra JSON-safe key/value pair.
    #[must_use]
    pub fn with_extra(mut self, key: impl Into<String>, value: Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }

    /// The invoking command.
    #[must_use]
    pub fn command(&self) -> &str {
        &self.command
    }

    /// The global seed, if declared.
    #[must_use]
    pub const fn seed(&self) -> Option<u64> {
        self.seed
    }

    /// The explicitly supplied run id, if any.
    #[must_use]
    pub fn supplied_run_id(&self) -> Option<&str> {
        self.run_id.as_deref()
    }

    /// The extra key/value pairs.
    #[must_use]
    pub const fn extra(&self) -> &Map<String, Value> {
        &self.extra
    }

    /// Derive the experiment identity: a content-addressed id over the
    /// canonicalized command/seed/extra mapping. Excludes the run id, so
    /// every attempt of the same logical experiment derives the same value.
    #[must_use]
    pub fn experiment_id(&self) -> String {
        let params = serde_json::json!({
            "command": self.command,
            "seed": self.seed,
            "extra": Value::Object(self.extra.clone()),
        });
        format!("exp-{}", ident::derive_keyed_id("experiment", &params))
    }
}
