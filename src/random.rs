//! Randomness Controller - the single source of pseudo-randomness
//!
//! Every stochastic code path constructs its generator here. In strict mode
//! an explicit seed is mandatory; inside a [`RandomnessController::no_randomness`]
//! scope any generator request fails, which is how deterministic code paths
//! assert they really are deterministic.
//!
//! Seeded generators are `ChaCha8Rng`: the stream for a given seed is stable
//! across processes and platforms, which the reproducibility tests rely on.

use std::sync::atomic::{AtomicBool, Ordering};

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use sha2::{Digest, Sha256};

use crate::enforce::EnforcementConfig;
use crate::error::{Error, Result};

/// Derive a per-component seed from the global seed.
///
/// Independent components get independent but reproducible streams; two
/// components never share a stream just because they share the global seed.
#[must_use]
pub fn component_seed(global_seed: u64, component: &str) -> u64 {
    let mut hasher = Sha256::new();
    hasher.update(global_seed.to_be_bytes());
    hasher.update(component.as_bytes());
    let digest = hasher.finalize();
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    u64::from_be_bytes(bytes)
}

/// Owns the seed policy for one computation path and constructs every
/// generator used by it.
#[derive(Debug)]
pub struct RandomnessController {
    require_seed: bool,
    seed: Option<u64>,
    suppressed: AtomicBool,
}

impl RandomnessController {
    /// Create a controller with the given enforcement configuration and
    /// optional global seed.
    #[must_use]
    pub const fn new(enforcement: &EnforcementConfig, seed: Option<u64>) -> Self {
        Self {
            require_seed: enforcement.require_seed,
            seed,
            suppressed: AtomicBool::new(false),
        }
    }

    /// The configured global seed, if any.
    #[must_use]
    pub const fn seed(&self) -> Option<u64> {
        self.seed
    }

    /// Construct the generator for `component`, seeded with the global seed.
    ///
    /// # Errors
    ///
    /// Fails with [`Error::RandomnessViolation`] when a seed is required but
    /// none was supplied, or inside a [`Self::no_randomness`] scope.
    pub fn rng(&self, component: &str) -> Result<ChaCha8Rng> {
        self.check(component)?;
        Ok(self
            .seed
            .map_or_else(ChaCha8Rng::from_entropy, ChaCha8Rng::seed_from_u64))
    }

    /// Construct a generator for `component` with a component-scoped
    /// sub-seed derived from the global seed.
    ///
    /// # Errors
    ///
    /// Same conditions as [`Self::rng`].
    pub fn rng_for(&self, component: &str) -> Result<ChaCha8Rng> {
        self.check(component)?;
        Ok(self.seed.map_or_else(ChaCha8Rng::from_entropy, |s| {
            ChaCha8Rng::seed_from_u64(component_seed(s, component))
        }))
    }

    /// Assert that the enclosed code path is deterministic: while the
    /// returned guard lives, any generator request fails.
    pub fn no_randomness(&self) -> NoRandomnessGuard<'_> {
        let prev = self.suppressed.swap(true, Ordering::SeqCst);
        NoRandomnessGuard {
            controller: self,
            prev,
        }
    }

    fn check(&self, component: &str) -> Result<()> {
        if self.suppressed.load(Ordering::SeqCst) {
            return Err(Error::RandomnessViolation {
                component: component.to_string(),
                reason: "randomness requested inside a no-randomness scope".to_string(),
            });
        }
        if self.require_seed && self.seed.is_none() {
            return Err(Error::RandomnessViolation {
                component: component.to_string(),
                reason: "explicit seed required but none supplied".to_string(),
            });
        }
        Ok(())
    }
}

/// Scoped override that makes any randomness request fail until dropped.
#[derive(Debug)]
pub struct NoRandomnessGuard<'a> {
    controller: &'a RandomnessController,
    prev: bool,
}

impl Drop for NoRandomnessGuard<'_> {
    fn drop(&mut self) {
        self.controller.suppressed.store(self.prev, Ordering::SeqCst);
    }
}
