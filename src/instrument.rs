//! Explicit timing wrappers
//!
//! Instrumentation is composed at call sites: take an operation, get back
//! an instrumented operation. No annotations, no interception.

use std::time::Instant;

/// Run `op` and log its wall-clock duration under `label`.
pub fn timed<T>(label: &str, op: impl FnOnce() -> T) -> T {
    let start = Instant::now();
    let out = op();
    tracing::debug!(
        target: "glyphtrace::timing",
        label,
        elapsed_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX),
        "operation timed"
    );
    out
}

/// Wrap an operation so every invocation is timed under `label`.
pub fn instrumented<A, T, F>(label: &'static str, mut op: F) -> impl FnMut(A) -> T
where
    F: FnMut(A) -> T,
{
    move |arg| {
        let start = Instant::now();
        let out = op(arg);
        tracing::debug!(
            target: "glyphtrace::timing",
            label,
            elapsed_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX),
            "operation timed"
        );
        out
    }
}
