//! Run scope lifecycle tests
//!
//! Covers the active-run contract: terminal status and end timestamp on
//! every exit path, current-run visibility bounded by the scope, explicit
//! rejection of nested scopes, and the experiment/run distinction.

use std::sync::Arc;

use glyphtrace::run::{RunConfig, RunManager, RunStatus};
use glyphtrace::store::{MemoryMetadataStore, MetadataStore};
use glyphtrace::Error;

fn fixture() -> (Arc<MemoryMetadataStore>, RunManager) {
    let store = Arc::new(MemoryMetadataStore::new());
    let manager = RunManager::new(store.clone());
    (store, manager)
}

// =============================================================================
// Lifecycle
// =============================================================================

#[test]
fn test_scope_success_lifecycle() {
    let (store, manager) = fixture();

    let run_id = manager
        .scope(RunConfig::new("phase2_repetition").with_seed(42), |run| {
            assert_eq!(run.status(), RunStatus::Running);
            assert!(run.timestamp_end().is_none());
            Ok(run.run_id().clone())
        })
        .unwrap();

    let row = store.get_run(&run_id).unwrap().expect("run row persisted");
    assert_eq!(row.status(), RunStatus::Success);
    assert!(row.timestamp_end().unwrap() >= row.timestamp_start());
}

#[test]
fn test_scope_failure_persists_failed_and_propagates() {
    let (store, manager) = fixture();

    let mut run_id = None;
    let err = manager
        .scope(RunConfig::new("phase2_repetition"), |run| {
            run_id = Some(run.run_id().clone());
            Err::<(), _>(Error::Serialization("forced failure".to_string()))
        })
        .unwrap_err();

    // The original error propagates unchanged after bookkeeping.
    assert!(err.to_string().contains("forced failure"));

    let row = store.get_run(&run_id.unwrap()).unwrap().unwrap();
    assert_eq!(row.status(), RunStatus::Failed);
    assert!(row.timestamp_end().is_some());
    assert!(!manager.has_active_run());
}

#[test]
fn test_status_running_persisted_inside_scope() {
    let (store, manager) = fixture();

    manager
        .scope(RunConfig::new("phase5_anchors"), |run| {
            let row = store.get_run(run.run_id()).unwrap().unwrap();
            assert_eq!(row.status(), RunStatus::Running);
            assert!(row.timestamp_end().is_none());
            Ok(())
        })
        .unwrap();
}

// =============================================================================
// Current-run register
// =============================================================================

#[test]
fn test_current_run_cleared_after_scope() {
    let (_store, manager) = fixture();

    assert!(!manager.has_active_run());
    manager
        .scope(RunConfig::new("phase1_foundation"), |run| {
            let current = manager.current_run().unwrap();
            assert_eq!(current.run_id(), run.run_id());
            Ok(())
        })
        .unwrap();
    assert!(matches!(manager.current_run(), Err(Error::NoActiveRun)));
}

#[test]
fn test_current_run_cleared_after_failure() {
    let (_store, manager) = fixture();

    let _ = manager.scope(RunConfig::new("phase1_foundation"), |_| {
        Err::<(), _>(Error::NoActiveRun)
    });
    assert!(!manager.has_active_run());
}

#[test]
fn test_nested_scope_is_explicit_error() {
    let (_store, manager) = fixture();

    manager
        .scope(RunConfig::new("outer"), |outer| {
            let inner = manager.scope(RunConfig::new("inner"), |_| Ok(()));
            match inner {
                Err(Error::RunScopeOccupied { run_id }) => {
                    assert_eq!(run_id, outer.run_id().to_string());
                }
                other => panic!("expected RunScopeOccupied, got {other:?}"),
            }
            // Outer scope is still the current run.
            assert_eq!(
                manager.current_run().unwrap().run_id(),
                outer.run_id()
            );
            Ok(())
        })
        .unwrap();
    assert!(!manager.has_active_run());
}

// =============================================================================
// Experiment / run distinction
// =============================================================================

#[test]
fn test_same_seed_same_experiment_distinct_runs() {
    let (_store, manager) = fixture();

    let first = manager
        .scope(RunConfig::new("phase3_clusters").with_seed(7), |run| {
            Ok((run.experiment_id().to_string(), run.run_id().clone(), *run.run_nonce()))
        })
        .unwrap();
    let second = manager
        .scope(RunConfig::new("phase3_clusters").with_seed(7), |run| {
            Ok((run.experiment_id().to_string(), run.run_id().clone(), *run.run_nonce()))
        })
        .unwrap();

    assert_eq!(first.0, second.0);
    assert_ne!(first.1, second.1);
    assert_ne!(first.2, second.2);
}

#[test]
fn test_invalid_supplied_run_id_rejected() {
    let (store, manager) = fixture();

    let err = manager
        .scope(RunConfig::new("phase1").with_run_id("not-a-uuid"), |_| Ok(()))
        .unwrap_err();
    assert!(matches!(err, Error::InvalidRunId(_)));
    assert!(store.is_empty());
    assert!(!manager.has_active_run());
}

// =============================================================================
// Environment capture
// =============================================================================

#[test]
fn test_environment_snapshot_toggle() {
    let (_store, manager) = fixture();

    manager
        .scope(RunConfig::new("with_env"), |run| {
            assert!(run.environment().is_some());
            Ok(())
        })
        .unwrap();
    manager
        .scope_with(RunConfig::new("without_env"), false, |run| {
            assert!(run.environment().is_none());
            Ok(())
        })
        .unwrap();
}

#[test]
fn test_git_capture_degrades_gracefully() {
    let (_store, manager) = fixture();

    manager
        .scope(RunConfig::new("git_probe"), |run| {
            let commit = run.git().commit();
            assert!(commit.is_empty() || commit.len() == 40);
            Ok(())
        })
        .unwrap();
}
