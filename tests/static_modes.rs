//! Integration tests for the static run modes
//!
//! These tests drive full populate, delete and retier runs end to end
//! through the coordinator against the in-memory store, verifying exact
//! completion counts, failure isolation and the generated path grammar.

use std::sync::Arc;

use stampede::app::coordinator::{Coordinator, RunConfig};
use stampede::app::models::RunMode;
use stampede::app::payload::PayloadSource;
use stampede::app::store::{MemoryStore, NamespaceStore};
use stampede::app::build_path;

/// Create a fast coordinator configuration for static-mode testing
fn static_config(mode: RunMode, dirs: u64, files: u64) -> RunConfig {
    RunConfig {
        dirs,
        files,
        ..RunConfig::for_testing(mode)
    }
}

/// Run a populate over a fresh store and return the store for inspection
async fn populate(store: Arc<MemoryStore>, dirs: u64, files: u64) -> stampede::app::RunSummary {
    let config = Arc::new(static_config(RunMode::Populate, dirs, files));
    let payload = Some(Arc::new(PayloadSource::zero(64)));
    let store: Arc<dyn NamespaceStore> = store;
    Coordinator::new(config, store, payload, None)
        .run()
        .await
        .expect("populate run failed")
}

#[tokio::test]
async fn test_populate_creates_every_item() {
    let store = Arc::new(MemoryStore::new());
    let summary = populate(store.clone(), 2, 3).await;

    assert_eq!(summary.expected, Some(6));
    assert_eq!(summary.completed, 6);
    assert_eq!(summary.succeeded, 6);
    assert_eq!(summary.failed, 0);
    assert_eq!(store.object_count().await, 6);

    for dir in 0..2 {
        for file in 0..3 {
            let path = build_path(dir, file, 0);
            assert!(store.contains(&path).await, "missing {path}");
        }
    }
}

#[tokio::test]
async fn test_populate_with_depth_nests_paths() {
    let store = Arc::new(MemoryStore::new());
    let config = Arc::new(RunConfig {
        dirs: 1,
        files: 1,
        depth: 3,
        ..RunConfig::for_testing(RunMode::Populate)
    });
    Coordinator::new(
        config,
        store.clone(),
        Some(Arc::new(PayloadSource::zero(8))),
        None,
    )
    .run()
    .await
    .unwrap();

    assert!(store.contains("dir-0/1/2/3/file-0").await);
}

#[tokio::test]
async fn test_populate_failures_are_isolated() {
    let store = Arc::new(MemoryStore::new());
    // Every path containing "file-1" fails at the backend
    store.fail_writes_containing("file-1").await;

    let summary = populate(store.clone(), 2, 3).await;

    // The run still completes the full count; only the poisoned items fail
    assert_eq!(summary.completed, 6);
    assert_eq!(summary.failed, 2);
    assert_eq!(summary.succeeded, 4);
    assert_eq!(store.object_count().await, 4);
}

#[tokio::test]
async fn test_populate_honors_destination_prefix() {
    let store = Arc::new(MemoryStore::with_root("datasets/run-7"));
    populate(store.clone(), 1, 2).await;

    // Paths inside the run are root-relative; the store joins the prefix
    assert!(store.contains("dir-0/file-0").await);
    assert!(store.contains("dir-0/file-1").await);
}

#[tokio::test]
async fn test_delete_removes_populated_dataset() {
    let store = Arc::new(MemoryStore::new());
    populate(store.clone(), 2, 2).await;
    assert_eq!(store.object_count().await, 4);

    let config = Arc::new(static_config(RunMode::Delete, 2, 2));
    let summary = Coordinator::new(config, store.clone(), None, None)
        .run()
        .await
        .unwrap();

    assert_eq!(summary.completed, 4);
    assert_eq!(summary.failed, 0);
    assert_eq!(store.object_count().await, 0);
}

#[tokio::test]
async fn test_delete_of_missing_items_fails_per_item() {
    let store = Arc::new(MemoryStore::new());
    let config = Arc::new(static_config(RunMode::Delete, 1, 3));
    let summary = Coordinator::new(config, store, None, None)
        .run()
        .await
        .unwrap();

    // Nothing exists, so every delete fails, but the run still terminates
    assert_eq!(summary.completed, 3);
    assert_eq!(summary.failed, 3);
}

#[tokio::test]
async fn test_retier_moves_every_item() {
    let store = Arc::new(MemoryStore::new());
    populate(store.clone(), 1, 3).await;

    let config = Arc::new(RunConfig {
        tier: Some("Archive".to_string()),
        ..static_config(RunMode::Retier, 1, 3)
    });
    let summary = Coordinator::new(config, store.clone(), None, None)
        .run()
        .await
        .unwrap();
    assert_eq!(summary.succeeded, 3);

    for file in 0..3 {
        let props = store
            .get_properties(&build_path(0, file, 0))
            .await
            .unwrap();
        assert_eq!(props.tier.as_deref(), Some("Archive"));
    }
}

#[tokio::test]
async fn test_checksum_propagates_to_store() {
    let store = Arc::new(MemoryStore::new());
    let config = Arc::new(RunConfig {
        dirs: 1,
        files: 1,
        with_checksum: true,
        ..RunConfig::for_testing(RunMode::Populate)
    });
    let payload = PayloadSource::zero(32);
    let expected = payload.checksum(&payload.generate().unwrap());

    Coordinator::new(config, store.clone(), Some(Arc::new(payload)), None)
        .run()
        .await
        .unwrap();

    let props = store.get_properties("dir-0/file-0").await.unwrap();
    assert_eq!(props.checksum, Some(expected));
    assert_eq!(props.size, 32);
}

#[tokio::test]
async fn test_zero_item_run_terminates() {
    let store = Arc::new(MemoryStore::new());
    let summary = populate(store, 0, 100).await;
    assert_eq!(summary.expected, Some(0));
    assert_eq!(summary.completed, 0);
}
