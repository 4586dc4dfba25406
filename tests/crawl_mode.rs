//! Integration tests for the dynamic crawl modes
//!
//! These tests run full create-stub and delete-stub crawls through the
//! coordinator against the in-memory store, verifying discovery of nested
//! prefixes, quiescence-based termination, recognition of pre-existing
//! markers, and the listing retry behavior.

use std::sync::Arc;
use std::time::Duration;

use stampede::app::coordinator::{Coordinator, RunConfig, RunSummary};
use stampede::app::models::RunMode;
use stampede::app::store::MemoryStore;

/// Time limit for a crawl that quiesces with test-speed polling
const CRAWL_TIMEOUT: Duration = Duration::from_secs(10);

/// Seed a small nested namespace: three directories, three leaf objects
async fn seed_nested(store: &MemoryStore) {
    store.seed_object("a/x.txt", 1).await;
    store.seed_object("a/b/y.txt", 1).await;
    store.seed_object("a/c/z.txt", 1).await;
}

/// Run a crawl to completion under a timeout
async fn crawl(store: Arc<MemoryStore>, config: RunConfig) -> RunSummary {
    let coordinator = Coordinator::new(Arc::new(config), store, None, None);
    tokio::time::timeout(CRAWL_TIMEOUT, coordinator.run())
        .await
        .expect("crawl did not quiesce in time")
        .expect("crawl run failed")
}

#[tokio::test]
async fn test_create_stub_marks_every_prefix_once() {
    let store = Arc::new(MemoryStore::new());
    seed_nested(&store).await;

    let summary = crawl(store.clone(), RunConfig::for_testing(RunMode::CreateStub)).await;

    // One result per discovered directory; the root seed is silent
    assert_eq!(summary.completed, 3);
    assert_eq!(summary.failed, 0);
    assert_eq!(summary.already_existed, 0);
    assert_eq!(summary.expected, None);
    assert!(summary.discovered_entries > 0);

    assert_eq!(store.stub_paths().await, vec!["a", "a/b", "a/c"]);
}

#[tokio::test]
async fn test_second_create_stub_run_recognizes_existing_markers() {
    let store = Arc::new(MemoryStore::new());
    seed_nested(&store).await;

    crawl(store.clone(), RunConfig::for_testing(RunMode::CreateStub)).await;
    let second = crawl(store.clone(), RunConfig::for_testing(RunMode::CreateStub)).await;

    // All three markers already present: recognized, not failed
    assert_eq!(second.failed, 0);
    assert_eq!(second.already_existed, 3);
    assert_eq!(store.stub_paths().await.len(), 3);
}

#[tokio::test]
async fn test_delete_stub_removes_markers_and_keeps_data() {
    let store = Arc::new(MemoryStore::new());
    seed_nested(&store).await;
    crawl(store.clone(), RunConfig::for_testing(RunMode::CreateStub)).await;
    assert_eq!(store.object_count().await, 6);

    let summary = crawl(store.clone(), RunConfig::for_testing(RunMode::DeleteStub)).await;

    assert_eq!(summary.failed, 0);
    assert!(store.stub_paths().await.is_empty());
    // The three leaf objects survive
    assert_eq!(store.object_count().await, 3);
    assert!(store.contains("a/b/y.txt").await);
}

#[tokio::test]
async fn test_transient_listing_failures_are_retried() {
    let store = Arc::new(MemoryStore::new());
    seed_nested(&store).await;
    // First two list calls fail; the default config retries forever
    store.fail_next_lists(2);

    let summary = crawl(store.clone(), RunConfig::for_testing(RunMode::CreateStub)).await;

    assert_eq!(summary.completed, 3);
    assert_eq!(summary.failed, 0);
    assert_eq!(store.stub_paths().await.len(), 3);
}

#[tokio::test]
async fn test_retry_limit_fails_the_prefix_and_terminates() {
    let store = Arc::new(MemoryStore::new());
    seed_nested(&store).await;
    // More failures than the limit allows: the root enumeration gives up
    store.fail_next_lists(100);

    let config = RunConfig {
        list_retry_limit: Some(3),
        ..RunConfig::for_testing(RunMode::CreateStub)
    };
    let summary = crawl(store.clone(), config).await;

    assert_eq!(summary.completed, 1);
    assert_eq!(summary.failed, 1);
    assert!(store.stub_paths().await.is_empty());
}

#[tokio::test]
async fn test_multipage_discovery_finds_each_prefix_once() {
    let store = Arc::new(MemoryStore::with_root("").with_page_size(1));
    for dir in 0..5 {
        store.seed_object(&format!("dir-{dir}/file-0"), 1).await;
        store.seed_object(&format!("dir-{dir}/file-1"), 1).await;
    }

    let summary = crawl(store.clone(), RunConfig::for_testing(RunMode::CreateStub)).await;

    // One result per directory, despite single-key listing pages
    assert_eq!(summary.completed, 5);
    assert_eq!(summary.failed, 0);
    assert_eq!(store.stub_paths().await.len(), 5);
}

#[tokio::test]
async fn test_crawl_under_destination_prefix() {
    let store = Arc::new(MemoryStore::with_root("datasets/run-7"));
    store.seed_object("a/x.txt", 1).await;

    let summary = crawl(store.clone(), RunConfig::for_testing(RunMode::CreateStub)).await;

    assert_eq!(summary.failed, 0);
    assert_eq!(store.stub_paths().await, vec!["a"]);
}
