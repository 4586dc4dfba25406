//! Dynamic namespace crawl
//!
//! Crawl workers drive the stub modes: each dequeued item is a directory
//! prefix whose children are enumerated page by page. Every child prefix
//! found gets the stub action applied on the spot, a completed result
//! emitted for observability, and a fresh item re-injected into the job
//! queue so its own children are expanded in turn. Workers are both
//! consumers and producers, so the queue never closes on its own — the
//! coordinator's quiescence detector closes it once the whole pool has gone
//! idle.
//!
//! Listing failures are retried in place after a pause; a prefix is only
//! given up on when a retry limit is configured and exhausted, in which
//! case the dequeued item itself is reported failed. Discovered entry
//! counts are batched locally and flushed to the shared counter at a
//! threshold, so the hot loop does not hammer a shared atomic per entry.

use std::sync::Arc;

use tokio::time::sleep;
use tracing::{debug, warn};

use super::coordinator::{RunConfig, SharedCounters};
use super::models::{StubAction, WorkItem};
use super::queue::{JobProducer, JobQueue, ResultSink, TrySendOutcome};
use super::store::NamespaceStore;
use super::worker::WorkerSummary;
use crate::errors::{StoreError, StoreResult};

/// A worker for the dynamic stub modes
pub struct CrawlWorker {
    id: u32,
    config: Arc<RunConfig>,
    store: Arc<dyn NamespaceStore>,
    jobs: JobQueue,
    producer: JobProducer,
    results: ResultSink,
    counters: Arc<SharedCounters>,
}

impl CrawlWorker {
    /// Create a crawl worker bound to the shared queues and counters
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: u32,
        config: Arc<RunConfig>,
        store: Arc<dyn NamespaceStore>,
        jobs: JobQueue,
        producer: JobProducer,
        results: ResultSink,
        counters: Arc<SharedCounters>,
    ) -> Self {
        debug_assert!(config.mode.is_dynamic());
        Self {
            id,
            config,
            store,
            jobs,
            producer,
            results,
            counters,
        }
    }

    /// Consume prefixes until the coordinator closes the queue
    pub async fn run(self) -> WorkerSummary {
        // Mode is dynamic by construction
        let action = self
            .config
            .mode
            .stub_action()
            .expect("crawl worker started for a static mode");

        let mut summary = WorkerSummary::default();
        let mut pending_discovered = 0u64;

        while let Some(mut item) = self.jobs.recv().await {
            self.counters.worker_busy();
            item.mark_in_progress(self.id);

            if let Err(e) = self
                .expand(&item.path, action, &mut pending_discovered, &mut summary)
                .await
            {
                warn!(
                    "worker {}: giving up on prefix {:?} after exhausting listing retries: {}",
                    self.id, item.path, e
                );
                item.mark_failed(e.to_string());
                summary.processed += 1;
                summary.failed += 1;
                self.results.publish(item).await;
            }
            self.counters.worker_idle();
        }

        if pending_discovered > 0 {
            self.counters.add_discovered(pending_discovered);
        }
        debug!(
            "crawl worker {} finished: {} stub results, {} failed",
            self.id, summary.processed, summary.failed
        );
        summary
    }

    /// Enumerate every direct child of a prefix, processing each child
    /// prefix as it surfaces
    ///
    /// Pages are fetched until the continuation token runs out. A failed
    /// fetch is retried in place after [`RunConfig::list_retry_delay`];
    /// without a configured retry limit this never gives up.
    async fn expand(
        &self,
        path: &str,
        action: StubAction,
        pending_discovered: &mut u64,
        summary: &mut WorkerSummary,
    ) -> StoreResult<()> {
        let prefix = if path.is_empty() {
            String::new()
        } else {
            format!("{path}/")
        };

        let mut token: Option<String> = None;
        let mut attempts = 0u32;

        loop {
            let page = match self.store.list_page(&prefix, token.as_deref()).await {
                Ok(page) => {
                    attempts = 0;
                    page
                }
                Err(e) => {
                    attempts += 1;
                    if let Some(limit) = self.config.list_retry_limit {
                        if attempts >= limit {
                            return Err(e);
                        }
                    }
                    warn!(
                        "worker {}: listing {:?} failed (attempt {}), retrying: {}",
                        self.id, prefix, attempts, e
                    );
                    sleep(self.config.list_retry_delay).await;
                    continue;
                }
            };

            *pending_discovered += (page.entries.len() + page.prefixes.len()) as u64;
            if *pending_discovered >= self.config.discovery_flush_threshold {
                self.counters.add_discovered(*pending_discovered);
                *pending_discovered = 0;
            }

            for child in page.prefixes {
                let dir = child.trim_end_matches('/').to_string();

                // Stub action and result at discovery time; the re-injected
                // item only drives the child's own enumeration later
                let mut discovered = WorkItem::directory(dir.clone());
                discovered.mark_in_progress(self.id);
                self.apply_stub(action, &mut discovered).await;
                if discovered.status == super::models::JobStatus::Failed {
                    summary.failed += 1;
                }
                summary.processed += 1;
                self.results.publish(discovered).await;

                self.reinject(dir);
            }

            match page.next_token {
                Some(next) => token = Some(next),
                None => return Ok(()),
            }
        }
    }

    /// Re-inject a discovered prefix as new work
    ///
    /// The fast path is a non-blocking send. A momentarily full queue falls
    /// back to one detached blocking send, so enumeration never stalls on
    /// its own queue. A closed queue means the run is ending and the prefix
    /// is dropped.
    fn reinject(&self, child: String) {
        match self.producer.try_send(WorkItem::directory(child)) {
            Ok(()) => {}
            Err(TrySendOutcome::Full(item)) => {
                let producer = self.producer.clone();
                tokio::spawn(async move {
                    if producer.send(item).await.is_err() {
                        debug!("job queue closed before re-injection completed");
                    }
                });
            }
            Err(TrySendOutcome::Closed) => {
                debug!("job queue closed, dropping discovered prefix");
            }
        }
    }

    /// Apply the stub action to a discovered directory prefix
    async fn apply_stub(&self, action: StubAction, item: &mut WorkItem) {
        let outcome = match action {
            StubAction::Create => match self.store.create_stub(&item.path).await {
                Err(StoreError::AlreadyExists { .. }) => {
                    item.mark_succeeded_existing();
                    return;
                }
                other => other,
            },
            StubAction::Delete => self.store.delete(&item.path).await,
        };

        match outcome {
            Ok(()) => item.mark_succeeded(),
            Err(e) => {
                warn!("worker {}: stub action failed for {}: {}", self.id, item.path, e);
                item.mark_failed(e.to_string());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::models::{JobStatus, RunMode};
    use crate::app::queue::{job_channel, result_channel};
    use crate::app::store::MemoryStore;

    fn crawl_setup(
        mode: RunMode,
        store: Arc<MemoryStore>,
    ) -> (
        CrawlWorker,
        JobProducer,
        JobQueue,
        tokio::sync::mpsc::Receiver<WorkItem>,
        Arc<SharedCounters>,
    ) {
        let config = Arc::new(RunConfig {
            parallelism: 1,
            ..RunConfig::for_testing(mode)
        });
        let (producer, jobs) = job_channel(1024);
        let (sink, results) = result_channel(1024);
        let counters = Arc::new(SharedCounters::new(1));
        let worker = CrawlWorker::new(
            0,
            Arc::clone(&config),
            store,
            jobs.clone(),
            producer.clone(),
            sink,
            Arc::clone(&counters),
        );
        (worker, producer, jobs, results, counters)
    }

    #[tokio::test]
    async fn test_discovery_stubs_and_reinjects_children() {
        let store = Arc::new(MemoryStore::new());
        store.seed_object("a/x.txt", 1).await;
        store.seed_object("b/y.txt", 1).await;
        let (worker, producer, jobs, mut results, counters) =
            crawl_setup(RunMode::CreateStub, store.clone());

        let handle = tokio::spawn(worker.run());
        producer.send(WorkItem::root()).await.unwrap();

        // One result per discovered prefix; the root seed itself is silent
        let mut paths = Vec::new();
        for _ in 0..2 {
            let item = results.recv().await.unwrap();
            assert_eq!(item.status, JobStatus::Succeeded);
            paths.push(item.path);
        }
        jobs.close();
        let summary = handle.await.unwrap();

        paths.sort();
        assert_eq!(paths, vec!["a", "b"]);
        assert_eq!(summary.processed, 2);
        assert_eq!(summary.failed, 0);
        assert_eq!(store.stub_paths().await, vec!["a", "b"]);
        // Root pass saw two prefixes, each child pass one entry
        assert_eq!(counters.discovered(), 4);
    }

    #[tokio::test]
    async fn test_existing_stub_is_recognized() {
        let store = Arc::new(MemoryStore::new());
        store.seed_object("a/x.txt", 1).await;
        store.create_stub("a").await.unwrap();
        let (worker, producer, jobs, mut results, _counters) =
            crawl_setup(RunMode::CreateStub, store.clone());

        let handle = tokio::spawn(worker.run());
        producer.send(WorkItem::root()).await.unwrap();

        let item = results.recv().await.unwrap();
        assert_eq!(item.path, "a");
        assert_eq!(item.status, JobStatus::Succeeded);
        assert!(item.already_existed);

        jobs.close();
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_delete_stub_failure_reported() {
        let store = Arc::new(MemoryStore::new());
        store.seed_object("a/x.txt", 1).await;
        let (worker, producer, jobs, mut results, _counters) =
            crawl_setup(RunMode::DeleteStub, store);

        // No marker exists at "a", so the delete fails
        let handle = tokio::spawn(worker.run());
        producer.send(WorkItem::root()).await.unwrap();

        let item = results.recv().await.unwrap();
        assert_eq!(item.path, "a");
        assert_eq!(item.status, JobStatus::Failed);
        assert!(item.error.is_some());

        jobs.close();
        let summary = handle.await.unwrap();
        assert_eq!(summary.failed, 1);
    }

    #[tokio::test]
    async fn test_listing_retries_until_success() {
        let store = Arc::new(MemoryStore::new());
        store.seed_object("a/x.txt", 1).await;
        store.fail_next_lists(2);
        let (worker, producer, jobs, mut results, _counters) =
            crawl_setup(RunMode::CreateStub, store.clone());

        let handle = tokio::spawn(worker.run());
        producer.send(WorkItem::root()).await.unwrap();

        let item = results.recv().await.unwrap();
        assert_eq!(item.path, "a");
        assert_eq!(item.status, JobStatus::Succeeded);

        jobs.close();
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_retry_limit_gives_up_with_failure() {
        let store = Arc::new(MemoryStore::new());
        store.seed_object("a/x.txt", 1).await;
        store.fail_next_lists(10);
        let config = Arc::new(RunConfig {
            parallelism: 1,
            list_retry_limit: Some(3),
            ..RunConfig::for_testing(RunMode::CreateStub)
        });
        let (producer, jobs) = job_channel(64);
        let (sink, mut results) = result_channel(64);
        let counters = Arc::new(SharedCounters::new(1));
        let worker = CrawlWorker::new(
            0,
            config,
            store,
            jobs.clone(),
            producer.clone(),
            sink,
            counters,
        );

        let handle = tokio::spawn(worker.run());
        producer.send(WorkItem::root()).await.unwrap();

        // The dequeued root itself is reported failed
        let item = results.recv().await.unwrap();
        assert_eq!(item.path, "");
        assert_eq!(item.status, JobStatus::Failed);
        assert!(item.error.is_some());

        jobs.close();
        let summary = handle.await.unwrap();
        assert_eq!(summary.failed, 1);
    }
}
