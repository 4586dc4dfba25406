//! Static-mode worker
//!
//! One worker: dequeue, apply the run's store operation, record the outcome
//! on the item, publish it to the result queue, repeat until the job queue
//! closes. A failed item is reported and the worker moves on — per-item
//! errors never stop the run. Network-level retry belongs to the store
//! backend; the worker performs exactly one attempt per item.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::app::coordinator::RunConfig;
use crate::app::models::{RunMode, WorkItem};
use crate::app::payload::PayloadSource;
use crate::app::queue::{JobQueue, ResultSink};
use crate::app::store::{NamespaceStore, WriteOptions};
use crate::errors::StoreResult;

/// Per-worker tally returned at join time
#[derive(Debug, Clone, Copy, Default)]
pub struct WorkerSummary {
    /// Items processed to a terminal state
    pub processed: u64,
    /// Items that ended failed
    pub failed: u64,
}

impl WorkerSummary {
    /// Fold another worker's tally into this one
    pub fn merge(&mut self, other: WorkerSummary) {
        self.processed += other.processed;
        self.failed += other.failed;
    }
}

/// A single static-mode worker
pub struct Worker {
    id: u32,
    config: Arc<RunConfig>,
    store: Arc<dyn NamespaceStore>,
    payload: Option<Arc<PayloadSource>>,
    jobs: JobQueue,
    results: ResultSink,
}

impl Worker {
    /// Create a worker bound to the shared queues
    pub fn new(
        id: u32,
        config: Arc<RunConfig>,
        store: Arc<dyn NamespaceStore>,
        payload: Option<Arc<PayloadSource>>,
        jobs: JobQueue,
        results: ResultSink,
    ) -> Self {
        debug_assert!(!config.mode.is_dynamic());
        Self {
            id,
            config,
            store,
            payload,
            jobs,
            results,
        }
    }

    /// Consume the job queue until it closes
    pub async fn run(self) -> WorkerSummary {
        let mut summary = WorkerSummary::default();

        while let Some(mut item) = self.jobs.recv().await {
            item.mark_in_progress(self.id);

            match self.apply(&item).await {
                Ok(()) => item.mark_succeeded(),
                Err(e) => {
                    warn!("worker {}: {} failed for {}: {}", self.id, self.config.mode, item.path, e);
                    item.mark_failed(e.to_string());
                    summary.failed += 1;
                }
            }
            summary.processed += 1;
            self.results.publish(item).await;
        }

        debug!(
            "worker {} finished: {} processed, {} failed",
            self.id, summary.processed, summary.failed
        );
        summary
    }

    /// Apply the run's operation to one item, exactly one attempt
    async fn apply(&self, item: &WorkItem) -> StoreResult<()> {
        match self.config.mode {
            RunMode::Populate => self.populate(&item.path).await,
            RunMode::Delete => self.store.delete(&item.path).await,
            RunMode::Retier => {
                // Presence enforced by RunConfig::validate
                let tier = self.config.tier.as_deref().unwrap_or_default();
                self.store.set_tier(&item.path, tier).await
            }
            RunMode::CreateStub | RunMode::DeleteStub => {
                unreachable!("dynamic modes run through the crawl controller")
            }
        }
    }

    async fn populate(&self, path: &str) -> StoreResult<()> {
        let source = match self.payload.as_ref() {
            Some(source) => source,
            None => {
                return Err(crate::errors::StoreError::backend(
                    "populate run without a payload source",
                ))
            }
        };
        let data = match source.generate() {
            Ok(data) => data,
            Err(e) => {
                return Err(crate::errors::StoreError::backend(format!(
                    "payload generation: {e}"
                )))
            }
        };

        let opts = WriteOptions {
            checksum: self
                .config
                .with_checksum
                .then(|| source.checksum(&data)),
            tier: self.config.tier.clone(),
        };
        self.store.write(path, &data, &opts).await
    }
}
