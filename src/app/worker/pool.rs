//! Worker pool lifecycle
//!
//! Spawns the configured number of workers onto the tokio runtime and joins
//! them at shutdown, folding their per-worker tallies into one summary. The
//! pool itself holds no queue state; workers share the queues they were
//! spawned with.

use std::sync::Arc;

use futures::future::join_all;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use super::core::{Worker, WorkerSummary};
use crate::app::coordinator::{RunConfig, SharedCounters};
use crate::app::crawl::CrawlWorker;
use crate::app::payload::PayloadSource;
use crate::app::queue::{JobProducer, JobQueue, ResultSink};
use crate::app::store::NamespaceStore;

/// Handles to a running set of workers
pub struct WorkerPool {
    handles: Vec<JoinHandle<WorkerSummary>>,
}

impl WorkerPool {
    /// Spawn static-mode workers consuming the job queue
    pub fn start_static(
        config: Arc<RunConfig>,
        store: Arc<dyn NamespaceStore>,
        payload: Option<Arc<PayloadSource>>,
        jobs: JobQueue,
        results: ResultSink,
    ) -> Self {
        let handles = (0..config.parallelism)
            .map(|id| {
                let worker = Worker::new(
                    id as u32,
                    Arc::clone(&config),
                    Arc::clone(&store),
                    payload.clone(),
                    jobs.clone(),
                    results.clone(),
                );
                tokio::spawn(worker.run())
            })
            .collect::<Vec<_>>();

        info!("started {} workers for {} run", handles.len(), config.mode);
        Self { handles }
    }

    /// Spawn crawl workers that both consume and re-inject jobs
    pub fn start_crawl(
        config: Arc<RunConfig>,
        store: Arc<dyn NamespaceStore>,
        jobs: JobQueue,
        producer: JobProducer,
        results: ResultSink,
        counters: Arc<SharedCounters>,
    ) -> Self {
        let handles = (0..config.parallelism)
            .map(|id| {
                let worker = CrawlWorker::new(
                    id as u32,
                    Arc::clone(&config),
                    Arc::clone(&store),
                    jobs.clone(),
                    producer.clone(),
                    results.clone(),
                    Arc::clone(&counters),
                );
                tokio::spawn(worker.run())
            })
            .collect::<Vec<_>>();

        info!("started {} crawl workers for {} run", handles.len(), config.mode);
        Self { handles }
    }

    /// Number of spawned workers
    pub fn worker_count(&self) -> usize {
        self.handles.len()
    }

    /// Wait for every worker to finish and fold their tallies
    pub async fn join(self) -> WorkerSummary {
        let mut summary = WorkerSummary::default();
        for result in join_all(self.handles).await {
            match result {
                Ok(worker_summary) => summary.merge(worker_summary),
                Err(e) => warn!("worker task panicked: {}", e),
            }
        }
        summary
    }
}
