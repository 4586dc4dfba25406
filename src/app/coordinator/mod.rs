//! Run orchestration
//!
//! The coordinator owns a run end to end: it wires the queues, starts the
//! worker pool, feeds or seeds the job queue, consumes results, and decides
//! when the run is over. Static runs terminate on an exact count; dynamic
//! runs terminate when the quiescence detector sees the whole pool idle
//! across enough consecutive polls.

pub mod config;
pub mod counters;
pub mod quiescence;

pub use config::RunConfig;
pub use counters::SharedCounters;
pub use quiescence::QuiescenceDetector;

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::mpsc;
use tokio::time::{interval_at, Instant};
use tracing::{debug, info, warn};

use super::generator::JobGenerator;
use super::models::{JobStatus, RunMode, WorkItem};
use super::payload::PayloadSource;
use super::queue::{job_channel, result_channel};
use super::store::NamespaceStore;
use super::worker::WorkerPool;
use crate::constants::queues;
use crate::errors::{AppError, Result};

/// Progress notifications emitted toward the display layer
///
/// Delivery is best-effort: a saturated display never stalls the engine.
#[derive(Debug, Clone)]
pub enum ProgressEvent {
    /// The run started; `expected` is known for static runs only
    Started { expected: Option<u64> },
    /// One item reached a terminal state
    ItemCompleted {
        path: String,
        status: JobStatus,
        already_existed: bool,
    },
    /// Periodic dynamic-run heartbeat
    Heartbeat { discovered: u64 },
    /// The run finished
    Finished,
}

/// Final tally of one run
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    /// Operation performed
    pub mode: RunMode,
    /// Exact item count, known for static runs only
    pub expected: Option<u64>,
    /// Items that reached a terminal state
    pub completed: u64,
    /// Items that succeeded
    pub succeeded: u64,
    /// Items that failed
    pub failed: u64,
    /// Stub creations that found the marker already present
    pub already_existed: u64,
    /// Namespace entries discovered by a dynamic crawl
    pub discovered_entries: u64,
    /// Wall-clock start of the run
    pub started_at: DateTime<Utc>,
    /// Total run duration
    pub elapsed: Duration,
}

/// Running tally folded from the result stream
#[derive(Debug, Default)]
struct Tally {
    completed: u64,
    succeeded: u64,
    failed: u64,
    already_existed: u64,
}

impl Tally {
    fn record(&mut self, item: &WorkItem) {
        self.completed += 1;
        match item.status {
            JobStatus::Succeeded => {
                self.succeeded += 1;
                if item.already_existed {
                    self.already_existed += 1;
                }
            }
            JobStatus::Failed => self.failed += 1,
            JobStatus::Waiting | JobStatus::InProgress => {
                debug_assert!(false, "non-terminal item on the result queue");
            }
        }
    }
}

/// Orchestrates one run from start to summary
pub struct Coordinator {
    config: Arc<RunConfig>,
    store: Arc<dyn NamespaceStore>,
    payload: Option<Arc<PayloadSource>>,
    progress: Option<mpsc::Sender<ProgressEvent>>,
}

impl Coordinator {
    /// Create a coordinator for a validated configuration
    pub fn new(
        config: Arc<RunConfig>,
        store: Arc<dyn NamespaceStore>,
        payload: Option<Arc<PayloadSource>>,
        progress: Option<mpsc::Sender<ProgressEvent>>,
    ) -> Self {
        Self {
            config,
            store,
            payload,
            progress,
        }
    }

    /// Execute the run to completion
    pub async fn run(self) -> Result<RunSummary> {
        let started_at = Utc::now();
        let started = std::time::Instant::now();
        info!(
            "starting {} run with {} workers",
            self.config.mode, self.config.parallelism
        );

        let (tally, discovered) = if self.config.mode.is_dynamic() {
            self.run_dynamic().await?
        } else {
            self.run_static().await?
        };

        self.emit(ProgressEvent::Finished);
        let summary = RunSummary {
            mode: self.config.mode,
            expected: (!self.config.mode.is_dynamic()).then(|| self.config.expected_items()),
            completed: tally.completed,
            succeeded: tally.succeeded,
            failed: tally.failed,
            already_existed: tally.already_existed,
            discovered_entries: discovered,
            started_at,
            elapsed: started.elapsed(),
        };
        info!(
            "{} run finished in {:.1}s: {} completed, {} failed",
            summary.mode,
            summary.elapsed.as_secs_f64(),
            summary.completed,
            summary.failed
        );
        Ok(summary)
    }

    /// Static run: exact count known up front, terminate on the last result
    async fn run_static(&self) -> Result<(Tally, u64)> {
        let expected = self.config.expected_items();
        let capacity = (self.config.parallelism * queues::STATIC_CAPACITY_FACTOR).max(1);
        let (producer, jobs) = job_channel(capacity);
        let (sink, mut results) = result_channel(capacity);

        // Workers first, so the bounded queue has consumers before the
        // generator starts filling it
        let pool = WorkerPool::start_static(
            Arc::clone(&self.config),
            Arc::clone(&self.store),
            self.payload.clone(),
            jobs,
            sink,
        );
        let generator = JobGenerator::new(
            self.config.dirs,
            self.config.files,
            self.config.depth,
            producer,
        );
        let generation = tokio::spawn(generator.run());
        self.emit(ProgressEvent::Started {
            expected: Some(expected),
        });

        let mut tally = Tally::default();
        let mut last_logged_percent = 0u64;
        while let Some(item) = results.recv().await {
            tally.record(&item);
            self.emit(ProgressEvent::ItemCompleted {
                path: item.path.clone(),
                status: item.status,
                already_existed: item.already_existed,
            });

            if expected > 0 {
                let percent = tally.completed * 100 / expected;
                if percent >= last_logged_percent + 10 {
                    last_logged_percent = percent - percent % 10;
                    info!(
                        "{}% complete ({}/{} items)",
                        last_logged_percent, tally.completed, expected
                    );
                }
            }
            if tally.completed == expected {
                break;
            }
        }
        // Closing the result queue here also covers the degenerate zero-item
        // run; late publishes are dropped silently
        drop(results);

        match generation.await {
            Ok(Ok(produced)) => debug!("generator produced {} items", produced),
            Ok(Err(e)) => warn!("generator stopped early: {}", e),
            Err(e) => return Err(AppError::generic(format!("generator task failed: {e}"))),
        }
        let worker_summary = pool.join().await;
        debug_assert_eq!(worker_summary.processed, tally.completed);

        Ok((tally, 0))
    }

    /// Dynamic run: seed the root, then crawl until quiescence
    async fn run_dynamic(&self) -> Result<(Tally, u64)> {
        let (producer, jobs) = job_channel(queues::DYNAMIC_CAPACITY);
        let capacity = (self.config.parallelism * queues::STATIC_CAPACITY_FACTOR).max(1);
        let (sink, mut results) = result_channel(capacity);
        let counters = Arc::new(SharedCounters::new(self.config.parallelism));

        let pool = WorkerPool::start_crawl(
            Arc::clone(&self.config),
            Arc::clone(&self.store),
            jobs.clone(),
            producer.clone(),
            sink,
            Arc::clone(&counters),
        );
        producer
            .send(WorkItem::root())
            .await
            .map_err(|e| AppError::generic(format!("seeding the crawl: {e}")))?;
        // Workers hold their own producer clones for re-injection
        drop(producer);
        self.emit(ProgressEvent::Started { expected: None });

        let mut detector = QuiescenceDetector::new(
            self.config.parallelism,
            self.config.idle_tick_threshold,
        );
        // interval_at skips tokio's immediate first tick; the first poll
        // must not observe the pool before the seed is dequeued
        let mut poll = interval_at(
            Instant::now() + self.config.poll_interval,
            self.config.poll_interval,
        );
        let mut heartbeat = interval_at(
            Instant::now() + self.config.heartbeat_interval,
            self.config.heartbeat_interval,
        );

        let mut tally = Tally::default();
        loop {
            tokio::select! {
                maybe = results.recv() => match maybe {
                    Some(item) => {
                        detector.record_result();
                        tally.record(&item);
                        self.emit(ProgressEvent::ItemCompleted {
                            path: item.path.clone(),
                            status: item.status,
                            already_existed: item.already_existed,
                        });
                    }
                    None => break,
                },
                _ = poll.tick() => {
                    if detector.observe_tick(counters.idle_workers()) {
                        info!(
                            "crawl quiesced after {} prefixes, closing job queue",
                            tally.completed
                        );
                        jobs.close();
                        break;
                    }
                }
                _ = heartbeat.tick() => {
                    info!(
                        "crawl in progress: {} entries discovered, {} prefixes completed",
                        counters.discovered(),
                        tally.completed
                    );
                    self.emit(ProgressEvent::Heartbeat {
                        discovered: counters.discovered(),
                    });
                }
            }
        }

        let worker_summary = pool.join().await;
        debug!(
            "crawl pool joined: {} prefixes processed across workers",
            worker_summary.processed
        );
        // Results published between the last recv and the close
        while let Ok(item) = results.try_recv() {
            tally.record(&item);
        }

        Ok((tally, counters.discovered()))
    }

    fn emit(&self, event: ProgressEvent) {
        if let Some(tx) = &self.progress {
            let _ = tx.try_send(event);
        }
    }
}
