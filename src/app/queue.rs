//! Bounded work conduits
//!
//! Two conduits connect the pipeline: the job queue feeding the worker pool
//! and the result queue feeding the reporter. Both are bounded FIFOs over
//! `tokio::sync::mpsc`; producers block on send when full and consumers
//! block on receive when empty.
//!
//! Closing is a one-time, irreversible "no further items" signal. The job
//! queue closes two ways: static runs drop the generator's producer (the
//! workers hold no job producers, so the channel closes naturally once the
//! last item is drained), while the dynamic crawl closes explicitly through
//! [`JobQueue::close`] because crawl workers keep producers alive for
//! re-injection. Either way, consumers drain any buffered items and then
//! observe end-of-sequence.

use std::sync::Arc;

use tokio::sync::{mpsc, watch, Mutex};

use super::models::WorkItem;
use crate::errors::QueueError;

/// Create a job conduit with the given capacity
pub fn job_channel(capacity: usize) -> (JobProducer, JobQueue) {
    let (tx, rx) = mpsc::channel(capacity);
    let (closed_tx, closed_rx) = watch::channel(false);

    let producer = JobProducer {
        tx,
        closed: closed_rx,
    };
    let queue = JobQueue {
        rx: Arc::new(Mutex::new(rx)),
        closed: Arc::new(closed_tx),
    };
    (producer, queue)
}

/// Producing side of the job queue
///
/// Cloned into the static generator or into every crawl worker. Sending
/// transfers ownership of the item to the queue.
#[derive(Debug, Clone)]
pub struct JobProducer {
    tx: mpsc::Sender<WorkItem>,
    closed: watch::Receiver<bool>,
}

impl JobProducer {
    /// Send an item, blocking while the queue is full
    pub async fn send(&self, item: WorkItem) -> Result<(), QueueError> {
        if *self.closed.borrow() {
            return Err(QueueError::Closed);
        }
        self.tx.send(item).await.map_err(|_| QueueError::Closed)
    }

    /// Attempt to send without blocking; returns the item when the queue is
    /// momentarily full so the caller can fall back to an async send.
    pub fn try_send(&self, item: WorkItem) -> Result<(), TrySendOutcome> {
        if *self.closed.borrow() {
            return Err(TrySendOutcome::Closed);
        }
        self.tx.try_send(item).map_err(|e| match e {
            mpsc::error::TrySendError::Full(item) => TrySendOutcome::Full(item),
            mpsc::error::TrySendError::Closed(_) => TrySendOutcome::Closed,
        })
    }
}

/// Outcome of a non-blocking send attempt
#[derive(Debug)]
pub enum TrySendOutcome {
    /// Queue momentarily full; the item is handed back
    Full(WorkItem),
    /// Queue closed; the item is dropped
    Closed,
}

/// Consuming side of the job queue, shared by all workers
#[derive(Debug, Clone)]
pub struct JobQueue {
    rx: Arc<Mutex<mpsc::Receiver<WorkItem>>>,
    closed: Arc<watch::Sender<bool>>,
}

impl JobQueue {
    /// Receive the next item, blocking until one is available
    ///
    /// Returns `None` once the queue is closed and drained: either all
    /// producers were dropped, or [`close`](Self::close) was called and no
    /// buffered item remains.
    pub async fn recv(&self) -> Option<WorkItem> {
        let mut closed = self.closed.subscribe();
        let mut guard = self.rx.lock().await;

        if *closed.borrow_and_update() {
            return guard.try_recv().ok();
        }

        tokio::select! {
            item = guard.recv() => item,
            _ = closed.changed() => guard.try_recv().ok(),
        }
    }

    /// Close the queue: no further items will be produced
    ///
    /// One-time and irreversible. Producers observe `Closed` on subsequent
    /// sends; consumers drain buffered items and then see end-of-sequence.
    pub fn close(&self) {
        let _ = self.closed.send(true);
    }
}

/// Producing side of the result queue, cloned into every worker
///
/// Publishing is best-effort: the static reporter closes the queue itself
/// once the expected count is reached, and a late result must not wedge a
/// worker.
#[derive(Debug, Clone)]
pub struct ResultSink {
    tx: mpsc::Sender<WorkItem>,
}

impl ResultSink {
    /// Publish a completed item, blocking while the queue is full
    pub async fn publish(&self, item: WorkItem) {
        let _ = self.tx.send(item).await;
    }
}

/// Create a result conduit with the given capacity
///
/// The receiver goes straight to the consumer; dropping it closes the queue.
pub fn result_channel(capacity: usize) -> (ResultSink, mpsc::Receiver<WorkItem>) {
    let (tx, rx) = mpsc::channel(capacity);
    (ResultSink { tx }, rx)
}
