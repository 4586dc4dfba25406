//! Core engine for bulk namespace operations
//!
//! This module contains the task-distribution machinery: the work item data
//! model, the bounded queues, the static generator, the worker pool, the
//! dynamic crawl, and the coordinator that ties a run together over a
//! pluggable [`store::NamespaceStore`] backend.
//!
//! # Examples
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use stampede::app::coordinator::{Coordinator, RunConfig};
//! use stampede::app::models::RunMode;
//! use stampede::app::payload::PayloadSource;
//! use stampede::app::store::{MemoryStore, NamespaceStore};
//!
//! # async fn example() -> stampede::Result<()> {
//! let config = Arc::new(RunConfig {
//!     dirs: 4,
//!     files: 100,
//!     ..RunConfig::new(RunMode::Populate)
//! });
//! let store: Arc<dyn NamespaceStore> = Arc::new(MemoryStore::new());
//! let payload = Some(Arc::new(PayloadSource::zero(1024)));
//!
//! let summary = Coordinator::new(config, store, payload, None).run().await?;
//! println!("completed {} items", summary.completed);
//! # Ok(())
//! # }
//! ```

pub mod coordinator;
pub mod crawl;
pub mod generator;
pub mod models;
pub mod payload;
pub mod queue;
pub mod store;
pub mod worker;

// Re-export main public API
pub use coordinator::{Coordinator, ProgressEvent, RunConfig, RunSummary};
pub use crawl::CrawlWorker;
pub use generator::{JobGenerator, build_path};
pub use models::{JobStatus, ObjectKind, RunMode, SourceKind, StubAction, WorkItem};
pub use payload::PayloadSource;
pub use queue::{JobProducer, JobQueue, ResultSink, job_channel, result_channel};
pub use store::{MemoryStore, NamespaceStore};
pub use worker::{Worker, WorkerPool, WorkerSummary};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_module_structure() {
        // Ensure public API is accessible
        let item = WorkItem::file("dir-0/file-0");
        assert_eq!(item.status, JobStatus::Waiting);
        assert_eq!(build_path(0, 0, 0), "dir-0/file-0");
    }
}
