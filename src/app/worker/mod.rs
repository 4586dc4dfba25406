//! Worker pool for concurrent store operations
//!
//! Workers are identical consumers competing on the shared job queue. A
//! static worker applies one store operation per item and reports the
//! outcome; the pool spawns them, hands out ids, and aggregates their
//! summaries at join time. Crawl workers live in [`crate::app::crawl`] but
//! are spawned through the same pool.

pub mod core;
pub mod pool;

pub use self::core::{Worker, WorkerSummary};
pub use pool::WorkerPool;
