//! Shared run counters
//!
//! Lock-free counters shared between the crawl workers and the coordinator.
//! The idle-worker gauge starts at the pool size: a worker is idle until it
//! dequeues an item and idle again the moment it finishes one, so a gauge
//! equal to the pool size means nobody holds work.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

/// Counters observed by the quiescence poll and the heartbeat
#[derive(Debug)]
pub struct SharedCounters {
    idle_workers: AtomicUsize,
    discovered: AtomicU64,
}

impl SharedCounters {
    /// Create counters for a pool of the given size; all workers start idle
    pub fn new(parallelism: usize) -> Self {
        Self {
            idle_workers: AtomicUsize::new(parallelism),
            discovered: AtomicU64::new(0),
        }
    }

    /// A worker dequeued an item and is now busy
    pub fn worker_busy(&self) {
        self.idle_workers.fetch_sub(1, Ordering::SeqCst);
    }

    /// A worker finished its item and is waiting for the next
    pub fn worker_idle(&self) {
        self.idle_workers.fetch_add(1, Ordering::SeqCst);
    }

    /// Current idle-worker gauge
    pub fn idle_workers(&self) -> usize {
        self.idle_workers.load(Ordering::SeqCst)
    }

    /// Add a batch of newly discovered entries
    pub fn add_discovered(&self, count: u64) {
        self.discovered.fetch_add(count, Ordering::SeqCst);
    }

    /// Total entries discovered so far
    pub fn discovered(&self) -> u64 {
        self.discovered.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_workers_start_idle() {
        let counters = SharedCounters::new(8);
        assert_eq!(counters.idle_workers(), 8);
    }

    #[test]
    fn test_busy_idle_roundtrip() {
        let counters = SharedCounters::new(4);
        counters.worker_busy();
        counters.worker_busy();
        assert_eq!(counters.idle_workers(), 2);

        counters.worker_idle();
        counters.worker_idle();
        assert_eq!(counters.idle_workers(), 4);
    }

    #[test]
    fn test_discovered_accumulates() {
        let counters = SharedCounters::new(1);
        counters.add_discovered(100);
        counters.add_discovered(42);
        assert_eq!(counters.discovered(), 142);
    }
}
