//! Application constants for stampede
//!
//! Constants are grouped by functional domain. Timing values for the dynamic
//! crawl mode are the operational defaults; tests override them through
//! [`RunConfig`](crate::app::coordinator::RunConfig) rather than patching
//! these.

use std::time::Duration;

/// Queue sizing policy
pub mod queues {
    /// Static modes size both queues to this factor times the parallelism,
    /// enough to keep workers fed without unbounded buffering.
    pub const STATIC_CAPACITY_FACTOR: usize = 2;

    /// Dynamic crawl mode uses an effectively unbounded capacity because the
    /// number of in-flight discoveries cannot be predicted and the
    /// discovery/re-injection cycle must not deadlock.
    pub const DYNAMIC_CAPACITY: usize = 10_000_000;

    /// Buffer size for the progress event channel
    pub const PROGRESS_CHANNEL_SIZE: usize = 256;
}

/// Worker pool configuration
pub mod workers {
    /// Default number of concurrent workers
    pub const DEFAULT_PARALLELISM: usize = 64;
}

/// Crawl controller configuration
pub mod crawl {
    use super::Duration;

    /// Fixed delay before retrying a failed enumeration page
    pub const LIST_RETRY_DELAY: Duration = Duration::from_secs(5);

    /// Crawl workers batch locally-counted plain entries and flush into the
    /// shared discovered counter above this threshold, to bound contention.
    pub const DISCOVERY_FLUSH_THRESHOLD: u64 = 100_000;
}

/// Quiescence detection for the dynamic mode
pub mod quiescence {
    use super::Duration;

    /// Polling interval for the idle check
    pub const POLL_INTERVAL: Duration = Duration::from_secs(20);

    /// Number of consecutive all-idle polls that must elapse, with no result
    /// observed in between, before the frontier is declared exhausted.
    pub const IDLE_TICK_THRESHOLD: u32 = 3;
}

/// Periodic monitoring output
pub mod monitor {
    use super::Duration;

    /// Interval for the dynamic-mode discovered-count heartbeat log
    pub const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(60);
}

/// Payload sizing
pub mod payload {
    /// The --size flag is expressed in MiB
    pub const BYTES_PER_MIB: i64 = 1024 * 1024;
}

// Re-export commonly used constants for convenience
pub use crawl::{DISCOVERY_FLUSH_THRESHOLD, LIST_RETRY_DELAY};
pub use monitor::HEARTBEAT_INTERVAL;
pub use queues::{DYNAMIC_CAPACITY, STATIC_CAPACITY_FACTOR};
pub use quiescence::{IDLE_TICK_THRESHOLD, POLL_INTERVAL};
pub use workers::DEFAULT_PARALLELISM;
