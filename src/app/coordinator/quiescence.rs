//! Quiescence detection for dynamic runs
//!
//! A crawl has no up-front item count, so the run ends when the system goes
//! quiet: every worker idle, no results arriving, and that state holding
//! across several consecutive polls. The streak requirement papers over the
//! window where one worker has re-injected a prefix that no other worker has
//! dequeued yet — a single all-idle observation is not proof of completion.

use tracing::debug;

/// Detects sustained all-idle periods across coordinator polls
#[derive(Debug)]
pub struct QuiescenceDetector {
    parallelism: usize,
    threshold: u32,
    streak: u32,
}

impl QuiescenceDetector {
    /// Create a detector for a pool of `parallelism` workers that fires
    /// after the streak exceeds `threshold` consecutive all-idle polls.
    pub fn new(parallelism: usize, threshold: u32) -> Self {
        Self {
            parallelism,
            threshold,
            streak: 0,
        }
    }

    /// A result arrived between polls: the system is demonstrably not quiet
    pub fn record_result(&mut self) {
        self.streak = 0;
    }

    /// Feed one poll observation; returns `true` when the crawl is done
    pub fn observe_tick(&mut self, idle_workers: usize) -> bool {
        if idle_workers == self.parallelism {
            self.streak += 1;
            debug!(
                "all {} workers idle, streak {}/{}",
                self.parallelism, self.streak, self.threshold
            );
            self.streak > self.threshold
        } else {
            self.streak = 0;
            false
        }
    }
}
