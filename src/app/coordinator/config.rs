//! Run configuration
//!
//! A [`RunConfig`] is assembled once from the command line, validated, and
//! then shared immutably (behind an `Arc`) by the coordinator, the workers
//! and the crawl controller. Timing knobs default to the production
//! constants; tests shrink them through [`RunConfig::for_testing`].

use std::path::PathBuf;
use std::time::Duration;

use crate::app::models::{RunMode, SourceKind};
use crate::constants::{crawl, monitor, quiescence, workers};
use crate::errors::ConfigError;

/// Immutable configuration for one run
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Operation the run performs
    pub mode: RunMode,
    /// Number of top-level directories in the synthetic dataset
    pub dirs: u64,
    /// Extra nesting levels between directory and file
    pub depth: u32,
    /// Number of files per directory
    pub files: u64,
    /// Payload size in bytes; negative selects a random size up to the
    /// absolute value (random source only)
    pub file_size: i64,
    /// Worker pool size
    pub parallelism: usize,
    /// Payload source for populate runs
    pub source: SourceKind,
    /// Source file backing a file-replay payload
    pub source_file: Option<PathBuf>,
    /// Destination prefix all paths are joined under
    pub dest_path: String,
    /// Storage tier for retier runs and the write hint
    pub tier: Option<String>,
    /// Propagate MD5 checksums with writes
    pub with_checksum: bool,
    /// Give up on a prefix after this many failed listing attempts;
    /// `None` retries forever
    pub list_retry_limit: Option<u32>,
    /// Quiescence poll cadence
    pub poll_interval: Duration,
    /// Consecutive all-idle polls required beyond which the crawl ends
    pub idle_tick_threshold: u32,
    /// Progress heartbeat cadence for dynamic runs
    pub heartbeat_interval: Duration,
    /// Pause between listing retry attempts
    pub list_retry_delay: Duration,
    /// Discovered-count batch size flushed to the shared counter
    pub discovery_flush_threshold: u64,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            mode: RunMode::Populate,
            dirs: 1,
            depth: 0,
            files: 1,
            file_size: 0,
            parallelism: workers::DEFAULT_PARALLELISM,
            source: SourceKind::Zero,
            source_file: None,
            dest_path: String::new(),
            tier: None,
            with_checksum: false,
            list_retry_limit: None,
            poll_interval: quiescence::POLL_INTERVAL,
            idle_tick_threshold: quiescence::IDLE_TICK_THRESHOLD,
            heartbeat_interval: monitor::HEARTBEAT_INTERVAL,
            list_retry_delay: crawl::LIST_RETRY_DELAY,
            discovery_flush_threshold: crawl::DISCOVERY_FLUSH_THRESHOLD,
        }
    }
}

impl RunConfig {
    /// Create a configuration with production timing defaults
    pub fn new(mode: RunMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    /// Create a configuration with timings shrunk for fast tests
    pub fn for_testing(mode: RunMode) -> Self {
        Self {
            mode,
            parallelism: 4,
            poll_interval: Duration::from_millis(20),
            heartbeat_interval: Duration::from_millis(200),
            list_retry_delay: Duration::from_millis(10),
            discovery_flush_threshold: 1,
            ..Self::default()
        }
    }

    /// Validate internal consistency
    ///
    /// Mode exclusivity is enforced at argument-parsing time; everything
    /// else is checked here.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.parallelism == 0 {
            return Err(ConfigError::ZeroConcurrency);
        }

        if self.mode == RunMode::Retier && self.tier.is_none() {
            return Err(ConfigError::TierRequired);
        }

        if self.mode == RunMode::Populate {
            if self.file_size < 0 && self.source != SourceKind::Random {
                return Err(ConfigError::NegativeSize);
            }
            if self.source == SourceKind::FileReplay {
                match &self.source_file {
                    None => return Err(ConfigError::SourceFileRequired),
                    Some(path) if !path.exists() => {
                        return Err(ConfigError::SourceFileMissing { path: path.clone() })
                    }
                    Some(_) => {}
                }
            }
        }

        Ok(())
    }

    /// Exact item count of a static run
    pub fn expected_items(&self) -> u64 {
        self.dirs * self.files
    }
}
