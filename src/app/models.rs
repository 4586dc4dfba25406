//! Core data model for work distribution
//!
//! The only entity that moves through the engine is the [`WorkItem`]: one
//! namespace entry together with its processing state. Items are created by
//! the static generator or the crawl controller, owned by whichever queue
//! currently holds them, mutated only by the worker that dequeued them, and
//! consumed by the result reporter.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;

/// Kind of namespace entry a work item addresses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObjectKind {
    /// A leaf object
    File,
    /// A virtual directory prefix
    Directory,
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ObjectKind::File => write!(f, "file"),
            ObjectKind::Directory => write!(f, "directory"),
        }
    }
}

/// Processing state of a work item
///
/// Progression is strictly `Waiting -> InProgress -> {Succeeded, Failed}`;
/// no item ever reverts to an earlier state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobStatus {
    /// Queued, not yet picked up by a worker
    Waiting,
    /// Claimed by a worker, operation in flight
    InProgress,
    /// Operation completed successfully
    Succeeded,
    /// Operation failed; the error is recorded on the item
    Failed,
}

impl JobStatus {
    /// Check whether this status is terminal
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Succeeded | JobStatus::Failed)
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobStatus::Waiting => write!(f, "waiting"),
            JobStatus::InProgress => write!(f, "in-progress"),
            JobStatus::Succeeded => write!(f, "succeeded"),
            JobStatus::Failed => write!(f, "failed"),
        }
    }
}

/// One unit of work: a namespace entry and its processing state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkItem {
    /// Entry path relative to the configured destination root
    pub path: String,
    /// Kind of entry addressed
    pub kind: ObjectKind,
    /// Current processing state
    pub status: JobStatus,
    /// Identifier of the worker that processed the item, assigned at dequeue
    /// time; observability only.
    pub worker_id: u32,
    /// Set when a stub-create found the marker already present; a recognized
    /// non-error outcome distinct from failure.
    pub already_existed: bool,
    /// Error text recorded when the item failed
    pub error: Option<String>,
}

impl WorkItem {
    /// Create a waiting file item
    pub fn file(path: impl Into<String>) -> Self {
        Self::new(path, ObjectKind::File)
    }

    /// Create a waiting directory item
    pub fn directory(path: impl Into<String>) -> Self {
        Self::new(path, ObjectKind::Directory)
    }

    /// The crawl seed: the root prefix of the namespace
    pub fn root() -> Self {
        Self::directory("")
    }

    fn new(path: impl Into<String>, kind: ObjectKind) -> Self {
        Self {
            path: path.into(),
            kind,
            status: JobStatus::Waiting,
            worker_id: 0,
            already_existed: false,
            error: None,
        }
    }

    /// Claim this item for a worker
    pub fn mark_in_progress(&mut self, worker_id: u32) {
        debug_assert_eq!(self.status, JobStatus::Waiting);
        self.worker_id = worker_id;
        self.status = JobStatus::InProgress;
    }

    /// Record a successful outcome
    pub fn mark_succeeded(&mut self) {
        debug_assert!(!self.status.is_terminal());
        self.status = JobStatus::Succeeded;
    }

    /// Record the already-exists stub-create outcome: succeeded, with a note
    pub fn mark_succeeded_existing(&mut self) {
        self.mark_succeeded();
        self.already_existed = true;
    }

    /// Record a failed outcome with its error text
    pub fn mark_failed(&mut self, error: impl Into<String>) {
        debug_assert!(!self.status.is_terminal());
        self.status = JobStatus::Failed;
        self.error = Some(error.into());
    }
}

/// The operation a run performs; selectors are mutually exclusive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunMode {
    /// Upload a synthetic dataset (the default)
    Populate,
    /// Delete a previously generated dataset
    Delete,
    /// Change the storage tier of an existing dataset
    Retier,
    /// Create directory stub markers over an existing namespace
    CreateStub,
    /// Delete directory stub markers over an existing namespace
    DeleteStub,
}

impl RunMode {
    /// Dynamic modes discover their workload by crawling the namespace;
    /// static modes know the exact item count up front.
    pub fn is_dynamic(&self) -> bool {
        matches!(self, RunMode::CreateStub | RunMode::DeleteStub)
    }

    /// The stub action performed by a dynamic run, if any
    pub fn stub_action(&self) -> Option<StubAction> {
        match self {
            RunMode::CreateStub => Some(StubAction::Create),
            RunMode::DeleteStub => Some(StubAction::Delete),
            _ => None,
        }
    }
}

impl fmt::Display for RunMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunMode::Populate => write!(f, "populate"),
            RunMode::Delete => write!(f, "delete"),
            RunMode::Retier => write!(f, "retier"),
            RunMode::CreateStub => write!(f, "create-stub"),
            RunMode::DeleteStub => write!(f, "delete-stub"),
        }
    }
}

/// Action applied to each discovered prefix in dynamic mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StubAction {
    /// Create a zero-byte directory marker
    Create,
    /// Delete the directory marker
    Delete,
}

/// Kind of payload source feeding populate runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SourceKind {
    /// Zero-filled, deterministic payload
    Zero,
    /// Fresh random bytes per item
    Random,
    /// Bytes replayed from a source file
    FileReplay,
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceKind::Zero => write!(f, "zero"),
            SourceKind::Random => write!(f, "random"),
            SourceKind::FileReplay => write!(f, "file"),
        }
    }
}

impl FromStr for SourceKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "zero" => Ok(SourceKind::Zero),
            "random" | "rand" => Ok(SourceKind::Random),
            "file" => Ok(SourceKind::FileReplay),
            _ => Err(ConfigError::UnknownSource(s.to_string())),
        }
    }
}
