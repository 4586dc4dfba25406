//! Error types for stampede
//!
//! Errors are split by domain so that each component can report failures with
//! precise context. Only configuration and initial connectivity errors are
//! fatal; everything that happens after the worker pool starts is captured on
//! the affected work item and flows through the result queue instead of
//! aborting the run.

use std::path::PathBuf;

use thiserror::Error;

/// Configuration errors detected before the worker pool starts
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Payload source string did not match a known kind
    #[error("unknown payload source '{0}' (expected zero, random or file)")]
    UnknownSource(String),

    /// The file source was selected without a backing file
    #[error("payload source 'file' requires --src-file")]
    SourceFileRequired,

    /// The configured source file does not exist
    #[error("source file {path} does not exist")]
    SourceFileMissing { path: PathBuf },

    /// More than one mode selector was set
    #[error("at most one of --delete, --set-tier, --create-stub and --delete-stub may be set")]
    ConflictingModes,

    /// Retier mode needs a tier to move items to
    #[error("--set-tier requires --tier")]
    TierRequired,

    /// A negative file size is only meaningful for the random source
    #[error("negative --size is only valid with the random payload source")]
    NegativeSize,

    /// Parallelism of zero cannot make progress
    #[error("concurrency must be greater than 0")]
    ZeroConcurrency,
}

/// Errors surfaced by a namespace store backend
#[derive(Error, Debug)]
pub enum StoreError {
    /// The addressed entry does not exist
    #[error("namespace entry not found: {path}")]
    NotFound { path: String },

    /// An entry already exists at the addressed path
    ///
    /// Recognized by the stub-create handler as a non-fatal outcome.
    #[error("namespace entry already exists: {path}")]
    AlreadyExists { path: String },

    /// Any other backend failure
    #[error("store backend error: {message}")]
    Backend { message: String },
}

impl StoreError {
    /// Create a backend error from any displayable cause
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend {
            message: message.into(),
        }
    }

    /// Check whether this error is the recognized already-exists outcome
    pub fn is_already_exists(&self) -> bool {
        matches!(self, StoreError::AlreadyExists { .. })
    }
}

/// Payload generation errors
#[derive(Error, Debug)]
pub enum PayloadError {
    /// I/O error reading a replay source file
    #[error("payload source I/O error")]
    Io(#[from] std::io::Error),
}

/// Work and result queue errors
#[derive(Error, Debug)]
pub enum QueueError {
    /// The queue was closed; no further items are accepted
    #[error("queue closed")]
    Closed,
}

/// Top-level application error
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration error (fatal, pre-pool)
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Store error
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Payload error
    #[error(transparent)]
    Payload(#[from] PayloadError),

    /// Queue error
    #[error(transparent)]
    Queue(#[from] QueueError),

    /// Generic I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Generic application error with context
    #[error("{message}")]
    Generic { message: String },
}

impl AppError {
    /// Create a generic application error with a message
    pub fn generic(message: impl Into<String>) -> Self {
        Self::Generic {
            message: message.into(),
        }
    }

    /// Get error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            AppError::Config(_) => "config",
            AppError::Store(_) => "store",
            AppError::Payload(_) => "payload",
            AppError::Queue(_) => "queue",
            AppError::Io(_) => "io",
            AppError::Generic { .. } => "generic",
        }
    }

    /// Check whether this error must stop the process before the pool starts
    pub fn is_fatal(&self) -> bool {
        matches!(self, AppError::Config(_))
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, AppError>;

/// Store result type alias
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Payload result type alias
pub type PayloadResult<T> = std::result::Result<T, PayloadError>;
