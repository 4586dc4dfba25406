//! Stampede Library
//!
//! A load-generation engine for hierarchical object namespaces. Populates,
//! deletes or retiers synthetic datasets with a concurrent worker pool, and
//! crawls existing namespaces to create or remove directory stub markers.

pub mod app;
pub mod cli;
pub mod constants;
pub mod errors;

// Re-export commonly used types for convenience
pub use errors::{AppError, Result};
