//! Command-line interface components
//!
//! This module contains CLI-specific code for stampede, including argument
//! parsing, the run command handler, and progress display.

pub mod args;
pub mod commands;
pub mod progress;

pub use args::{Cli, GlobalArgs, RunArgs};
pub use commands::handle_run;
pub use progress::ProgressDisplay;
