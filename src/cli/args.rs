//! Command-line argument parsing for stampede
//!
//! This module defines the CLI structure using clap derive macros. One run
//! performs one operation; the operation is selected by mutually exclusive
//! flags, with populate as the default when none is given.

use std::path::PathBuf;

use clap::{Args, Parser};

use crate::app::coordinator::RunConfig;
use crate::app::models::SourceKind;
use crate::constants::payload;
use crate::errors::ConfigError;

/// Stampede - bulk load generation for object namespaces
#[derive(Parser, Debug)]
#[command(
    name = "stampede",
    version,
    about = "Populate, delete, retier or stub-mark object namespaces at scale",
    long_about = "A load-generation tool for hierarchical object namespaces.
Uploads synthetic datasets with a concurrent worker pool, deletes or retiers
previously generated datasets, and crawls existing namespaces to create or
remove directory stub markers."
)]
pub struct Cli {
    /// Global options
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Run parameters
    #[command(flatten)]
    pub run: RunArgs,
}

/// Global output and logging options
#[derive(Args, Debug)]
pub struct GlobalArgs {
    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Very verbose logging (debug level)
    #[arg(long)]
    pub very_verbose: bool,

    /// Quiet mode - suppress non-essential output
    #[arg(short, long)]
    pub quiet: bool,

    /// Print the run summary as JSON instead of plain text
    #[arg(long)]
    pub json: bool,
}

/// Parameters describing the workload and the operation
#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    /// Number of top-level directories
    #[arg(short, long, default_value = "1")]
    pub dirs: u64,

    /// Extra nesting levels between each directory and its files
    #[arg(long, default_value = "0")]
    pub depth: u32,

    /// Number of files per directory
    #[arg(short, long, default_value = "1")]
    pub files: u64,

    /// File size in MiB; negative picks a random size up to the absolute
    /// value (random source only)
    #[arg(short, long, default_value = "0", allow_hyphen_values = true)]
    pub size: i64,

    /// Number of concurrent workers
    #[arg(short, long, default_value = "64")]
    pub concurrency: usize,

    /// Payload source: zero, random or file
    #[arg(short = 't', long = "type", value_name = "SOURCE", default_value = "zero")]
    pub source: String,

    /// Source file backing the file payload source
    #[arg(long, value_name = "FILE")]
    pub src_file: Option<PathBuf>,

    /// Destination prefix all generated paths are joined under
    #[arg(long, value_name = "PREFIX", default_value = "")]
    pub dst_path: String,

    /// Propagate MD5 checksums with uploads
    #[arg(long)]
    pub md5: bool,

    /// Storage tier: the target of --set-tier, or a placement hint on upload
    #[arg(long)]
    pub tier: Option<String>,

    /// Delete the dataset instead of populating it
    #[arg(long)]
    pub delete: bool,

    /// Move the dataset to the tier given by --tier
    #[arg(long)]
    pub set_tier: bool,

    /// Crawl the namespace and create directory stub markers
    #[arg(long)]
    pub create_stub: bool,

    /// Crawl the namespace and delete directory stub markers
    #[arg(long)]
    pub delete_stub: bool,

    /// Give up on a prefix after this many failed listing attempts
    /// (default: retry forever)
    #[arg(long, value_name = "N")]
    pub list_retry_limit: Option<u32>,
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Get the logging level based on global arguments
    pub fn log_level(&self) -> tracing::Level {
        if self.global.quiet {
            tracing::Level::ERROR
        } else if self.global.very_verbose {
            tracing::Level::DEBUG
        } else if self.global.verbose {
            tracing::Level::INFO
        } else {
            tracing::Level::WARN
        }
    }
}

impl RunArgs {
    /// Resolve the mode selectors, rejecting conflicting combinations
    pub fn mode(&self) -> Result<crate::app::models::RunMode, ConfigError> {
        use crate::app::models::RunMode;

        let selected = [self.delete, self.set_tier, self.create_stub, self.delete_stub]
            .iter()
            .filter(|flag| **flag)
            .count();
        if selected > 1 {
            return Err(ConfigError::ConflictingModes);
        }

        Ok(if self.delete {
            RunMode::Delete
        } else if self.set_tier {
            RunMode::Retier
        } else if self.create_stub {
            RunMode::CreateStub
        } else if self.delete_stub {
            RunMode::DeleteStub
        } else {
            RunMode::Populate
        })
    }

    /// Build and validate the run configuration
    pub fn into_config(self) -> Result<RunConfig, ConfigError> {
        let mode = self.mode()?;
        let source: SourceKind = self.source.parse()?;

        let config = RunConfig {
            mode,
            dirs: self.dirs,
            depth: self.depth,
            files: self.files,
            file_size: self.size * payload::BYTES_PER_MIB,
            parallelism: self.concurrency,
            source,
            source_file: self.src_file,
            dest_path: self.dst_path,
            tier: self.tier,
            with_checksum: self.md5,
            list_retry_limit: self.list_retry_limit,
            ..RunConfig::default()
        };
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::models::RunMode;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("stampede").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_default_is_populate() {
        let cli = parse(&[]);
        let config = cli.run.into_config().unwrap();
        assert_eq!(config.mode, RunMode::Populate);
        assert_eq!(config.dirs, 1);
        assert_eq!(config.files, 1);
        assert_eq!(config.parallelism, 64);
    }

    #[test]
    fn test_size_converts_to_bytes() {
        let cli = parse(&["--dirs", "2", "--files", "5", "--size", "4"]);
        let config = cli.run.into_config().unwrap();
        assert_eq!(config.file_size, 4 * 1024 * 1024);
        assert_eq!(config.expected_items(), 10);
    }

    #[test]
    fn test_negative_size_requires_random_source() {
        let cli = parse(&["--size", "-2"]);
        assert!(matches!(
            cli.run.into_config(),
            Err(ConfigError::NegativeSize)
        ));

        let cli = parse(&["--size", "-2", "--type", "random"]);
        let config = cli.run.into_config().unwrap();
        assert_eq!(config.file_size, -2 * 1024 * 1024);
    }

    #[test]
    fn test_conflicting_modes_rejected() {
        let cli = parse(&["--delete", "--create-stub"]);
        assert!(matches!(
            cli.run.into_config(),
            Err(ConfigError::ConflictingModes)
        ));
    }

    #[test]
    fn test_mode_selectors() {
        assert_eq!(parse(&["--delete"]).run.mode().unwrap(), RunMode::Delete);
        assert_eq!(
            parse(&["--set-tier", "--tier", "Archive"]).run.mode().unwrap(),
            RunMode::Retier
        );
        assert_eq!(
            parse(&["--create-stub"]).run.mode().unwrap(),
            RunMode::CreateStub
        );
        assert_eq!(
            parse(&["--delete-stub"]).run.mode().unwrap(),
            RunMode::DeleteStub
        );
    }

    #[test]
    fn test_set_tier_without_tier_rejected() {
        let cli = parse(&["--set-tier"]);
        assert!(matches!(
            cli.run.into_config(),
            Err(ConfigError::TierRequired)
        ));
    }

    #[test]
    fn test_log_levels() {
        assert_eq!(parse(&["--quiet"]).log_level(), tracing::Level::ERROR);
        assert_eq!(parse(&["--verbose"]).log_level(), tracing::Level::INFO);
        assert_eq!(
            parse(&["--very-verbose"]).log_level(),
            tracing::Level::DEBUG
        );
        assert_eq!(parse(&[]).log_level(), tracing::Level::WARN);
    }
}
