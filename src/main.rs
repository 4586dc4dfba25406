//! Stampede CLI application
//!
//! Command-line front end for the bulk namespace load generator. One process
//! performs one run: populate, delete, retier, create-stub or delete-stub.

use std::process;

use tracing::info;
use tracing_subscriber::{EnvFilter, fmt};

// Import CLI modules through the library
use stampede::cli::{Cli, handle_run};
use stampede::errors::Result;

#[tokio::main]
async fn main() {
    let result = run().await;

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

/// Main application logic
async fn run() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse_args();

    // Initialize logging based on verbosity
    init_logging(&cli);

    info!("stampede v{} starting", env!("CARGO_PKG_VERSION"));

    handle_run(cli).await
}

/// Initialize logging based on CLI verbosity settings
fn init_logging(cli: &Cli) {
    let log_level = cli.log_level();

    let filter = EnvFilter::from_default_env()
        .add_directive(format!("stampede={}", log_level).parse().unwrap());

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(cli.global.very_verbose) // Show levels only in very verbose mode
        .init();

    if cli.global.very_verbose {
        info!("Very verbose logging enabled");
    }
}
