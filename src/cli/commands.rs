//! Command handler wiring the CLI to the engine
//!
//! Builds the validated configuration, the store backend and the payload
//! source, runs the connectivity probe, then hands everything to the
//! coordinator and reports the summary.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{info, warn};

use super::args::Cli;
use super::progress::ProgressDisplay;
use crate::app::coordinator::{Coordinator, RunConfig, RunSummary};
use crate::app::models::{RunMode, SourceKind};
use crate::app::payload::PayloadSource;
use crate::app::store::{self, MemoryStore, NamespaceStore};
use crate::constants::queues;
use crate::errors::{AppError, ConfigError, Result};

/// Execute one run from parsed arguments
pub async fn handle_run(cli: Cli) -> Result<()> {
    let show_progress = !cli.global.quiet && !cli.global.json;
    let json_output = cli.global.json;
    let config = Arc::new(cli.run.into_config()?);

    // The in-memory backend stands in for a remote namespace; a deployment
    // against real storage swaps its NamespaceStore in here
    let store: Arc<dyn NamespaceStore> =
        Arc::new(MemoryStore::with_root(&config.dest_path));
    info!(
        "using in-memory namespace store rooted at {:?}",
        config.dest_path
    );

    store::probe(store.as_ref()).await?;

    let payload = match config.mode {
        RunMode::Populate => Some(Arc::new(build_payload(&config).await?)),
        _ => None,
    };

    let (progress_tx, display) = if show_progress {
        let (tx, rx) = mpsc::channel(queues::PROGRESS_CHANNEL_SIZE);
        (Some(tx), Some(ProgressDisplay::spawn(rx)))
    } else {
        (None, None)
    };

    let coordinator = Coordinator::new(Arc::clone(&config), store, payload, progress_tx);
    let summary = coordinator.run().await?;

    if let Some(display) = display {
        display.finish().await;
    }

    if json_output {
        let rendered = serde_json::to_string_pretty(&summary)
            .map_err(|e| AppError::generic(format!("rendering summary: {e}")))?;
        println!("{rendered}");
    } else if !cli.global.quiet {
        print_summary(&summary);
    }

    if summary.failed > 0 {
        warn!("{} of {} items failed", summary.failed, summary.completed);
    }
    Ok(())
}

/// Build the payload source for a populate run
async fn build_payload(config: &RunConfig) -> Result<PayloadSource> {
    match config.source {
        SourceKind::Zero => Ok(PayloadSource::zero(config.file_size.max(0) as u64)),
        SourceKind::Random => Ok(PayloadSource::random(config.file_size)),
        SourceKind::FileReplay => {
            let path = config
                .source_file
                .as_deref()
                .ok_or(ConfigError::SourceFileRequired)?;
            let source =
                PayloadSource::file_replay(path, config.file_size.max(0) as u64).await?;
            Ok(source)
        }
    }
}

fn print_summary(summary: &RunSummary) {
    println!("\n{} run summary", summary.mode);
    println!("  started:     {}", summary.started_at.format("%Y-%m-%d %H:%M:%S UTC"));
    println!("  elapsed:     {:.1}s", summary.elapsed.as_secs_f64());
    if let Some(expected) = summary.expected {
        println!("  expected:    {expected}");
    } else {
        println!("  discovered:  {}", summary.discovered_entries);
    }
    println!("  completed:   {}", summary.completed);
    println!("  succeeded:   {}", summary.succeeded);
    if summary.already_existed > 0 {
        println!("  pre-existing: {}", summary.already_existed);
    }
    println!("  failed:      {}", summary.failed);
}
