//! Progress display for run operations
//!
//! Renders coordinator progress events with indicatif. Static runs get a
//! counted bar with ETA; dynamic runs get a spinner fed by the heartbeat,
//! since the total is unknown until the crawl quiesces. The display runs on
//! its own task and is fed best-effort, so a stalled terminal never slows
//! the engine down.

use indicatif::{ProgressBar, ProgressStyle};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::app::coordinator::ProgressEvent;
use crate::app::models::JobStatus;

/// Owns the display task for one run
pub struct ProgressDisplay {
    handle: JoinHandle<()>,
}

impl ProgressDisplay {
    /// Spawn the display task consuming coordinator events
    pub fn spawn(events: mpsc::Receiver<ProgressEvent>) -> Self {
        let handle = tokio::spawn(render(events));
        Self { handle }
    }

    /// Wait for the display to drain its event stream and clean up
    pub async fn finish(self) {
        if let Err(e) = self.handle.await {
            debug!("progress display task ended abnormally: {}", e);
        }
    }
}

async fn render(mut events: mpsc::Receiver<ProgressEvent>) {
    let mut bar: Option<ProgressBar> = None;
    let mut failed = 0u64;

    while let Some(event) = events.recv().await {
        match event {
            ProgressEvent::Started { expected: Some(total) } => {
                let pb = ProgressBar::new(total);
                pb.set_style(counted_style());
                bar = Some(pb);
            }
            ProgressEvent::Started { expected: None } => {
                let pb = ProgressBar::new_spinner();
                pb.set_style(spinner_style());
                pb.set_message("crawling namespace");
                pb.enable_steady_tick(std::time::Duration::from_millis(120));
                bar = Some(pb);
            }
            ProgressEvent::ItemCompleted { status, .. } => {
                if status == JobStatus::Failed {
                    failed += 1;
                }
                if let Some(pb) = &bar {
                    pb.inc(1);
                    if failed > 0 {
                        pb.set_message(format!("{failed} failed"));
                    }
                }
            }
            ProgressEvent::Heartbeat { discovered } => {
                if let Some(pb) = &bar {
                    pb.set_message(format!("{discovered} entries discovered"));
                }
            }
            ProgressEvent::Finished => {
                if let Some(pb) = bar.take() {
                    pb.finish_and_clear();
                }
            }
        }
    }

    if let Some(pb) = bar.take() {
        pb.finish_and_clear();
    }
}

fn counted_style() -> ProgressStyle {
    ProgressStyle::with_template(
        "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}",
    )
    .unwrap()
    .progress_chars("#>-")
}

fn spinner_style() -> ProgressStyle {
    ProgressStyle::with_template("{spinner:.green} [{elapsed_precise}] {pos} prefixes {msg}")
        .unwrap()
}
