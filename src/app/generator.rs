//! Static workload generation
//!
//! The generator enumerates the D x F namespace for the static modes and
//! feeds every entry into the job queue. The path grammar is fixed:
//! `dir-{d}/1/2/.../{depth}/file-{f}`, directories outermost so items for
//! one directory land on the queue together. Once the last item is sent the
//! producer is dropped, which closes the queue for the static run.

use tracing::{debug, info};

use super::models::WorkItem;
use super::queue::JobProducer;
use crate::errors::QueueError;

/// Build the path for one file of the synthetic dataset
///
/// `depth` extra nesting levels are inserted between the directory and the
/// file, each a single numeric component.
pub fn build_path(dir: u64, file: u64, depth: u32) -> String {
    let nesting: String = (1..=depth).map(|level| format!("{level}/")).collect();
    format!("dir-{dir}/{nesting}file-{file}")
}

/// Produces the full static workload onto the job queue
#[derive(Debug)]
pub struct JobGenerator {
    dirs: u64,
    files: u64,
    depth: u32,
    producer: JobProducer,
}

impl JobGenerator {
    /// Create a generator for `dirs x files` items at the given depth
    pub fn new(dirs: u64, files: u64, depth: u32, producer: JobProducer) -> Self {
        Self {
            dirs,
            files,
            depth,
            producer,
        }
    }

    /// Enumerate every item and send it to the queue, then close it
    ///
    /// Consumes the generator so its producer is dropped on return; for a
    /// static run that drop is the queue's close signal.
    pub async fn run(self) -> Result<u64, QueueError> {
        let expected = self.dirs * self.files;
        info!(
            "generating {} items ({} dirs x {} files, depth {})",
            expected, self.dirs, self.files, self.depth
        );

        let mut produced = 0u64;
        for dir in 0..self.dirs {
            for file in 0..self.files {
                let item = WorkItem::file(build_path(dir, file, self.depth));
                self.producer.send(item).await?;
                produced += 1;
            }
            debug!("generated all {} items for dir-{}", self.files, dir);
        }

        info!("generation complete: {} items enqueued", produced);
        Ok(produced)
    }
}
