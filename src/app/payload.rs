//! Synthetic payload sources for populate runs
//!
//! Three sources are supported: zero-fill (deterministic, byte-identical per
//! call), random-fill (fresh bytes each call) and file-replay (bytes read
//! once from a source file, zero-padded to the configured size). Checksums
//! are MD5; deterministic sources compute theirs once and hand out the cached
//! digest.

use std::borrow::Cow;
use std::path::Path;

use rand::RngCore;
use tracing::warn;

use crate::errors::{PayloadError, PayloadResult};

/// MD5 digest of a payload
pub type Digest = [u8; 16];

/// Compute the MD5 digest of a byte slice
pub fn checksum_of(data: &[u8]) -> Digest {
    md5::compute(data).0
}

/// A source of byte payloads for populate operations
#[derive(Debug, Clone)]
pub enum PayloadSource {
    /// Zero-filled buffer, shared across all items
    Zero { data: Vec<u8>, digest: Digest },
    /// Fresh random bytes per call; a negative size means each payload gets
    /// a random size up to `size.abs()`.
    Random { size: i64 },
    /// Source-file bytes, zero-padded to the configured size
    FileReplay { data: Vec<u8>, digest: Digest },
}

impl PayloadSource {
    /// Create a zero-fill source of the given size
    pub fn zero(size: u64) -> Self {
        let data = vec![0u8; size as usize];
        let digest = checksum_of(&data);
        Self::Zero { data, digest }
    }

    /// Create a random-fill source; `size < 0` selects a random payload size
    /// up to `size.abs()` per item.
    pub fn random(size: i64) -> Self {
        Self::Random { size }
    }

    /// Create a file-replay source, reading `size` bytes from `path` once.
    ///
    /// A source file shorter than `size` is padded with zeros, matching the
    /// zero-fill tail of a short read.
    pub async fn file_replay(path: &Path, size: u64) -> PayloadResult<Self> {
        let raw = tokio::fs::read(path).await?;
        let mut data = vec![0u8; size as usize];
        let copied = raw.len().min(data.len());
        data[..copied].copy_from_slice(&raw[..copied]);

        if (copied as u64) < size {
            warn!(
                "source file {} holds {} of {} requested bytes, remainder zero-filled",
                path.display(),
                copied,
                size
            );
        }

        let digest = checksum_of(&data);
        Ok(Self::FileReplay { data, digest })
    }

    /// Produce one payload
    ///
    /// Deterministic sources lend out their shared buffer; the random source
    /// allocates fresh bytes per call.
    pub fn generate(&self) -> PayloadResult<Cow<'_, [u8]>> {
        match self {
            PayloadSource::Zero { data, .. } | PayloadSource::FileReplay { data, .. } => {
                Ok(Cow::Borrowed(data.as_slice()))
            }
            PayloadSource::Random { size } => {
                let n = if *size < 0 {
                    let cap = size.unsigned_abs();
                    if cap == 0 {
                        0
                    } else {
                        rand::thread_rng().next_u64() % cap
                    }
                } else {
                    *size as u64
                };

                let mut data = vec![0u8; n as usize];
                rand::thread_rng().fill_bytes(&mut data);
                Ok(Cow::Owned(data))
            }
        }
    }

    /// MD5 digest of a payload produced by this source
    ///
    /// Cached for deterministic sources; computed per payload for the random
    /// source.
    pub fn checksum(&self, data: &[u8]) -> Digest {
        match self {
            PayloadSource::Zero { digest, .. } | PayloadSource::FileReplay { digest, .. } => *digest,
            PayloadSource::Random { .. } => checksum_of(data),
        }
    }
}
