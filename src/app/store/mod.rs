//! Namespace store interface
//!
//! The engine is agnostic to the concrete storage backend; it talks to a
//! [`NamespaceStore`] and nothing else. The backend owns network-level retry
//! and authentication — a worker never retries a store operation itself.
//! Listing is paged: callers iterate [`ListPage`]s until `next_token` runs
//! out. A page sequence is finite per prefix and not restartable mid-page.

pub mod memory;

use async_trait::async_trait;

use crate::app::payload::Digest;
use crate::errors::StoreResult;

pub use memory::MemoryStore;

/// Optional hints attached to a write operation
#[derive(Debug, Clone, Default)]
pub struct WriteOptions {
    /// MD5 digest to propagate with the payload
    pub checksum: Option<Digest>,
    /// Storage tier to place the object on
    pub tier: Option<String>,
}

/// One page of a child enumeration
///
/// `entries` are plain leaf objects directly under the listed prefix;
/// `prefixes` are virtual sub-directories, each ending in the `/` separator.
/// Within a single enumeration pass every child prefix appears exactly once.
#[derive(Debug, Clone, Default)]
pub struct ListPage {
    /// Names of plain entries under the prefix, relative to the store root
    pub entries: Vec<String>,
    /// Child prefixes under the prefix, relative to the store root
    pub prefixes: Vec<String>,
    /// Continuation token for the next page; `None` when exhausted
    pub next_token: Option<String>,
}

/// Metadata for a single namespace entry, used for diagnostics only
#[derive(Debug, Clone)]
pub struct ObjectProperties {
    /// Object size in bytes
    pub size: u64,
    /// Storage tier, when the backend tracks one
    pub tier: Option<String>,
    /// Whether the object is a zero-byte directory marker
    pub is_stub: bool,
    /// Checksum recorded at write time, when propagated
    pub checksum: Option<Digest>,
}

/// A hierarchical object namespace
///
/// Paths are relative to the backend's configured destination root. All
/// operations are per-entry except [`list_page`](NamespaceStore::list_page),
/// which enumerates direct children of a prefix.
#[async_trait]
pub trait NamespaceStore: Send + Sync {
    /// Write an object, with optional checksum and tier hints
    async fn write(&self, path: &str, payload: &[u8], opts: &WriteOptions) -> StoreResult<()>;

    /// Delete an object
    async fn delete(&self, path: &str) -> StoreResult<()>;

    /// Move an object to a different storage tier
    async fn set_tier(&self, path: &str, tier: &str) -> StoreResult<()>;

    /// Create a zero-byte directory marker
    ///
    /// Returns [`StoreError::AlreadyExists`](crate::errors::StoreError) when
    /// a marker (or object) already occupies the path; callers treat that as
    /// a recognized non-error outcome.
    async fn create_stub(&self, path: &str) -> StoreResult<()>;

    /// Fetch one page of direct children under a prefix
    ///
    /// Pass `token = None` for the first page and the previous page's
    /// `next_token` afterwards.
    async fn list_page(&self, prefix: &str, token: Option<&str>) -> StoreResult<ListPage>;

    /// Fetch entry metadata; diagnostics only
    async fn get_properties(&self, path: &str) -> StoreResult<ObjectProperties>;
}

/// Initial connectivity check, run once before the worker pool starts
///
/// A bounded listing of the root prefix; any error is fatal to the run.
pub async fn probe(store: &dyn NamespaceStore) -> StoreResult<()> {
    store.list_page("", None).await.map(|_| ())
}
