//! In-memory namespace store
//!
//! A complete [`NamespaceStore`] implementation over a sorted map, used as
//! the dry-run backend of the CLI and as the test double for the engine.
//! Listing follows the usual flat-namespace delimiter semantics: a key
//! `a/b/c` seen under prefix `a/` contributes the child prefix `a/b/`, and
//! the enumeration cursor skips past all keys below a reported prefix so
//! that each prefix surfaces exactly once per pass.
//!
//! Failure injection hooks let tests exercise the engine's error paths
//! without a real backend.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU32, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{ListPage, NamespaceStore, ObjectProperties, WriteOptions};
use crate::app::payload::Digest;
use crate::errors::{StoreError, StoreResult};

/// Default number of raw keys consumed per listing page
const DEFAULT_PAGE_SIZE: usize = 1000;

#[derive(Debug, Clone)]
struct StoredObject {
    size: u64,
    tier: Option<String>,
    checksum: Option<Digest>,
    is_stub: bool,
}

/// In-memory hierarchical object store
#[derive(Debug)]
pub struct MemoryStore {
    objects: RwLock<BTreeMap<String, StoredObject>>,
    root: String,
    page_size: usize,
    /// Writes to paths containing this substring fail with a backend error
    fail_writes_containing: RwLock<Option<String>>,
    /// The next N list calls fail with a backend error
    fail_next_lists: AtomicU32,
}

impl MemoryStore {
    /// Create an empty store with no destination root
    pub fn new() -> Self {
        Self::with_root("")
    }

    /// Create an empty store whose paths are joined under `root`
    pub fn with_root(root: impl Into<String>) -> Self {
        let mut root = root.into();
        if !root.is_empty() && !root.ends_with('/') {
            root.push('/');
        }
        Self {
            objects: RwLock::new(BTreeMap::new()),
            root,
            page_size: DEFAULT_PAGE_SIZE,
            fail_writes_containing: RwLock::new(None),
            fail_next_lists: AtomicU32::new(0),
        }
    }

    /// Override the listing page size; small values force multi-page
    /// enumerations in tests.
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Seed an object directly, bypassing failure injection
    pub async fn seed_object(&self, path: &str, size: u64) {
        let key = self.full_path(path);
        self.objects.write().await.insert(
            key,
            StoredObject {
                size,
                tier: None,
                checksum: None,
                is_stub: false,
            },
        );
    }

    /// Make writes fail for any path containing `pattern`
    pub async fn fail_writes_containing(&self, pattern: impl Into<String>) {
        *self.fail_writes_containing.write().await = Some(pattern.into());
    }

    /// Make the next `n` list calls fail
    pub fn fail_next_lists(&self, n: u32) {
        self.fail_next_lists.store(n, Ordering::SeqCst);
    }

    /// Number of stored objects
    pub async fn object_count(&self) -> usize {
        self.objects.read().await.len()
    }

    /// Whether an object exists at `path`
    pub async fn contains(&self, path: &str) -> bool {
        self.objects.read().await.contains_key(&self.full_path(path))
    }

    /// Paths of all stub markers, relative to the root
    pub async fn stub_paths(&self) -> Vec<String> {
        self.objects
            .read()
            .await
            .iter()
            .filter(|(_, o)| o.is_stub)
            .map(|(k, _)| k[self.root.len()..].to_string())
            .collect()
    }

    fn full_path(&self, path: &str) -> String {
        format!("{}{}", self.root, path)
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl NamespaceStore for MemoryStore {
    async fn write(&self, path: &str, payload: &[u8], opts: &WriteOptions) -> StoreResult<()> {
        if let Some(pattern) = self.fail_writes_containing.read().await.as_deref() {
            if path.contains(pattern) {
                return Err(StoreError::backend(format!("injected write failure: {path}")));
            }
        }

        let key = self.full_path(path);
        self.objects.write().await.insert(
            key,
            StoredObject {
                size: payload.len() as u64,
                tier: opts.tier.clone(),
                checksum: opts.checksum,
                is_stub: false,
            },
        );
        Ok(())
    }

    async fn delete(&self, path: &str) -> StoreResult<()> {
        let key = self.full_path(path);
        match self.objects.write().await.remove(&key) {
            Some(_) => Ok(()),
            None => Err(StoreError::NotFound {
                path: path.to_string(),
            }),
        }
    }

    async fn set_tier(&self, path: &str, tier: &str) -> StoreResult<()> {
        let key = self.full_path(path);
        match self.objects.write().await.get_mut(&key) {
            Some(object) => {
                object.tier = Some(tier.to_string());
                Ok(())
            }
            None => Err(StoreError::NotFound {
                path: path.to_string(),
            }),
        }
    }

    async fn create_stub(&self, path: &str) -> StoreResult<()> {
        let key = self.full_path(path);
        let mut objects = self.objects.write().await;
        if objects.contains_key(&key) {
            return Err(StoreError::AlreadyExists {
                path: path.to_string(),
            });
        }
        objects.insert(
            key,
            StoredObject {
                size: 0,
                tier: None,
                checksum: None,
                is_stub: true,
            },
        );
        Ok(())
    }

    async fn list_page(&self, prefix: &str, token: Option<&str>) -> StoreResult<ListPage> {
        if self.fail_next_lists.load(Ordering::SeqCst) > 0 {
            self.fail_next_lists.fetch_sub(1, Ordering::SeqCst);
            return Err(StoreError::backend("injected listing failure"));
        }

        let full_prefix = self.full_path(prefix);
        let objects = self.objects.read().await;
        let keys: Vec<&String> = objects
            .keys()
            .filter(|k| k.starts_with(&full_prefix))
            .collect();

        // The continuation token is the last raw key consumed by the
        // previous page; resume strictly after it.
        let full_token = token.map(|t| self.full_path(t));
        let mut i = match &full_token {
            Some(t) => keys.partition_point(|k| k.as_str() <= t.as_str()),
            None => 0,
        };

        let mut page = ListPage::default();
        let mut consumed = 0usize;
        let mut last_key: Option<&String> = None;

        while i < keys.len() && consumed < self.page_size {
            let key = keys[i];
            let rest = &key[full_prefix.len()..];

            if let Some(slash) = rest.find('/') {
                let child = format!("{}{}/", full_prefix, &rest[..slash]);
                page.prefixes.push(child[self.root.len()..].to_string());
                // Skip every key below the reported prefix so it surfaces
                // exactly once per enumeration pass.
                while i < keys.len() && keys[i].starts_with(&child) {
                    last_key = Some(keys[i]);
                    i += 1;
                }
            } else {
                page.entries.push(key[self.root.len()..].to_string());
                last_key = Some(key);
                i += 1;
            }
            consumed += 1;
        }

        if i < keys.len() {
            page.next_token = last_key.map(|k| k[self.root.len()..].to_string());
        }
        Ok(page)
    }

    async fn get_properties(&self, path: &str) -> StoreResult<ObjectProperties> {
        let key = self.full_path(path);
        match self.objects.read().await.get(&key) {
            Some(object) => Ok(ObjectProperties {
                size: object.size,
                tier: object.tier.clone(),
                is_stub: object.is_stub,
                checksum: object.checksum,
            }),
            None => Err(StoreError::NotFound {
                path: path.to_string(),
            }),
        }
    }
}
