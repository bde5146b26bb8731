//! Builder API for creating storage instances.
//!
//! The builder decides once, at build time, which base store backs the
//! storage: the persistent file store when a path is configured and usable,
//! otherwise a volatile in-memory store with the same quota.

use std::path::PathBuf;
use std::sync::Arc;

use crate::config::StorageConfig;
use crate::facade::{TypedStorage, probe};
use crate::store::Store;
use crate::stores::file::{FileStore, FileStoreConfig};
use crate::stores::memory::{MemoryStore, MemoryStoreConfig};

/// Builder for [`TypedStorage`] instances.
///
/// # Example
///
/// ```ignore
/// use typed_storage::{StorageBuilder, StorageExt, StorageOptions};
///
/// let storage = StorageBuilder::new()
///     .path("data/storage.json")
///     .quota_bytes(1024 * 1024)
///     .build();
///
/// storage.set("greeting", "hello", StorageOptions::default())?;
/// ```
pub struct StorageBuilder {
    config: StorageConfig,
    store: Option<Arc<dyn Store>>,
}

impl StorageBuilder {
    /// Create a new StorageBuilder with default configuration.
    pub fn new() -> Self {
        Self::from_config(StorageConfig::default())
    }

    /// Start from an existing configuration.
    pub fn from_config(config: StorageConfig) -> Self {
        StorageBuilder {
            config,
            store: None,
        }
    }

    /// Persist to the given file.
    pub fn path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.path = Some(path.into());
        self
    }

    /// Limit the store to `bytes` of keys plus values.
    pub fn quota_bytes(mut self, bytes: usize) -> Self {
        self.config.quota_bytes = Some(bytes);
        self
    }

    /// Remove the quota.
    pub fn unlimited(mut self) -> Self {
        self.config.quota_bytes = None;
        self
    }

    /// Use this store, subject to the same probe as the file store.
    pub fn store(mut self, store: Arc<dyn Store>) -> Self {
        self.store = Some(store);
        self
    }

    /// Select the base store and build the storage.
    ///
    /// Never fails: any store that cannot be opened or does not pass the
    /// write probe is replaced by an in-memory store.
    pub fn build(self) -> TypedStorage {
        let candidate = match (self.store, &self.config.path) {
            (Some(store), _) => Some(store),
            (None, Some(path)) => open_file_store(path.clone(), self.config.quota_bytes),
            (None, None) => None,
        };

        let store = match candidate {
            Some(store) if probe(store.as_ref()) => store,
            Some(store) => {
                tracing::warn!(
                    "Store failed write probe, falling back to memory: store={}",
                    store.name()
                );
                memory_store(self.config.quota_bytes)
            }
            None => memory_store(self.config.quota_bytes),
        };

        tracing::debug!("Storage ready: store={}", store.name());
        TypedStorage::new(store)
    }
}

impl Default for StorageBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn open_file_store(path: PathBuf, quota_bytes: Option<usize>) -> Option<Arc<dyn Store>> {
    let shown = path.display().to_string();
    match FileStore::open(FileStoreConfig { path, quota_bytes }) {
        Ok(store) => Some(Arc::new(store)),
        Err(e) => {
            tracing::warn!(
                "Failed to open file store, falling back to memory: path={}, error={}",
                shown,
                e
            );
            None
        }
    }
}

fn memory_store(quota_bytes: Option<usize>) -> Arc<dyn Store> {
    Arc::new(MemoryStore::new(MemoryStoreConfig { quota_bytes }))
}

/// Create storage configured from the environment.
///
/// See [`StorageConfig::from_env`].
pub fn create_storage() -> TypedStorage {
    StorageBuilder::from_config(StorageConfig::from_env()).build()
}
