use serde_json::Value;
use std::sync::Arc;

use crate::error::StorageError;
use crate::namespace::Namespaced;
use crate::storage::{Storage, StorageOptions};
use crate::store::Store;

/// Key written and removed to check that a store accepts writes.
pub const PROBE_KEY: &str = "__storage_test__";

/// Check that `store` accepts a write and a delete.
pub fn probe(store: &dyn Store) -> bool {
    let result = store
        .write(PROBE_KEY, PROBE_KEY)
        .and_then(|_| store.delete(PROBE_KEY));

    match result {
        Ok(()) => true,
        Err(e) => {
            tracing::debug!("Store probe failed: store={}, error={}", store.name(), e);
            false
        }
    }
}

/// The root storage layer: typed JSON on top of a raw [`Store`].
///
/// Values are encoded with serde_json. Entries that no longer parse are
/// deleted the first time they are read, so they cannot poison later reads.
///
/// Cloning is cheap; clones share the same store.
///
/// # Example
/// ```ignore
/// let storage = TypedStorage::new(Arc::new(MemoryStore::default()));
/// storage.set("count", &42, StorageOptions::default())?;
/// assert_eq!(storage.get::<u32>("count", StorageOptions::default())?, Some(42));
/// ```
#[derive(Clone)]
pub struct TypedStorage {
    store: Arc<dyn Store>,
}

impl TypedStorage {
    /// Wrap an already selected store.
    pub fn new(store: Arc<dyn Store>) -> Self {
        TypedStorage { store }
    }

    /// Name of the base store in use.
    pub fn backend(&self) -> &'static str {
        self.store.name()
    }

    /// The raw store underneath.
    pub fn store(&self) -> &Arc<dyn Store> {
        &self.store
    }

    fn discard_corrupted(&self, key: &str) {
        if let Err(e) = self.store.delete(key) {
            tracing::warn!(
                "Failed to discard corrupted entry: store={}, key={}, error={}",
                self.store.name(),
                key,
                e
            );
        }
    }
}

impl Storage for TypedStorage {
    fn get_json(&self, key: &str, options: StorageOptions) -> Result<Option<Value>, StorageError> {
        let raw = match self.store.read(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Ok(None),
            Err(e) if options.strict => {
                return Err(StorageError::backend(self.store.name(), key, e));
            }
            Err(e) => {
                tracing::debug!(
                    "Failed to read entry: store={}, key={}, error={}",
                    self.store.name(),
                    key,
                    e
                );
                return Ok(None);
            }
        };

        match serde_json::from_str(&raw) {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                tracing::debug!(
                    "Discarding corrupted entry: store={}, key={}, error={}",
                    self.store.name(),
                    key,
                    e
                );
                self.discard_corrupted(key);

                if options.strict {
                    Err(StorageError::deserialization(key, e))
                } else {
                    Ok(None)
                }
            }
        }
    }

    fn set_json(
        &self,
        key: &str,
        value: Value,
        options: StorageOptions,
    ) -> Result<bool, StorageError> {
        let encoded = match serde_json::to_string(&value) {
            Ok(encoded) => encoded,
            Err(e) if options.strict => return Err(StorageError::serialization(key, e)),
            Err(e) => {
                tracing::debug!("Failed to serialize value: key={}, error={}", key, e);
                return Ok(false);
            }
        };

        match self.store.write(key, &encoded) {
            Ok(()) => Ok(true),
            Err(e) => {
                let err = StorageError::backend(self.store.name(), key, e);
                if matches!(err, StorageError::QuotaExceeded { .. }) {
                    tracing::warn!(
                        "Storage quota exceeded: store={}, key={}, size={}",
                        self.store.name(),
                        key,
                        encoded.len()
                    );
                } else {
                    tracing::debug!("Failed to write entry: {}", err);
                }

                if options.strict { Err(err) } else { Ok(false) }
            }
        }
    }

    fn remove(&self, key: &str) -> bool {
        match self.store.delete(key) {
            Ok(()) => true,
            Err(e) => {
                tracing::debug!(
                    "Failed to remove entry: store={}, key={}, error={}",
                    self.store.name(),
                    key,
                    e
                );
                false
            }
        }
    }

    fn remove_many(&self, keys: &[String]) -> bool {
        if keys.is_empty() {
            return true;
        }
        match self.store.delete_many(keys) {
            Ok(()) => true,
            Err(e) => {
                tracing::debug!(
                    "Failed to remove entries: store={}, count={}, error={}",
                    self.store.name(),
                    keys.len(),
                    e
                );
                false
            }
        }
    }

    fn clear(&self) {
        if let Err(e) = self.store.clear() {
            tracing::debug!(
                "Failed to clear store: store={}, error={}",
                self.store.name(),
                e
            );
        }
    }

    fn has(&self, key: &str) -> bool {
        matches!(self.store.read(key), Ok(Some(_)))
    }

    fn keys(&self) -> Vec<String> {
        let enumerate = || -> Result<Vec<String>, crate::error::StoreError> {
            let count = self.store.count()?;
            let mut keys = Vec::with_capacity(count);
            for index in 0..count {
                if let Some(key) = self.store.key_at(index)? {
                    keys.push(key);
                }
            }
            Ok(keys)
        };

        enumerate().unwrap_or_else(|e| {
            tracing::debug!(
                "Failed to enumerate keys: store={}, error={}",
                self.store.name(),
                e
            );
            Vec::new()
        })
    }

    fn namespace(&self, prefix: &str) -> Namespaced {
        Namespaced::new(Arc::new(self.clone()), prefix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use crate::storage::StorageExt;
    use crate::stores::memory::{MemoryStore, MemoryStoreConfig};
    use serde::{Deserialize, Serialize};

    /// A store where every operation fails.
    struct BrokenStore;

    impl Store for BrokenStore {
        fn name(&self) -> &'static str {
            "broken"
        }

        fn read(&self, _key: &str) -> Result<Option<String>, StoreError> {
            Err(StoreError::Unavailable("read".to_string()))
        }

        fn write(&self, _key: &str, _value: &str) -> Result<(), StoreError> {
            Err(StoreError::Unavailable("write".to_string()))
        }

        fn delete(&self, _key: &str) -> Result<(), StoreError> {
            Err(StoreError::Unavailable("delete".to_string()))
        }

        fn clear(&self) -> Result<(), StoreError> {
            Err(StoreError::Unavailable("clear".to_string()))
        }

        fn count(&self) -> Result<usize, StoreError> {
            Err(StoreError::Unavailable("count".to_string()))
        }

        fn key_at(&self, _index: usize) -> Result<Option<String>, StoreError> {
            Err(StoreError::Unavailable("key_at".to_string()))
        }
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct User {
        name: String,
        age: u32,
    }

    fn memory_storage() -> (Arc<MemoryStore>, TypedStorage) {
        let store = Arc::new(MemoryStore::default());
        let storage = TypedStorage::new(store.clone());
        (store, storage)
    }

    #[test]
    fn test_set_get_typed() {
        let (store, storage) = memory_storage();
        let user = User {
            name: "John".to_string(),
            age: 30,
        };

        assert!(storage.set("user", &user, StorageOptions::default()).unwrap());

        let loaded: Option<User> = storage.get("user", StorageOptions::default()).unwrap();
        assert_eq!(loaded, Some(user));
        assert_eq!(
            store.read("user").unwrap().as_deref(),
            Some(r#"{"name":"John","age":30}"#)
        );
    }

    #[test]
    fn test_corrupted_entry_is_discarded() {
        let (store, storage) = memory_storage();
        store.write("broken", "not valid json{").unwrap();

        let result: Option<String> = storage.get("broken", StorageOptions::default()).unwrap();
        assert!(result.is_none());
        assert!(!storage.has("broken"));
    }

    #[test]
    fn test_corrupted_entry_strict_names_key() {
        let (store, storage) = memory_storage();
        store.write("broken", "not valid json{").unwrap();

        let err = storage
            .get::<String>("broken", StorageOptions::strict())
            .unwrap_err();
        assert!(matches!(err, StorageError::Deserialization { .. }));
        assert_eq!(err.key(), "broken");
        // Discarded even when the failure is reported
        assert!(!storage.has("broken"));
    }

    #[test]
    fn test_mistyped_entry_is_kept() {
        let (_store, storage) = memory_storage();
        storage
            .set("count", "not a number", StorageOptions::default())
            .unwrap();

        let safe: Option<u32> = storage.get("count", StorageOptions::default()).unwrap();
        assert!(safe.is_none());

        let err = storage
            .get::<u32>("count", StorageOptions::strict())
            .unwrap_err();
        assert!(matches!(err, StorageError::Deserialization { .. }));
        assert!(storage.has("count"));
    }

    #[test]
    fn test_quota_exceeded() {
        let store = Arc::new(MemoryStore::new(MemoryStoreConfig {
            quota_bytes: Some(16),
        }));
        let storage = TypedStorage::new(store);
        let big = "x".repeat(64);

        assert!(!storage.set("big", &big, StorageOptions::default()).unwrap());
        assert!(!storage.has("big"));

        let err = storage
            .set("big", &big, StorageOptions::strict())
            .unwrap_err();
        assert!(matches!(err, StorageError::QuotaExceeded { ref key } if key == "big"));
    }

    #[test]
    fn test_broken_store_degrades_safely() {
        let storage = TypedStorage::new(Arc::new(BrokenStore));

        assert!(
            storage
                .get::<String>("k", StorageOptions::default())
                .unwrap()
                .is_none()
        );
        assert!(!storage.set("k", "v", StorageOptions::default()).unwrap());
        assert!(!storage.remove("k"));
        assert!(!storage.remove_many(&["k".to_string()]));
        assert!(!storage.has("k"));
        assert!(storage.keys().is_empty());
        storage.clear();
    }

    #[test]
    fn test_broken_store_strict_reports_backend() {
        let storage = TypedStorage::new(Arc::new(BrokenStore));

        let err = storage
            .set("k", "v", StorageOptions::strict())
            .unwrap_err();
        assert!(matches!(
            err,
            StorageError::Backend {
                backend: "broken",
                ..
            }
        ));

        let err = storage
            .get::<String>("k", StorageOptions::strict())
            .unwrap_err();
        assert_eq!(err.key(), "k");
    }

    #[test]
    fn test_probe() {
        let store = MemoryStore::default();
        assert!(probe(&store));
        assert!(store.read(PROBE_KEY).unwrap().is_none());

        assert!(!probe(&BrokenStore));
    }

    #[test]
    fn test_backend_name() {
        let (_store, storage) = memory_storage();
        assert_eq!(storage.backend(), "memory");
    }
}
