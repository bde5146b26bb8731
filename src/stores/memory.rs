use indexmap::IndexMap;
use parking_lot::RwLock;
use std::collections::HashSet;

use crate::error::StoreError;
use crate::store::Store;

/// Configuration for MemoryStore.
#[derive(Debug, Clone, Default)]
pub struct MemoryStoreConfig {
    /// Maximum number of bytes (keys plus values) the store may hold.
    /// `None` means unlimited.
    pub quota_bytes: Option<usize>,
}

/// Insertion-ordered key space with byte accounting.
///
/// Overwriting a key keeps its position; removing it drops it from the order.
#[derive(Debug, Clone, Default)]
pub(crate) struct Entries {
    values: IndexMap<String, String>,
    used_bytes: usize,
}

fn entry_size(key: &str, value: &str) -> usize {
    key.len() + value.len()
}

impl Entries {
    /// Build from pairs in enumeration order. Later duplicates win.
    pub(crate) fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let mut entries = Entries::default();
        for (key, value) in pairs {
            // No quota while loading: the data is already there.
            let _ = entries.insert(&key, &value, None);
        }
        entries
    }

    pub(crate) fn get(&self, key: &str) -> Option<&String> {
        self.values.get(key)
    }

    pub(crate) fn insert(
        &mut self,
        key: &str,
        value: &str,
        quota: Option<usize>,
    ) -> Result<(), StoreError> {
        let previous = self
            .values
            .get(key)
            .map(|v| entry_size(key, v))
            .unwrap_or(0);
        let next_used = self.used_bytes - previous + entry_size(key, value);

        if let Some(quota) = quota.filter(|quota| next_used > *quota) {
            return Err(StoreError::QuotaExceeded {
                key: key.to_string(),
                quota,
            });
        }

        self.values.insert(key.to_string(), value.to_string());
        self.used_bytes = next_used;
        Ok(())
    }

    pub(crate) fn remove(&mut self, key: &str) -> bool {
        match self.values.shift_remove(key) {
            Some(value) => {
                self.used_bytes -= entry_size(key, &value);
                true
            }
            None => false,
        }
    }

    /// Remove every listed key in one pass. Returns how many were present.
    pub(crate) fn remove_many(&mut self, keys: &[String]) -> usize {
        let doomed: HashSet<&str> = keys.iter().map(String::as_str).collect();
        let before = self.values.len();
        let mut freed = 0;

        self.values.retain(|key, value| {
            if doomed.contains(key.as_str()) {
                freed += entry_size(key, value);
                false
            } else {
                true
            }
        });

        self.used_bytes -= freed;
        before - self.values.len()
    }

    pub(crate) fn clear(&mut self) {
        self.values.clear();
        self.used_bytes = 0;
    }

    pub(crate) fn len(&self) -> usize {
        self.values.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub(crate) fn key_at(&self, index: usize) -> Option<&String> {
        self.values.get_index(index).map(|(key, _)| key)
    }

    pub(crate) fn used_bytes(&self) -> usize {
        self.used_bytes
    }

    /// Pairs in enumeration order.
    pub(crate) fn pairs(&self) -> Vec<(&str, &str)> {
        self.values
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect()
    }
}

/// Volatile in-memory store.
///
/// This is the fallback when no persistent store can be opened, and the
/// natural choice for tests. Contents are lost when the store is dropped.
pub struct MemoryStore {
    state: RwLock<Entries>,
    quota_bytes: Option<usize>,
}

impl MemoryStore {
    /// Create a new MemoryStore with the given configuration.
    pub fn new(config: MemoryStoreConfig) -> Self {
        MemoryStore {
            state: RwLock::new(Entries::default()),
            quota_bytes: config.quota_bytes,
        }
    }

    /// Bytes currently accounted against the quota.
    pub fn used_bytes(&self) -> usize {
        self.state.read().used_bytes()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new(MemoryStoreConfig::default())
    }
}

impl Store for MemoryStore {
    fn name(&self) -> &'static str {
        "memory"
    }

    fn read(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.state.read().get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.state.write().insert(key, value, self.quota_bytes)
    }

    fn delete(&self, key: &str) -> Result<(), StoreError> {
        self.state.write().remove(key);
        Ok(())
    }

    fn delete_many(&self, keys: &[String]) -> Result<(), StoreError> {
        self.state.write().remove_many(keys);
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        self.state.write().clear();
        Ok(())
    }

    fn count(&self) -> Result<usize, StoreError> {
        Ok(self.state.read().len())
    }

    fn key_at(&self, index: usize) -> Result<Option<String>, StoreError> {
        Ok(self.state.read().key_at(index).cloned())
    }
}
