use serde::Serialize;
use serde::de::{DeserializeOwned, IgnoredAny};
use serde_json::Value;
use std::sync::Arc;

use crate::clock::{Clock, SystemClock};
use crate::entry::TtlEntry;
use crate::error::StorageError;
use crate::namespace::Namespaced;
use crate::storage::{Storage, StorageExt, StorageOptions};
use crate::utils::{TTL_PREFIX, build_ttl_key};

/// Adds expiring entries to any storage.
///
/// A TTL entry for `key` is stored in the wrapped storage under
/// `__ttl__{key}` as a [`TtlEntry`]. Expiry is lazy: an expired entry reads as
/// absent and is removed on that read, or by an explicit
/// [`clear_expired`](TtlStorage::clear_expired) sweep.
///
/// The plain `Storage` methods pass straight through, so TTL and plain
/// entries share one key space. Plain keys must not start with `__ttl__`.
///
/// Namespacing a `TtlStorage` gives a plain [`Namespaced`] view without the TTL
/// operations; keep the `TtlStorage` handle to use them.
#[derive(Clone)]
pub struct TtlStorage {
    inner: Arc<dyn Storage>,
    clock: Arc<dyn Clock>,
}

impl TtlStorage {
    /// Wrap `inner`, reading time from the system clock.
    pub fn new(inner: Arc<dyn Storage>) -> Self {
        Self::with_clock(inner, Arc::new(SystemClock))
    }

    /// Wrap `inner` with an explicit clock.
    ///
    /// # Example
    /// ```ignore
    /// let clock = ManualClock::new(0);
    /// let ttl = TtlStorage::with_clock(Arc::new(storage), Arc::new(clock.clone()));
    /// ttl.set_ttl("session", "token", 100);
    /// clock.advance(100);
    /// assert_eq!(ttl.get_ttl::<String>("session"), None);
    /// ```
    pub fn with_clock(inner: Arc<dyn Storage>, clock: Arc<dyn Clock>) -> Self {
        TtlStorage { inner, clock }
    }

    /// Store `value` so that it expires `ttl_ms` milliseconds from now.
    ///
    /// Returns `false` if the wrapped storage rejected the write.
    pub fn set_ttl<T>(&self, key: &str, value: &T, ttl_ms: i64) -> bool
    where
        T: Serialize + ?Sized,
    {
        // Safe mode reports failures as Ok(false).
        self.set_ttl_with(key, value, ttl_ms, StorageOptions::safe())
            .unwrap_or(false)
    }

    /// [`set_ttl`](TtlStorage::set_ttl) with an explicit error policy.
    pub fn set_ttl_with<T>(
        &self,
        key: &str,
        value: &T,
        ttl_ms: i64,
        options: StorageOptions,
    ) -> Result<bool, StorageError>
    where
        T: Serialize + ?Sized,
    {
        let entry = TtlEntry::new(value, self.clock.now_ms(), ttl_ms);
        self.inner.set(&build_ttl_key(key), &entry, options)
    }

    /// Return the value for `key` unless it is missing or expired.
    pub fn get_ttl<T>(&self, key: &str) -> Option<T>
    where
        T: DeserializeOwned,
    {
        self.get_ttl_with(key, StorageOptions::safe())
            .ok()
            .flatten()
    }

    /// [`get_ttl`](TtlStorage::get_ttl) with an explicit error policy.
    ///
    /// Expired entries are removed and read as `None` in both modes.
    pub fn get_ttl_with<T>(
        &self,
        key: &str,
        options: StorageOptions,
    ) -> Result<Option<T>, StorageError>
    where
        T: DeserializeOwned,
    {
        let ttl_key = build_ttl_key(key);
        let Some(entry) = self.inner.get::<TtlEntry<Value>>(&ttl_key, options)? else {
            return Ok(None);
        };

        if entry.is_expired(self.clock.now_ms()) {
            tracing::debug!(
                "Removing expired entry: key={}, expires_at={}",
                key,
                entry.expires_at
            );
            self.inner.remove(&ttl_key);
            return Ok(None);
        }

        if entry.value.is_null() {
            return Ok(None);
        }

        match serde_json::from_value(entry.value) {
            Ok(value) => Ok(Some(value)),
            Err(e) if options.strict => Err(StorageError::deserialization(ttl_key, e)),
            Err(e) => {
                tracing::debug!("Ignoring mistyped TTL value: key={}, error={}", key, e);
                Ok(None)
            }
        }
    }

    /// Remove every expired TTL entry. Returns how many were removed.
    ///
    /// Live TTL entries and plain entries are left alone.
    pub fn clear_expired(&self) -> usize {
        let now = self.clock.now_ms();

        let expired: Vec<String> = self
            .inner
            .keys()
            .into_iter()
            .filter(|key| key.starts_with(TTL_PREFIX))
            .filter(|key| {
                matches!(
                    self.inner
                        .get::<TtlEntry<IgnoredAny>>(key, StorageOptions::safe()),
                    Ok(Some(entry)) if entry.is_expired(now)
                )
            })
            .collect();

        if expired.is_empty() {
            return 0;
        }

        let cleared = if self.inner.remove_many(&expired) {
            expired.len()
        } else {
            expired.iter().filter(|key| !self.inner.has(key)).count()
        };

        if cleared > 0 {
            tracing::debug!("Cleared expired entries: count={}", cleared);
        }
        cleared
    }
}

/// Add TTL support to `storage`.
pub fn with_ttl<S>(storage: S) -> TtlStorage
where
    S: Storage + 'static,
{
    TtlStorage::new(Arc::new(storage))
}

impl Storage for TtlStorage {
    fn get_json(&self, key: &str, options: StorageOptions) -> Result<Option<Value>, StorageError> {
        self.inner.get_json(key, options)
    }

    fn set_json(
        &self,
        key: &str,
        value: Value,
        options: StorageOptions,
    ) -> Result<bool, StorageError> {
        self.inner.set_json(key, value, options)
    }

    fn remove(&self, key: &str) -> bool {
        self.inner.remove(key)
    }

    fn remove_many(&self, keys: &[String]) -> bool {
        self.inner.remove_many(keys)
    }

    fn clear(&self) {
        self.inner.clear()
    }

    fn has(&self, key: &str) -> bool {
        self.inner.has(key)
    }

    fn keys(&self) -> Vec<String> {
        self.inner.keys()
    }

    fn namespace(&self, prefix: &str) -> Namespaced {
        self.inner.namespace(prefix)
    }
}
