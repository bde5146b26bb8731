use serde_json::Value;
use std::sync::Arc;

use crate::error::StorageError;
use crate::storage::{Storage, StorageOptions};
use crate::utils::{NAMESPACE_SEPARATOR, build_namespaced_key};

/// A storage view scoped to a key prefix.
///
/// Every key is stored in the wrapped storage as `{prefix}:{key}`. `keys` and
/// `clear` only see entries under that prefix, matched on the full prefix plus
/// separator, so `app` never sees `app2:key`.
///
/// Nested namespaces extend the prefix instead of stacking wrappers:
/// `ns.namespace("user")` wraps the same storage as `ns` with prefix
/// `{prefix}:user`.
#[derive(Clone)]
pub struct Namespaced {
    inner: Arc<dyn Storage>,
    prefix: String,
}

impl Namespaced {
    /// Scope `inner` to `prefix`.
    ///
    /// # Example
    /// ```ignore
    /// let users = Namespaced::new(Arc::new(storage), "users");
    /// users.set("123", &user, StorageOptions::default())?; // stored as "users:123"
    /// ```
    pub fn new(inner: Arc<dyn Storage>, prefix: impl Into<String>) -> Self {
        Namespaced {
            inner,
            prefix: prefix.into(),
        }
    }

    /// The full prefix path, segments joined by `:`.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    fn prefixed_key(&self, key: &str) -> String {
        build_namespaced_key(&self.prefix, key)
    }

    /// Strip this namespace from a physical key, if it belongs here.
    fn local_key<'a>(&self, key: &'a str) -> Option<&'a str> {
        key.strip_prefix(self.prefix.as_str())?
            .strip_prefix(NAMESPACE_SEPARATOR)
    }
}

/// Scope `storage` to `prefix`.
pub fn with_namespace<S>(storage: S, prefix: &str) -> Namespaced
where
    S: Storage + 'static,
{
    Namespaced::new(Arc::new(storage), prefix)
}

impl Storage for Namespaced {
    fn get_json(&self, key: &str, options: StorageOptions) -> Result<Option<Value>, StorageError> {
        self.inner.get_json(&self.prefixed_key(key), options)
    }

    fn set_json(
        &self,
        key: &str,
        value: Value,
        options: StorageOptions,
    ) -> Result<bool, StorageError> {
        self.inner.set_json(&self.prefixed_key(key), value, options)
    }

    fn remove(&self, key: &str) -> bool {
        self.inner.remove(&self.prefixed_key(key))
    }

    fn remove_many(&self, keys: &[String]) -> bool {
        let prefixed: Vec<String> = keys.iter().map(|key| self.prefixed_key(key)).collect();
        self.inner.remove_many(&prefixed)
    }

    fn clear(&self) {
        let owned: Vec<String> = self
            .inner
            .keys()
            .into_iter()
            .filter(|key| self.local_key(key).is_some())
            .collect();
        self.inner.remove_many(&owned);
    }

    fn has(&self, key: &str) -> bool {
        self.inner.has(&self.prefixed_key(key))
    }

    fn keys(&self) -> Vec<String> {
        self.inner
            .keys()
            .iter()
            .filter_map(|key| self.local_key(key))
            .map(str::to_string)
            .collect()
    }

    fn namespace(&self, prefix: &str) -> Namespaced {
        Namespaced {
            inner: Arc::clone(&self.inner),
            prefix: self.prefixed_key(prefix),
        }
    }
}
