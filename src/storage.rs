use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::StorageError;
use crate::namespace::Namespaced;

/// Options for storage operations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StorageOptions {
    /// In strict mode failures are returned as errors, in safe mode they
    /// degrade to `None`/`false`.
    ///
    /// Default: `false`
    pub strict: bool,
}

impl StorageOptions {
    /// Swallow failures and degrade to benign results.
    pub fn safe() -> Self {
        StorageOptions { strict: false }
    }

    /// Return failures to the caller.
    pub fn strict() -> Self {
        StorageOptions { strict: true }
    }
}

/// The uniform interface every storage layer implements.
///
/// The facade, the namespace decorator and the TTL decorator all expose this
/// trait and hold the layer they wrap as an `Arc<dyn Storage>`, so layers
/// compose in any order. Values cross this trait as JSON; the typed
/// `get`/`set` surface comes from [`StorageExt`].
///
/// `remove`, `clear`, `has` and `keys` never fail: a broken base store reads
/// as empty.
pub trait Storage: Send + Sync {
    /// Return the decoded JSON value for `key`, `None` when absent.
    fn get_json(&self, key: &str, options: StorageOptions) -> Result<Option<Value>, StorageError>;

    /// Store a JSON value. `Ok(false)` means the write failed in safe mode.
    fn set_json(&self, key: &str, value: Value, options: StorageOptions)
    -> Result<bool, StorageError>;

    /// Remove the key. Returns `false` if the base store failed.
    fn remove(&self, key: &str) -> bool;

    /// Remove every listed key. Returns `false` if the base store failed.
    fn remove_many(&self, keys: &[String]) -> bool {
        let mut removed = true;
        for key in keys {
            removed &= self.remove(key);
        }
        removed
    }

    /// Remove every key visible through this layer.
    fn clear(&self);

    /// Whether an entry exists for `key`.
    fn has(&self, key: &str) -> bool;

    /// Every key visible through this layer, in enumeration order.
    fn keys(&self) -> Vec<String>;

    /// A view of this storage scoped to `prefix`.
    fn namespace(&self, prefix: &str) -> Namespaced;
}

/// Typed access on top of any [`Storage`].
///
/// # Example
/// ```ignore
/// let storage = create_storage();
/// storage.set("user", &User { name: "John".into() }, StorageOptions::default())?;
/// let user: Option<User> = storage.get("user", StorageOptions::default())?;
/// ```
pub trait StorageExt: Storage {
    /// Return the value for `key` decoded as `T`.
    ///
    /// A stored JSON `null` reads as `None`. A stored value that is valid
    /// JSON but not a `T` is a deserialization failure; unlike unparsable
    /// data it is left in place.
    fn get<T>(&self, key: &str, options: StorageOptions) -> Result<Option<T>, StorageError>
    where
        T: DeserializeOwned,
    {
        let value = match self.get_json(key, options)? {
            None | Some(Value::Null) => return Ok(None),
            Some(value) => value,
        };

        match serde_json::from_value(value) {
            Ok(typed) => Ok(Some(typed)),
            Err(e) if options.strict => Err(StorageError::deserialization(key, e)),
            Err(e) => {
                tracing::debug!("Ignoring mistyped value: key={}, error={}", key, e);
                Ok(None)
            }
        }
    }

    /// Store `value` under `key`.
    ///
    /// Non-finite floats are stored as `null`. Values serde_json cannot
    /// represent (such as maps with non-string keys) fail before anything is
    /// written.
    fn set<T>(&self, key: &str, value: &T, options: StorageOptions) -> Result<bool, StorageError>
    where
        T: Serialize + ?Sized,
    {
        match serde_json::to_value(value) {
            Ok(json) => self.set_json(key, json, options),
            Err(e) if options.strict => Err(StorageError::serialization(key, e)),
            Err(e) => {
                tracing::debug!("Failed to serialize value: key={}, error={}", key, e);
                Ok(false)
            }
        }
    }
}

impl<S: Storage + ?Sized> StorageExt for S {}
