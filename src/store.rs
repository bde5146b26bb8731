use crate::error::StoreError;

/// A store is the raw string key-value primitive everything else is built on.
///
/// Implementations are synchronous. Keys must be enumerable by index so that
/// `key_at(0..count())` visits every key exactly once within one pass, as long
/// as the store is not mutated in between.
pub trait Store: Send + Sync {
    /// A name for logging and error reporting.
    ///
    /// # Example
    /// - "memory"
    /// - "file"
    fn name(&self) -> &'static str;

    /// Return the raw value, or `None` if the key is absent.
    fn read(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Store the raw value, replacing any previous one.
    ///
    /// Must fail with [`StoreError::QuotaExceeded`] when the store is out of
    /// space, and must leave the store unchanged when it fails.
    fn write(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Remove the key. Removing an absent key is not an error.
    fn delete(&self, key: &str) -> Result<(), StoreError>;

    /// Remove every listed key. Absent keys are skipped.
    ///
    /// Stores that can batch removals should override this.
    fn delete_many(&self, keys: &[String]) -> Result<(), StoreError> {
        for key in keys {
            self.delete(key)?;
        }
        Ok(())
    }

    /// Remove every key.
    fn clear(&self) -> Result<(), StoreError>;

    /// Number of keys currently stored.
    fn count(&self) -> Result<usize, StoreError>;

    /// The key at the given enumeration index.
    fn key_at(&self, index: usize) -> Result<Option<String>, StoreError>;
}
