/// Error raised by a base [`Store`](crate::Store) implementation.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The write would push the store past its byte quota.
    #[error("quota of {quota} bytes exceeded while writing key '{key}'")]
    QuotaExceeded { key: String, quota: usize },
    /// Reading or writing the backing file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// The persisted data could not be understood.
    #[error("corrupt store data: {0}")]
    Corrupt(String),
    /// The store cannot be used at all.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Error type for typed storage operations.
///
/// Only returned when the caller asked for strict mode; safe mode converts
/// every failure into a benign result at the point where it happens.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// A raw entry exists but does not decode to the requested value.
    #[error("failed to deserialize value for key '{key}': {source}")]
    Deserialization {
        key: String,
        #[source]
        source: serde_json::Error,
    },
    /// The value cannot be represented as JSON.
    #[error("failed to serialize value for key '{key}': {source}")]
    Serialization {
        key: String,
        #[source]
        source: serde_json::Error,
    },
    /// The base store rejected the write for lack of space.
    #[error("storage quota exceeded for key '{key}'")]
    QuotaExceeded { key: String },
    /// Any other base store failure.
    #[error("[{backend}] store error for key '{key}': {source}")]
    Backend {
        backend: &'static str,
        key: String,
        #[source]
        source: StoreError,
    },
}

impl StorageError {
    pub fn deserialization(key: impl Into<String>, source: serde_json::Error) -> Self {
        StorageError::Deserialization {
            key: key.into(),
            source,
        }
    }

    pub fn serialization(key: impl Into<String>, source: serde_json::Error) -> Self {
        StorageError::Serialization {
            key: key.into(),
            source,
        }
    }

    /// Map a base store failure for `key`, keeping quota rejections distinct.
    pub fn backend(backend: &'static str, key: impl Into<String>, source: StoreError) -> Self {
        let key = key.into();
        match source {
            StoreError::QuotaExceeded { .. } => StorageError::QuotaExceeded { key },
            source => StorageError::Backend {
                backend,
                key,
                source,
            },
        }
    }

    /// The key the failing operation was addressed to.
    pub fn key(&self) -> &str {
        match self {
            StorageError::Deserialization { key, .. }
            | StorageError::Serialization { key, .. }
            | StorageError::QuotaExceeded { key }
            | StorageError::Backend { key, .. } => key,
        }
    }
}
