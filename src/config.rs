use std::env;
use std::path::PathBuf;

/// Default byte quota, the common browser limit for local storage.
pub const DEFAULT_QUOTA_BYTES: usize = 5 * 1024 * 1024;

/// Environment variable naming the persistent store file.
pub const ENV_PATH: &str = "TYPED_STORAGE_PATH";

/// Environment variable overriding the byte quota. `0` means unlimited.
pub const ENV_QUOTA_BYTES: &str = "TYPED_STORAGE_QUOTA_BYTES";

/// Configuration for backend selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageConfig {
    /// File for the persistent store. `None` selects the in-memory store.
    pub path: Option<PathBuf>,

    /// Maximum bytes (keys plus values) the store may hold.
    /// `None` means unlimited.
    pub quota_bytes: Option<usize>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        StorageConfig {
            path: None,
            quota_bytes: Some(DEFAULT_QUOTA_BYTES),
        }
    }
}

impl StorageConfig {
    /// Defaults overlaid with `TYPED_STORAGE_PATH` and
    /// `TYPED_STORAGE_QUOTA_BYTES`.
    pub fn from_env() -> Self {
        Self::from_vars(env::var(ENV_PATH).ok(), env::var(ENV_QUOTA_BYTES).ok())
    }

    fn from_vars(path: Option<String>, quota: Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(path) = path.filter(|p| !p.trim().is_empty()) {
            config.path = Some(PathBuf::from(path));
        }

        if let Some(quota) = quota {
            match quota.trim().parse::<usize>() {
                Ok(0) => config.quota_bytes = None,
                Ok(bytes) => config.quota_bytes = Some(bytes),
                Err(e) => {
                    tracing::warn!(
                        "Ignoring malformed {}: value={}, error={}",
                        ENV_QUOTA_BYTES,
                        quota,
                        e
                    );
                }
            }
        }

        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = StorageConfig::default();
        assert!(config.path.is_none());
        assert_eq!(config.quota_bytes, Some(DEFAULT_QUOTA_BYTES));
    }

    #[test]
    fn test_vars_override_defaults() {
        let config = StorageConfig::from_vars(
            Some("/tmp/storage.json".to_string()),
            Some("1024".to_string()),
        );
        assert_eq!(config.path, Some(PathBuf::from("/tmp/storage.json")));
        assert_eq!(config.quota_bytes, Some(1024));
    }

    #[test]
    fn test_zero_quota_is_unlimited() {
        let config = StorageConfig::from_vars(None, Some("0".to_string()));
        assert_eq!(config.quota_bytes, None);
    }

    #[test]
    fn test_malformed_values_are_ignored() {
        let config = StorageConfig::from_vars(Some("  ".to_string()), Some("lots".to_string()));
        assert_eq!(config, StorageConfig::default());
    }
}
