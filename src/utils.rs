//! Shared utilities for the storage library.

use std::fmt::Display;
use std::time::{SystemTime, UNIX_EPOCH};

/// Separator between namespace segments and the key.
pub const NAMESPACE_SEPARATOR: char = ':';

/// Prefix for keys holding TTL records.
pub const TTL_PREFIX: &str = "__ttl__";

/// Build a namespaced key from a prefix path and key.
///
/// Format: `{prefix}:{key}`
pub fn build_namespaced_key<P: Display>(prefix: &P, key: &str) -> String {
    format!("{}{}{}", prefix, NAMESPACE_SEPARATOR, key)
}

/// Build the physical key of the TTL record for `key`.
///
/// Format: `__ttl__{key}`
pub fn build_ttl_key(key: &str) -> String {
    format!("{}{}", TTL_PREFIX, key)
}

/// Get the current time in milliseconds since UNIX epoch.
///
/// A system clock set before the epoch reads as 0 instead of panicking.
pub fn now_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_namespaced_key() {
        let key = build_namespaced_key(&"app", "user:123");
        assert_eq!(key, "app:user:123");
    }

    #[test]
    fn test_build_ttl_key() {
        assert_eq!(build_ttl_key("temp"), "__ttl__temp");
        assert_eq!(build_ttl_key("app:temp"), "__ttl__app:temp");
    }

    #[test]
    fn test_now_ms_is_positive() {
        let now = now_ms();
        assert!(now > 0);
    }
}
