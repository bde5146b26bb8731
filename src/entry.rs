use serde::{Deserialize, Serialize};

/// A value stored with an absolute expiry time.
///
/// Persisted as `{"value": ..., "expiresAt": ...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TtlEntry<V> {
    /// The stored value.
    pub value: V,

    /// Unix timestamp in milliseconds.
    /// From this time on the entry is treated as absent.
    pub expires_at: i64,
}

impl<V> TtlEntry<V> {
    /// Create an entry that expires `ttl_ms` after `now_ms`.
    ///
    /// Non-positive TTLs produce an entry that is already expired.
    pub fn new(value: V, now_ms: i64, ttl_ms: i64) -> Self {
        TtlEntry {
            value,
            expires_at: now_ms.saturating_add(ttl_ms),
        }
    }

    /// Check if the entry has expired and should not be used.
    pub fn is_expired(&self, now_ms: i64) -> bool {
        now_ms >= self.expires_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expiry_boundary() {
        let entry = TtlEntry::new("v", 1_000, 100);
        assert_eq!(entry.expires_at, 1_100);
        assert!(!entry.is_expired(1_099));
        assert!(entry.is_expired(1_100));
    }

    #[test]
    fn test_non_positive_ttl_is_expired() {
        assert!(TtlEntry::new(1, 1_000, 0).is_expired(1_000));
        assert!(TtlEntry::new(1, 1_000, -50).is_expired(1_000));
    }

    #[test]
    fn test_wire_format() {
        let entry = TtlEntry::new(vec![1, 2], 0, 5);
        let json = serde_json::to_string(&entry).unwrap();
        assert_eq!(json, r#"{"value":[1,2],"expiresAt":5}"#);
    }
}
