//! typed-storage - Typed JSON key-value storage with composable layers
//!
//! This library provides a small, synchronous storage stack with:
//! - Typed get/set over a raw string key-value store (serde_json encoded)
//! - Safe (degrade quietly) or strict (return errors) failure handling per call
//! - Key namespacing with arbitrary nesting
//! - Time-bounded entries (TTL) with lazy expiry and explicit sweeps
//! - A persistent file store with transparent in-memory fallback
//!
//! Every layer implements the same [`Storage`] trait and wraps another
//! `Storage`, so layers compose in any order:
//!
//! - `with_ttl(with_namespace(storage, "app"))` keeps TTL records inside the
//!   namespace (`app:__ttl__key`).
//! - `with_namespace(with_ttl(storage), "app")` namespaces plain entries only;
//!   the namespaced view has no TTL operations.
//!
//! # Example
//!
//! ```ignore
//! use typed_storage::{create_storage, with_namespace, with_ttl, StorageExt, StorageOptions};
//!
//! let storage = create_storage();
//!
//! // Namespaces
//! let users = storage.namespace("users");
//! users.set("123", &user, StorageOptions::default())?; // stored as "users:123"
//!
//! // Expiring entries
//! let sessions = with_ttl(with_namespace(storage.clone(), "sessions"));
//! sessions.set_ttl("abc", "token", 60_000);
//! let token: Option<String> = sessions.get_ttl("abc");
//!
//! // Drop everything that has expired
//! let removed = sessions.clear_expired();
//! ```

mod builder;
mod clock;
mod config;
mod entry;
mod error;
mod facade;
mod namespace;
mod storage;
mod store;
pub mod stores;
mod ttl;
mod utils;

// Re-export public API
pub use builder::{StorageBuilder, create_storage};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{DEFAULT_QUOTA_BYTES, ENV_PATH, ENV_QUOTA_BYTES, StorageConfig};
pub use entry::TtlEntry;
pub use error::{StorageError, StoreError};
pub use facade::{PROBE_KEY, TypedStorage, probe};
pub use namespace::{Namespaced, with_namespace};
pub use storage::{Storage, StorageExt, StorageOptions};
pub use store::Store;
pub use stores::file::{FileStore, FileStoreConfig};
pub use stores::memory::{MemoryStore, MemoryStoreConfig};
pub use ttl::{TtlStorage, with_ttl};
pub use utils::{NAMESPACE_SEPARATOR, TTL_PREFIX};
