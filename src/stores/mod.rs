//! Base store implementations for the storage library.

pub mod file;
pub mod memory;

pub use file::{FileStore, FileStoreConfig};
pub use memory::{MemoryStore, MemoryStoreConfig};
