use parking_lot::RwLock;
use std::fs::{self, File};
use std::io::{self, ErrorKind, Write};
use std::path::{Path, PathBuf};

use crate::error::StoreError;
use crate::store::Store;
use crate::stores::memory::Entries;

/// Configuration for FileStore.
#[derive(Debug, Clone)]
pub struct FileStoreConfig {
    /// File holding the persisted key space. Created on first write.
    pub path: PathBuf,

    /// Maximum number of bytes (keys plus values) the store may hold.
    /// `None` means unlimited.
    pub quota_bytes: Option<usize>,
}

/// Persistent store backed by a single JSON file.
///
/// The key space is kept in memory and written through to disk on every
/// mutation. The file holds a JSON array of `[key, value]` pairs in
/// enumeration order. Writes go to a sibling temp file that is then renamed
/// over the original, so a crash never leaves a half-written file behind.
pub struct FileStore {
    path: PathBuf,
    state: RwLock<Entries>,
    quota_bytes: Option<usize>,
}

impl FileStore {
    /// Open the store, loading any previously persisted entries.
    ///
    /// A missing file is an empty store. A file that cannot be parsed is
    /// reported as [`StoreError::Corrupt`] rather than silently discarded.
    ///
    /// # Example
    /// ```ignore
    /// let store = FileStore::open(FileStoreConfig {
    ///     path: "data/storage.json".into(),
    ///     quota_bytes: Some(5 * 1024 * 1024),
    /// })?;
    /// ```
    pub fn open(config: FileStoreConfig) -> Result<Self, StoreError> {
        let entries = match fs::read_to_string(&config.path) {
            Ok(data) if data.trim().is_empty() => Entries::default(),
            Ok(data) => {
                let pairs: Vec<(String, String)> = serde_json::from_str(&data).map_err(|e| {
                    StoreError::Corrupt(format!("{}: {}", config.path.display(), e))
                })?;
                Entries::from_pairs(pairs)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Entries::default(),
            Err(e) => return Err(e.into()),
        };

        tracing::debug!(
            "Opened file store: path={}, entries={}",
            config.path.display(),
            entries.len()
        );

        Ok(FileStore {
            path: config.path,
            state: RwLock::new(entries),
            quota_bytes: config.quota_bytes,
        })
    }

    /// Location of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Bytes currently accounted against the quota.
    pub fn used_bytes(&self) -> usize {
        self.state.read().used_bytes()
    }

    /// Apply `change` to a copy of the state, persist it, then commit.
    ///
    /// `change` returns whether anything changed; unchanged state is not
    /// rewritten.
    fn mutate<F>(&self, change: F) -> Result<(), StoreError>
    where
        F: FnOnce(&mut Entries) -> Result<bool, StoreError>,
    {
        let mut state = self.state.write();
        let mut next = state.clone();
        if !change(&mut next)? {
            return Ok(());
        }
        persist(&self.path, &next)?;
        *state = next;
        Ok(())
    }
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".tmp");
    PathBuf::from(name)
}

fn persist(path: &Path, entries: &Entries) -> Result<(), StoreError> {
    let data = serde_json::to_string(&entries.pairs())
        .map_err(|e| StoreError::Corrupt(format!("failed to encode store: {}", e)))?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    // Atomic write: temp + fsync + rename
    let tmp = temp_path(path);
    if let Err(e) = write_synced(&tmp, data.as_bytes()).and_then(|()| fs::rename(&tmp, path)) {
        let _ = fs::remove_file(&tmp);
        return Err(e.into());
    }
    Ok(())
}

fn write_synced(path: &Path, data: &[u8]) -> io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(data)?;
    file.sync_all()
}

impl Store for FileStore {
    fn name(&self) -> &'static str {
        "file"
    }

    fn read(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.state.read().get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let quota = self.quota_bytes;
        self.mutate(|entries| {
            entries.insert(key, value, quota)?;
            Ok(true)
        })
    }

    fn delete(&self, key: &str) -> Result<(), StoreError> {
        self.mutate(|entries| Ok(entries.remove(key)))
    }

    fn delete_many(&self, keys: &[String]) -> Result<(), StoreError> {
        self.mutate(|entries| Ok(entries.remove_many(keys) > 0))
    }

    fn clear(&self) -> Result<(), StoreError> {
        self.mutate(|entries| {
            let changed = !entries.is_empty();
            entries.clear();
            Ok(changed)
        })
    }

    fn count(&self) -> Result<usize, StoreError> {
        Ok(self.state.read().len())
    }

    fn key_at(&self, index: usize) -> Result<Option<String>, StoreError> {
        Ok(self.state.read().key_at(index).cloned())
    }
}
