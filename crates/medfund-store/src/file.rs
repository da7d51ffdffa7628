use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::traits::LedgerStore;
use crate::transaction::WriteSet;

/// Ledger store persisted as one JSON file.
///
/// On-disk format is a JSON object mapping each key to its hex-encoded value:
///
/// ```text
/// { "A1": "7b22...", "A1,1": "7b22..." }
/// ```
///
/// Every commit rewrites the whole file through a temporary file in the same
/// directory followed by a rename, so a crash leaves either the old or the new
/// contents and never a mix. Meant for the command-line driver and small
/// deployments; a real host ledger replaces it.
pub struct FileLedgerStore {
    path: PathBuf,
    /// Serializes read-modify-write of the file within this process.
    lock: Mutex<()>,
}

impl FileLedgerStore {
    /// Open (or lazily create) the store file at `path`.
    ///
    /// An existing file is decoded once up front so corruption is reported
    /// at open time instead of on the first operation.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let store = Self {
            path,
            lock: Mutex::new(()),
        };
        let entries = store.load()?;
        debug!(path = %store.path.display(), keys = entries.len(), "opened file store");
        Ok(store)
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> StoreResult<BTreeMap<String, Vec<u8>>> {
        let raw = match fs::read(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => return Err(e.into()),
        };
        if raw.is_empty() {
            return Ok(BTreeMap::new());
        }
        let encoded: BTreeMap<String, String> =
            serde_json::from_slice(&raw).map_err(|e| StoreError::Corrupt {
                location: self.path.display().to_string(),
                reason: e.to_string(),
            })?;
        encoded
            .into_iter()
            .map(|(key, value)| {
                let bytes = hex::decode(&value).map_err(|e| StoreError::Corrupt {
                    location: format!("{}:{key}", self.path.display()),
                    reason: e.to_string(),
                })?;
                Ok((key, bytes))
            })
            .collect()
    }

    fn save(&self, entries: &BTreeMap<String, Vec<u8>>) -> StoreResult<()> {
        let encoded: BTreeMap<&str, String> = entries
            .iter()
            .map(|(k, v)| (k.as_str(), hex::encode(v)))
            .collect();
        let json = serde_json::to_vec_pretty(&encoded)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        tmp.write_all(&json)?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|e| StoreError::Io(e.error))?;
        Ok(())
    }
}

impl LedgerStore for FileLedgerStore {
    fn get(&self, key: &str) -> StoreResult<Option<Vec<u8>>> {
        if key.is_empty() {
            return Err(StoreError::EmptyKey);
        }
        let _guard = self.lock.lock().map_err(|_| StoreError::LockPoisoned)?;
        let mut entries = self.load()?;
        Ok(entries.remove(key))
    }

    fn put(&self, key: &str, value: Vec<u8>) -> StoreResult<()> {
        let mut writes = WriteSet::new();
        writes.put(key, value)?;
        self.apply(writes)
    }

    fn apply(&self, writes: WriteSet) -> StoreResult<()> {
        let _guard = self.lock.lock().map_err(|_| StoreError::LockPoisoned)?;
        let mut entries = self.load()?;
        let count = writes.len();
        entries.extend(writes);
        self.save(&entries)?;
        debug!(path = %self.path.display(), written = count, "file store commit");
        Ok(())
    }
}

impl std::fmt::Debug for FileLedgerStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileLedgerStore")
            .field("path", &self.path)
            .finish()
    }
}
