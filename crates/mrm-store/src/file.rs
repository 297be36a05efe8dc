use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::traits::{check_key, KvStore};

/// Current on-disk format version.
const FORMAT_VERSION: u32 = 1;

/// On-disk snapshot of the whole key space.
///
/// ```text
/// { "version": 1, "checksum": <crc32 of entries JSON>, "entries": { key: hex(value) } }
/// ```
#[derive(Debug, Serialize, Deserialize)]
struct StoreFile {
    version: u32,
    checksum: u32,
    entries: BTreeMap<String, String>,
}

/// File-backed key/value store.
///
/// The full key space lives in memory and is rewritten to disk after every
/// mutation. Each rewrite goes to a temporary file in the same directory
/// which is then renamed over the target, so a crash leaves either the old
/// or the new snapshot, never a torn one.
pub struct FileKvStore {
    path: PathBuf,
    entries: RwLock<BTreeMap<String, Vec<u8>>>,
}

impl FileKvStore {
    /// Open the store at `path`, creating an empty one if the file is absent.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref().to_path_buf();
        let entries = match fs::read(&path) {
            Ok(bytes) => decode_file(&path, &bytes)?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };
        debug!(path = %path.display(), keys = entries.len(), "file store opened");
        Ok(Self {
            path,
            entries: RwLock::new(entries),
        })
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Apply `mutate` to a copy of the key space, persist it, then publish it.
    fn commit<F>(&self, mutate: F) -> StoreResult<()>
    where
        F: FnOnce(&mut BTreeMap<String, Vec<u8>>),
    {
        let mut map = self.entries.write().expect("lock poisoned");
        let mut next = map.clone();
        mutate(&mut next);
        self.persist(&next)?;
        *map = next;
        Ok(())
    }

    fn persist(&self, entries: &BTreeMap<String, Vec<u8>>) -> StoreResult<()> {
        let bytes = encode_file(entries)?;
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir)?;

        let mut tmp = tempfile::NamedTempFile::new_in(&dir)?;
        tmp.write_all(&bytes)?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|e| StoreError::Io(e.error))?;

        debug!(path = %self.path.display(), keys = entries.len(), bytes = bytes.len(), "file store persisted");
        Ok(())
    }
}

fn encode_file(entries: &BTreeMap<String, Vec<u8>>) -> StoreResult<Vec<u8>> {
    let entries: BTreeMap<String, String> = entries
        .iter()
        .map(|(k, v)| (k.clone(), hex::encode(v)))
        .collect();
    let checksum = checksum(&entries)?;
    let file = StoreFile {
        version: FORMAT_VERSION,
        checksum,
        entries,
    };
    serde_json::to_vec_pretty(&file).map_err(|e| StoreError::Serialization(e.to_string()))
}

fn decode_file(path: &Path, bytes: &[u8]) -> StoreResult<BTreeMap<String, Vec<u8>>> {
    let corrupt = |reason: String| StoreError::Corrupt {
        path: path.to_path_buf(),
        reason,
    };

    let file: StoreFile =
        serde_json::from_slice(bytes).map_err(|e| corrupt(format!("unreadable: {e}")))?;
    if file.version != FORMAT_VERSION {
        return Err(corrupt(format!("unsupported format version {}", file.version)));
    }
    let expected = checksum(&file.entries)?;
    if expected != file.checksum {
        return Err(corrupt(format!(
            "checksum mismatch: expected {expected:#010x}, found {:#010x}",
            file.checksum
        )));
    }

    file.entries
        .into_iter()
        .map(|(k, v)| {
            let value = hex::decode(&v).map_err(|e| corrupt(format!("key {k:?}: {e}")))?;
            Ok((k, value))
        })
        .collect()
}

fn checksum(entries: &BTreeMap<String, String>) -> StoreResult<u32> {
    let canonical =
        serde_json::to_vec(entries).map_err(|e| StoreError::Serialization(e.to_string()))?;
    Ok(crc32fast::hash(&canonical))
}

impl KvStore for FileKvStore {
    fn get(&self, key: &str) -> StoreResult<Option<Vec<u8>>> {
        check_key(key)?;
        let map = self.entries.read().expect("lock poisoned");
        Ok(map.get(key).cloned())
    }

    fn put(&self, key: &str, value: &[u8]) -> StoreResult<()> {
        check_key(key)?;
        self.commit(|map| {
            map.insert(key.to_string(), value.to_vec());
        })
    }

    fn delete(&self, key: &str) -> StoreResult<()> {
        check_key(key)?;
        if !self.entries.read().expect("lock poisoned").contains_key(key) {
            return Ok(());
        }
        self.commit(|map| {
            map.remove(key);
        })
    }

    fn keys(&self) -> StoreResult<Vec<String>> {
        let map = self.entries.read().expect("lock poisoned");
        Ok(map.keys().cloned().collect())
    }
}

impl std::fmt::Debug for FileKvStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileKvStore")
            .field("path", &self.path)
            .finish()
    }
}
