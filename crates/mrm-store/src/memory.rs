use std::collections::BTreeMap;
use std::sync::RwLock;

use crate::error::StoreResult;
use crate::traits::{check_key, KvStore};

/// In-memory, `BTreeMap`-based key/value store.
///
/// Intended for tests and embedding. Values are cloned on read and write.
pub struct InMemoryKvStore {
    entries: RwLock<BTreeMap<String, Vec<u8>>>,
}

impl InMemoryKvStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(BTreeMap::new()),
        }
    }

    /// Number of keys currently stored.
    pub fn len(&self) -> usize {
        self.entries.read().expect("lock poisoned").len()
    }

    /// Returns `true` if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.read().expect("lock poisoned").is_empty()
    }

    /// Copy of the full contents, for assertions.
    pub fn snapshot(&self) -> BTreeMap<String, Vec<u8>> {
        self.entries.read().expect("lock poisoned").clone()
    }
}

impl Default for InMemoryKvStore {
    fn default() -> Self {
        Self::new()
    }
}

impl KvStore for InMemoryKvStore {
    fn get(&self, key: &str) -> StoreResult<Option<Vec<u8>>> {
        check_key(key)?;
        let map = self.entries.read().expect("lock poisoned");
        Ok(map.get(key).cloned())
    }

    fn put(&self, key: &str, value: &[u8]) -> StoreResult<()> {
        check_key(key)?;
        let mut map = self.entries.write().expect("lock poisoned");
        map.insert(key.to_string(), value.to_vec());
        Ok(())
    }

    fn delete(&self, key: &str) -> StoreResult<()> {
        check_key(key)?;
        let mut map = self.entries.write().expect("lock poisoned");
        map.remove(key);
        Ok(())
    }

    fn keys(&self) -> StoreResult<Vec<String>> {
        let map = self.entries.read().expect("lock poisoned");
        Ok(map.keys().cloned().collect())
    }
}

impl std::fmt::Debug for InMemoryKvStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryKvStore")
            .field("key_count", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;

    #[test]
    fn put_and_get() {
        let store = InMemoryKvStore::new();
        store.put("m1", b"hello").unwrap();
        assert_eq!(store.get("m1").unwrap().as_deref(), Some(&b"hello"[..]));
    }

    #[test]
    fn get_missing_returns_none() {
        let store = InMemoryKvStore::new();
        assert!(store.get("nope").unwrap().is_none());
    }

    #[test]
    fn put_overwrites() {
        let store = InMemoryKvStore::new();
        store.put("k", b"v1").unwrap();
        store.put("k", b"v2").unwrap();
        assert_eq!(store.get("k").unwrap().unwrap(), b"v2");
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn delete_present_and_missing() {
        let store = InMemoryKvStore::new();
        store.put("k", b"v").unwrap();
        store.delete("k").unwrap();
        assert!(store.get("k").unwrap().is_none());
        // Second delete is still fine.
        store.delete("k").unwrap();
        store.delete("never-written").unwrap();
    }

    #[test]
    fn empty_key_is_rejected() {
        let store = InMemoryKvStore::new();
        assert!(matches!(store.get(""), Err(StoreError::EmptyKey)));
        assert!(matches!(store.put("", b"x"), Err(StoreError::EmptyKey)));
        assert!(matches!(store.delete(""), Err(StoreError::EmptyKey)));
    }

    #[test]
    fn keys_are_sorted() {
        let store = InMemoryKvStore::new();
        store.put("b", b"").unwrap();
        store.put("_index", b"[]").unwrap();
        store.put("a", b"").unwrap();
        assert_eq!(store.keys().unwrap(), vec!["_index", "a", "b"]);
    }

    #[test]
    fn len_and_is_empty() {
        let store = InMemoryKvStore::default();
        assert!(store.is_empty());
        store.put("a", b"1").unwrap();
        assert!(!store.is_empty());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn concurrent_reads_are_safe() {
        use std::sync::Arc;
        use std::thread;

        let store = Arc::new(InMemoryKvStore::new());
        store.put("shared", b"data").unwrap();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = Arc::clone(&store);
                thread::spawn(move || {
                    assert_eq!(store.get("shared").unwrap().unwrap(), b"data");
                })
            })
            .collect();

        for h in handles {
            h.join().expect("thread should not panic");
        }
    }

    #[test]
    fn debug_format() {
        let store = InMemoryKvStore::new();
        store.put("x", b"1").unwrap();
        let debug = format!("{store:?}");
        assert!(debug.contains("InMemoryKvStore"));
        assert!(debug.contains("key_count"));
    }
}
