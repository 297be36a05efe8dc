//! The index maintainer.

use std::sync::Arc;

use mrm_store::KvStore;
use mrm_types::MerchantId;
use tracing::debug;

use crate::codec::{decode_index_or_default, encode_index};
use crate::error::{IndexError, IndexResult};

/// Owner of the index record: the ordered sequence of live merchant ids.
///
/// Order is insertion order. Appends are unconditional and removals take out
/// the first exact match only, so the index holds exactly what the callers
/// told it; uniqueness is the caller's guard, not the index's.
pub struct MerchantIndex {
    store: Arc<dyn KvStore>,
    key: String,
}

impl std::fmt::Debug for MerchantIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MerchantIndex")
            .field("key", &self.key)
            .finish()
    }
}

impl MerchantIndex {
    /// Create an index stored under `key`.
    ///
    /// The key must not be a possible merchant id, otherwise a merchant
    /// record could overwrite the index.
    pub fn new(store: Arc<dyn KvStore>, key: impl Into<String>) -> IndexResult<Self> {
        let key = key.into();
        if key.is_empty() || MerchantId::is_merchant_key(&key) {
            return Err(IndexError::InvalidKey {
                reason: "index key must start with the reserved prefix".into(),
                key,
            });
        }
        Ok(Self { store, key })
    }

    /// The store key holding the index record.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Current index contents, in order.
    pub fn entries(&self) -> IndexResult<Vec<MerchantId>> {
        let bytes = self.store.get(&self.key)?;
        Ok(decode_index_or_default(bytes.as_deref()))
    }

    /// Overwrite the index with an empty sequence.
    pub fn reset(&self) -> IndexResult<()> {
        self.write(&[])?;
        debug!(key = %self.key, "merchant index reset");
        Ok(())
    }

    /// Append `id` at the end of the index.
    pub fn append(&self, id: &MerchantId) -> IndexResult<()> {
        let mut ids = self.entries()?;
        ids.push(id.clone());
        self.write(&ids)?;
        debug!(merchant_id = %id, len = ids.len(), "appended to merchant index");
        Ok(())
    }

    /// Remove the first entry equal to `id`, preserving the order of the
    /// rest. The index is rewritten even when `id` is absent.
    ///
    /// Returns `true` if an entry was removed.
    pub fn remove(&self, id: &MerchantId) -> IndexResult<bool> {
        let mut ids = self.entries()?;
        let position = ids.iter().position(|existing| existing == id);
        if let Some(i) = position {
            ids.remove(i);
        }
        self.write(&ids)?;
        debug!(merchant_id = %id, removed = position.is_some(), len = ids.len(), "removed from merchant index");
        Ok(position.is_some())
    }

    /// Replace the whole index with `ids`.
    pub fn replace(&self, ids: &[MerchantId]) -> IndexResult<()> {
        self.write(ids)?;
        debug!(key = %self.key, len = ids.len(), "merchant index replaced");
        Ok(())
    }

    fn write(&self, ids: &[MerchantId]) -> IndexResult<()> {
        let bytes = encode_index(ids)?;
        self.store.put(&self.key, &bytes)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mrm_store::{Fault, FaultOp, FaultyKvStore, InMemoryKvStore, StoreError};
    use proptest::prelude::*;

    const KEY: &str = "_Merchantindex";

    fn id(s: &str) -> MerchantId {
        MerchantId::parse(s).unwrap()
    }

    fn ids(raw: &[&str]) -> Vec<MerchantId> {
        raw.iter().map(|s| id(s)).collect()
    }

    fn new_index() -> (Arc<InMemoryKvStore>, MerchantIndex) {
        let store = Arc::new(InMemoryKvStore::new());
        let index = MerchantIndex::new(store.clone(), KEY).unwrap();
        (store, index)
    }

    #[test]
    fn rejects_keys_a_merchant_could_use() {
        let store: Arc<dyn KvStore> = Arc::new(InMemoryKvStore::new());
        assert!(MerchantIndex::new(store.clone(), "index").is_err());
        assert!(MerchantIndex::new(store.clone(), "").is_err());
        assert!(MerchantIndex::new(store, "_idx").is_ok());
    }

    #[test]
    fn missing_index_reads_as_empty() {
        let (_store, index) = new_index();
        assert!(index.entries().unwrap().is_empty());
    }

    #[test]
    fn reset_writes_empty_array() {
        let (store, index) = new_index();
        index.append(&id("m1")).unwrap();
        index.reset().unwrap();
        assert_eq!(store.get(KEY).unwrap().unwrap(), b"[]");
        assert!(index.entries().unwrap().is_empty());
    }

    #[test]
    fn append_keeps_insertion_order() {
        let (_store, index) = new_index();
        for m in ["m3", "m1", "m2"] {
            index.append(&id(m)).unwrap();
        }
        assert_eq!(index.entries().unwrap(), ids(&["m3", "m1", "m2"]));
    }

    #[test]
    fn append_does_not_deduplicate() {
        let (_store, index) = new_index();
        index.append(&id("m1")).unwrap();
        index.append(&id("m1")).unwrap();
        assert_eq!(index.entries().unwrap(), ids(&["m1", "m1"]));
    }

    #[test]
    fn remove_takes_first_match_and_preserves_order() {
        let (_store, index) = new_index();
        index.replace(&ids(&["m1", "m2", "m3", "m2"])).unwrap();
        assert!(index.remove(&id("m2")).unwrap());
        assert_eq!(index.entries().unwrap(), ids(&["m1", "m3", "m2"]));
    }

    #[test]
    fn remove_absent_is_a_noop_but_still_writes() {
        let (store, index) = new_index();
        assert!(!index.remove(&id("ghost")).unwrap());
        // Written even though nothing changed.
        assert_eq!(store.get(KEY).unwrap().unwrap(), b"[]");
    }

    #[test]
    fn corrupt_index_is_overwritten_by_next_append() {
        let (store, index) = new_index();
        store.put(KEY, b"garbage").unwrap();
        assert!(index.entries().unwrap().is_empty());
        index.append(&id("m9")).unwrap();
        assert_eq!(index.entries().unwrap(), ids(&["m9"]));
    }

    #[test]
    fn append_keeps_valid_entries_around_invalid_ones() {
        let (store, index) = new_index();
        store.put(KEY, br#"["m1","_legacy","m2"]"#).unwrap();
        index.append(&id("m3")).unwrap();
        assert_eq!(index.entries().unwrap(), ids(&["m1", "m2", "m3"]));
    }

    #[test]
    fn store_failures_propagate() {
        let store = Arc::new(FaultyKvStore::new(InMemoryKvStore::new()));
        let index = MerchantIndex::new(store.clone(), KEY).unwrap();

        store.arm(Fault::on(FaultOp::Get));
        assert!(matches!(
            index.append(&id("m1")),
            Err(IndexError::Store(StoreError::Injected { .. }))
        ));

        store.arm(Fault::on(FaultOp::Put));
        assert!(index.remove(&id("m1")).is_err());
        assert!(store.inner().get(KEY).unwrap().is_none());
    }

    proptest! {
        #[test]
        fn append_then_remove_restores_previous_contents(
            existing in proptest::collection::vec("[a-z][a-z0-9]{0,4}", 0..8),
            extra in "[a-z][a-z0-9]{0,4}",
        ) {
            let (_store, index) = new_index();
            let before: Vec<MerchantId> = existing.iter().map(|s| id(s)).collect();
            index.replace(&before).unwrap();

            // Only the appended copy is taken back out when `extra` is new.
            prop_assume!(!existing.contains(&extra));
            index.append(&id(&extra)).unwrap();
            prop_assert!(index.remove(&id(&extra)).unwrap());
            prop_assert_eq!(index.entries().unwrap(), before);
        }
    }
}
