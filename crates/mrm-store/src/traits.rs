use crate::error::{StoreError, StoreResult};

/// Point-access key/value ledger.
///
/// This is the whole contract the merchant registry relies on. Implementations
/// must satisfy:
/// - Last write wins per key; a completed `put` is visible to the next `get`.
/// - `get` of an absent key is `Ok(None)`, never an error.
/// - `delete` of an absent key succeeds.
/// - All backend failures are propagated, never silently ignored.
pub trait KvStore: Send + Sync {
    /// Read the value stored under `key`.
    fn get(&self, key: &str) -> StoreResult<Option<Vec<u8>>>;

    /// Write (create or overwrite) the value under `key`.
    fn put(&self, key: &str, value: &[u8]) -> StoreResult<()>;

    /// Remove `key`. Absent keys are not an error.
    fn delete(&self, key: &str) -> StoreResult<()>;

    /// List every key, sorted.
    ///
    /// Ledgers only guarantee point access, so the default refuses. Backends
    /// that can scan override this; reconciliation depends on it.
    fn keys(&self) -> StoreResult<Vec<String>> {
        Err(StoreError::ScanUnsupported)
    }
}

pub(crate) fn check_key(key: &str) -> StoreResult<()> {
    if key.is_empty() {
        return Err(StoreError::EmptyKey);
    }
    Ok(())
}
