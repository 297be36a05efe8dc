//! Typed access to merchant records on the store.

use std::sync::Arc;

use mrm_store::KvStore;
use mrm_types::{Merchant, MerchantId};
use tracing::{debug, warn};

use crate::error::{RegistryError, RegistryResult};

/// Reads and writes individual merchant records, keyed by their id.
#[derive(Clone)]
pub struct RecordAccessor {
    store: Arc<dyn KvStore>,
}

impl std::fmt::Debug for RecordAccessor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordAccessor").finish_non_exhaustive()
    }
}

impl RecordAccessor {
    pub fn new(store: Arc<dyn KvStore>) -> Self {
        Self { store }
    }

    /// Raw bytes stored under `id`.
    pub fn get_raw(&self, id: &MerchantId) -> RegistryResult<Option<Vec<u8>>> {
        Ok(self.store.get(id.as_str())?)
    }

    /// Load the record under `id`.
    ///
    /// Bytes that do not decode to a merchant, or decode to a different
    /// merchant, are reported as [`RegistryError::CorruptRecord`].
    pub fn get(&self, id: &MerchantId) -> RegistryResult<Option<Merchant>> {
        let Some(bytes) = self.get_raw(id)? else {
            return Ok(None);
        };
        let merchant = Merchant::from_bytes(&bytes).map_err(|e| RegistryError::CorruptRecord {
            id: id.clone(),
            reason: e.to_string(),
        })?;
        if merchant.id != *id {
            return Err(RegistryError::CorruptRecord {
                id: id.clone(),
                reason: format!("record names merchant {}", merchant.id),
            });
        }
        Ok(Some(merchant))
    }

    /// Load the record under `id`, treating anything unreadable as absent.
    ///
    /// Used by the create and update guards, where a garbled record is no
    /// better than a missing one.
    pub fn resolve(&self, id: &MerchantId) -> RegistryResult<Option<Merchant>> {
        match self.get(id) {
            Ok(found) => Ok(found),
            Err(RegistryError::CorruptRecord { id, reason }) => {
                warn!(merchant_id = %id, %reason, "unreadable merchant record treated as absent");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Write `merchant` under its own id, replacing any previous record.
    pub fn put(&self, merchant: &Merchant) -> RegistryResult<()> {
        let bytes = merchant
            .to_bytes()
            .map_err(|e| RegistryError::Serialization(e.to_string()))?;
        self.store.put(merchant.id.as_str(), &bytes)?;
        debug!(merchant_id = %merchant.id, bytes = bytes.len(), "merchant record written");
        Ok(())
    }

    /// Remove the record under `id`. Removing an absent record succeeds.
    pub fn delete(&self, id: &MerchantId) -> RegistryResult<()> {
        self.store.delete(id.as_str())?;
        debug!(merchant_id = %id, "merchant record deleted");
        Ok(())
    }
}
