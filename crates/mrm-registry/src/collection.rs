//! Ordered listing of every indexed merchant.

use std::collections::HashSet;

use mrm_index::MerchantIndex;
use mrm_types::{Merchant, MerchantId};
use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::accessor::RecordAccessor;
use crate::error::{RegistryError, RegistryResult};

/// Every indexed merchant, in index order.
///
/// Serializes as a JSON object keyed by merchant id, with keys in index
/// order. An id that appears twice in the index is listed once, at its
/// first position.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MerchantListing {
    merchants: Vec<Merchant>,
}

impl MerchantListing {
    pub fn len(&self) -> usize {
        self.merchants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.merchants.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = &MerchantId> {
        self.merchants.iter().map(|m| &m.id)
    }

    pub fn get(&self, id: &str) -> Option<&Merchant> {
        self.merchants.iter().find(|m| m.id == id)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Merchant> {
        self.merchants.iter()
    }

    pub fn to_bytes(&self) -> RegistryResult<Vec<u8>> {
        serde_json::to_vec(self).map_err(|e| RegistryError::Serialization(e.to_string()))
    }
}

impl Serialize for MerchantListing {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.merchants.len()))?;
        for merchant in &self.merchants {
            map.serialize_entry(merchant.id.as_str(), merchant)?;
        }
        map.end()
    }
}

impl<'a> IntoIterator for &'a MerchantListing {
    type Item = &'a Merchant;
    type IntoIter = std::slice::Iter<'a, Merchant>;

    fn into_iter(self) -> Self::IntoIter {
        self.merchants.iter()
    }
}

/// Resolves the index into full records.
pub struct CollectionReader<'a> {
    index: &'a MerchantIndex,
    records: &'a RecordAccessor,
}

impl<'a> CollectionReader<'a> {
    pub fn new(index: &'a MerchantIndex, records: &'a RecordAccessor) -> Self {
        Self { index, records }
    }

    /// Load every indexed merchant in index order.
    ///
    /// Fails with [`RegistryError::DanglingIndexEntry`] as soon as an entry
    /// has no record, and with [`RegistryError::CorruptRecord`] when one
    /// cannot be decoded.
    pub fn list_all(&self) -> RegistryResult<MerchantListing> {
        let ids = self.index.entries()?;
        let mut seen = HashSet::with_capacity(ids.len());
        let mut merchants = Vec::with_capacity(ids.len());
        for id in ids {
            if !seen.insert(id.clone()) {
                continue;
            }
            match self.records.get(&id)? {
                Some(merchant) => merchants.push(merchant),
                None => return Err(RegistryError::DanglingIndexEntry { id }),
            }
        }
        Ok(MerchantListing { merchants })
    }
}
