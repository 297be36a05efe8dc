//! Encoding of the index record.
//!
//! The record is a JSON array of merchant ids. `null` is accepted as an
//! empty array; older deployments initialized the index that way. Older
//! deployments also had no reserved-key rule, so a readable array may hold
//! entries that are not valid merchant ids; those entries are dropped on
//! decode and the rest of the index is kept.

use mrm_types::MerchantId;
use tracing::warn;

use crate::error::{IndexError, IndexResult};

/// Encode the id sequence for storage.
pub fn encode_index(ids: &[MerchantId]) -> IndexResult<Vec<u8>> {
    serde_json::to_vec(ids).map_err(|e| IndexError::Serialization(e.to_string()))
}

/// Decode a stored index record.
///
/// Fails only when the blob is not a JSON array of strings (or `null`).
/// Elements that are not valid merchant ids are logged and skipped.
pub fn decode_index(bytes: &[u8]) -> IndexResult<Vec<MerchantId>> {
    let raw: Option<Vec<String>> =
        serde_json::from_slice(bytes).map_err(|e| IndexError::Serialization(e.to_string()))?;
    let ids = raw
        .unwrap_or_default()
        .into_iter()
        .enumerate()
        .filter_map(|(position, entry)| match MerchantId::parse(entry) {
            Ok(id) => Some(id),
            Err(e) => {
                warn!(position, error = %e, "skipping invalid merchant index entry");
                None
            }
        })
        .collect();
    Ok(ids)
}

/// Decode a stored index record, treating "absent" and "unreadable" alike
/// as the empty index.
///
/// This is the policy every index mutation runs under. A corrupt index is
/// logged and then silently replaced by whatever the mutation writes next.
pub fn decode_index_or_default(bytes: Option<&[u8]>) -> Vec<MerchantId> {
    let Some(bytes) = bytes else {
        return Vec::new();
    };
    match decode_index(bytes) {
        Ok(ids) => ids,
        Err(e) => {
            warn!(error = %e, len = bytes.len(), "unreadable merchant index; treating as empty");
            Vec::new()
        }
    }
}
