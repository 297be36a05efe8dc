use mrm_types::MerchantId;
use thiserror::Error;

/// Hard failures of a registry operation.
///
/// Expected conditions (bad arguments, duplicates, missing records) are not
/// errors; they come back as [`Rejection`](crate::Rejection)s.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("store error: {0}")]
    Store(#[from] mrm_store::StoreError),

    #[error("index error: {0}")]
    Index(#[from] mrm_index::IndexError),

    #[error("serialization error: {0}")]
    Serialization(String),

    /// A stored record could not be decoded, or names another merchant.
    #[error("corrupt record for {id}: {reason}")]
    CorruptRecord { id: MerchantId, reason: String },

    /// The index references a merchant whose record is gone.
    #[error("index references missing merchant {id}")]
    DanglingIndexEntry { id: MerchantId },

    #[error("configuration error: {0}")]
    Config(String),
}

pub type RegistryResult<T> = Result<T, RegistryError>;
