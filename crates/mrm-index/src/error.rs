//! Error types for the index crate.

/// Errors that can occur during index operations.
#[derive(Debug, thiserror::Error)]
pub enum IndexError {
    /// The index key could collide with a merchant record.
    #[error("invalid index key {key:?}: {reason}")]
    InvalidKey { key: String, reason: String },

    /// Store operation failed.
    #[error("store error: {0}")]
    Store(#[from] mrm_store::StoreError),

    /// Serialization or deserialization error.
    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Convenience alias for index results.
pub type IndexResult<T> = Result<T, IndexError>;
