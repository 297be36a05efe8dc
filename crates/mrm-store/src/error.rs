use std::path::PathBuf;

/// Errors from key/value store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Keys must be non-empty.
    #[error("store key must not be empty")]
    EmptyKey,

    /// Serialization or deserialization failure.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// I/O error from the underlying storage backend.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The backing file exists but cannot be trusted.
    #[error("corrupt store file {path}: {reason}")]
    Corrupt { path: PathBuf, reason: String },

    /// The backend cannot enumerate its keys.
    #[error("store does not support key scans")]
    ScanUnsupported,

    /// A failure injected by [`FaultyKvStore`](crate::FaultyKvStore).
    #[error("injected {op} failure for key {key:?}")]
    Injected { op: String, key: String },
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
