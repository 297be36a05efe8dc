use thiserror::Error;

/// Errors produced by type operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid merchant id {id:?}: {reason}")]
    InvalidMerchantId { id: String, reason: String },

    #[error("wrong field count: expected {expected}, got {actual}")]
    FieldCount { expected: usize, actual: usize },

    #[error("serialization error: {0}")]
    Serialization(String),
}
