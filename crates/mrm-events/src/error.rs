/// Errors produced by the notification channel.
#[derive(Debug, thiserror::Error)]
pub enum EventError {
    /// Serialization or deserialization failure.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Event names must be non-empty.
    #[error("event name must not be empty")]
    EmptyName,

    /// The sink can no longer accept events.
    #[error("event sink is closed")]
    Closed,

    /// A code outside the known status set.
    #[error("unknown status code {0}")]
    UnknownStatus(u16),
}

/// Convenience alias used throughout the events crate.
pub type Result<T> = std::result::Result<T, EventError>;
