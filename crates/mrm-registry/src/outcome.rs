use std::fmt;

use mrm_types::{MerchantId, TypeError};

use crate::error::RegistryError;

/// Which positional entry point a call arrived through.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EntryPoint {
    Invoke,
    Query,
}

impl fmt::Display for EntryPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Invoke => write!(f, "invocation"),
            Self::Query => write!(f, "query"),
        }
    }
}

/// Why an operation declined to run. Never a fault: nothing was written.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Rejection {
    WrongArgumentCount { expected: usize, actual: usize },
    InvalidMerchantId { id: String, reason: String },
    AlreadyExists { id: MerchantId },
    NotFound { id: MerchantId },
    UnknownFunction { name: String, entry: EntryPoint },
}

impl Rejection {
    /// The merchant the rejection concerns, when one is known.
    pub fn merchant_id(&self) -> Option<&MerchantId> {
        match self {
            Self::AlreadyExists { id } | Self::NotFound { id } => Some(id),
            _ => None,
        }
    }
}

/// Argument errors become rejections; a serialization failure is a hard
/// error and is handed back unchanged as one.
impl TryFrom<TypeError> for Rejection {
    type Error = RegistryError;

    fn try_from(err: TypeError) -> Result<Self, Self::Error> {
        match err {
            TypeError::InvalidMerchantId { id, reason } => Ok(Self::InvalidMerchantId { id, reason }),
            TypeError::FieldCount { expected, actual } => {
                Ok(Self::WrongArgumentCount { expected, actual })
            }
            TypeError::Serialization(reason) => Err(RegistryError::Serialization(reason)),
        }
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WrongArgumentCount { expected, actual } => write!(
                f,
                "Incorrect number of arguments. Expecting {expected}, got {actual}"
            ),
            Self::InvalidMerchantId { id, reason } => {
                write!(f, "Invalid merchantId {id:?}: {reason}")
            }
            Self::AlreadyExists { id } => write!(f, "This Merchant already exists: {id}"),
            Self::NotFound { id } => write!(f, "{id} not Found."),
            Self::UnknownFunction { entry, .. } => {
                write!(f, "Received unknown function {entry}")
            }
        }
    }
}

/// Result of an operation that ran to a decision.
///
/// Store and codec faults travel in the surrounding `Result`; this type
/// only separates "done" from "declined".
#[must_use]
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome<T> {
    Completed(T),
    Rejected(Rejection),
}

impl<T> Outcome<T> {
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed(_))
    }

    pub fn is_rejected(&self) -> bool {
        matches!(self, Self::Rejected(_))
    }

    /// The completed value, discarding any rejection.
    pub fn completed(self) -> Option<T> {
        match self {
            Self::Completed(value) => Some(value),
            Self::Rejected(_) => None,
        }
    }

    pub fn rejection(&self) -> Option<&Rejection> {
        match self {
            Self::Completed(_) => None,
            Self::Rejected(rejection) => Some(rejection),
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        match self {
            Self::Completed(value) => Outcome::Completed(f(value)),
            Self::Rejected(rejection) => Outcome::Rejected(rejection),
        }
    }
}
