//! Foundation types for the merchant record manager (MRM).
//!
//! Every other MRM crate depends on `mrm-types`. It defines what a merchant
//! record looks like on the ledger and which keys a merchant may occupy.
//!
//! # Key Types
//!
//! - [`MerchantId`]: Validated merchant identifier, also the record's store key
//! - [`Merchant`]: The stored record: identity plus mutable payload
//! - [`MerchantFields`]: The mutable payload on its own (used by updates)
//!
//! Keys beginning with [`RESERVED_PREFIX`] belong to the registry itself
//! (index record, init marker) and are never valid merchant identifiers.

pub mod error;
pub mod identity;
pub mod merchant;

pub use error::TypeError;
pub use identity::{MerchantId, RESERVED_PREFIX};
pub use merchant::{Merchant, MerchantFields, MERCHANT_ARG_COUNT};
