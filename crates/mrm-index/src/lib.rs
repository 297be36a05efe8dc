//! Merchant index for the merchant record manager.
//!
//! The ledger underneath the registry has no iteration and no secondary
//! indexes, so "list all merchants" is served from a single denormalized
//! record: an ordered JSON array of every live merchant id, stored under a
//! reserved key. [`MerchantIndex`] owns that record. Callers never touch the
//! raw blob; every change is a full read, decode, mutate, encode, write
//! cycle.
//!
//! # Key Types
//!
//! - [`MerchantIndex`] -- append / remove / list over the index record
//! - [`decode_index_or_default`] -- the forgiving decode policy: an absent or
//!   unreadable index is an empty index
//!
//! The index is not written atomically with the records it describes. See
//! the registry crate for the ordering rules and the consistency check.

pub mod codec;
pub mod error;
pub mod index;

pub use codec::{decode_index, decode_index_or_default, encode_index};
pub use error::{IndexError, IndexResult};
pub use index::MerchantIndex;
