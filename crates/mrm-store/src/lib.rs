//! Key/value ledger backends for the merchant record manager.
//!
//! The registry is built on a flat key/value ledger that offers only point
//! access: get, put and delete by key. This crate defines that contract as
//! the [`KvStore`] trait and ships the backends the rest of the workspace
//! runs on.
//!
//! # Storage Backends
//!
//! - [`InMemoryKvStore`] -- `BTreeMap`-based store for tests and embedding
//! - [`FileKvStore`] -- checksummed JSON snapshot file, atomically replaced
//! - [`FaultyKvStore`] -- wrapper that injects failures on demand
//!
//! # Design Rules
//!
//! 1. Last write wins per key.
//! 2. Reading an absent key is `Ok(None)`; deleting one is `Ok(())`.
//! 3. The store never interprets values -- it is a pure key-value store.
//! 4. Key scans are optional; backends that cannot scan say so.
//! 5. All I/O errors are propagated, never silently ignored.

pub mod error;
pub mod fault;
pub mod file;
pub mod memory;
pub mod traits;

// Re-export primary types at crate root for ergonomic imports.
pub use error::{StoreError, StoreResult};
pub use fault::{Fault, FaultOp, FaultyKvStore};
pub use file::FileKvStore;
pub use memory::InMemoryKvStore;
pub use traits::KvStore;
