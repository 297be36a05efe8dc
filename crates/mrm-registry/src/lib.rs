//! Merchant record registry.
//!
//! Keeps merchant records on an external key/value store, one record per
//! merchant id, plus an index record listing every live id in creation
//! order. The index is what makes "list all merchants" possible on a store
//! that cannot be scanned.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use mrm_events::RecordingSink;
//! use mrm_registry::MerchantRegistry;
//! use mrm_store::InMemoryKvStore;
//!
//! let registry = MerchantRegistry::with_defaults(
//!     Arc::new(InMemoryKvStore::new()),
//!     Arc::new(RecordingSink::new()),
//! )
//! .unwrap();
//! let args = ["m1", "Acme", "logo.png", "retail", "10", "USD", "1.0", "2024-01-01"];
//! assert!(registry.invoke("createMerchant", &args).unwrap().is_completed());
//! assert_eq!(registry.list_all().unwrap().len(), 1);
//! ```

pub mod accessor;
pub mod collection;
pub mod config;
pub mod consistency;
pub mod dispatch;
pub mod error;
pub mod outcome;
pub mod registry;

pub use accessor::RecordAccessor;
pub use collection::{CollectionReader, MerchantListing};
pub use config::RegistryConfig;
pub use consistency::ConsistencyReport;
pub use dispatch::Function;
pub use error::{RegistryError, RegistryResult};
pub use outcome::{EntryPoint, Outcome, Rejection};
pub use registry::MerchantRegistry;

pub use mrm_types::{Merchant, MerchantFields, MerchantId};
