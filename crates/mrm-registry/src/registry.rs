//! The merchant registry facade.

use std::sync::Arc;

use mrm_events::{EventSink, Notification};
use mrm_index::MerchantIndex;
use mrm_store::KvStore;
use mrm_types::{Merchant, MerchantFields, MerchantId};
use tracing::{debug, info, warn};

use crate::accessor::RecordAccessor;
use crate::collection::{CollectionReader, MerchantListing};
use crate::config::RegistryConfig;
use crate::error::RegistryResult;
use crate::outcome::{Outcome, Rejection};

/// Merchant record manager over a key/value store.
///
/// Each merchant lives under its own id; a separate index record lists the
/// live ids in creation order. Every mutation writes the merchant record
/// first and the index second, so a failure between the two leaves either
/// an unindexed record (create) or an index entry without a record
/// (delete). [`check_consistency`](Self::check_consistency) and
/// [`reconcile`](Self::reconcile) find and repair both.
///
/// Every operation also publishes a [`Notification`] through the event
/// sink. Sink failures are logged and otherwise ignored.
pub struct MerchantRegistry {
    pub(crate) store: Arc<dyn KvStore>,
    pub(crate) records: RecordAccessor,
    pub(crate) index: MerchantIndex,
    events: Arc<dyn EventSink>,
    config: RegistryConfig,
}

impl std::fmt::Debug for MerchantRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MerchantRegistry")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl MerchantRegistry {
    /// Build a registry after validating `config`.
    pub fn new(
        store: Arc<dyn KvStore>,
        events: Arc<dyn EventSink>,
        config: RegistryConfig,
    ) -> RegistryResult<Self> {
        config.validate()?;
        let index = MerchantIndex::new(store.clone(), config.index_key.clone())?;
        Ok(Self {
            records: RecordAccessor::new(store.clone()),
            index,
            store,
            events,
            config,
        })
    }

    /// Build a registry with [`RegistryConfig::default`].
    pub fn with_defaults(
        store: Arc<dyn KvStore>,
        events: Arc<dyn EventSink>,
    ) -> RegistryResult<Self> {
        Self::new(store, events, RegistryConfig::default())
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// The merchant index this registry maintains.
    pub fn index(&self) -> &MerchantIndex {
        &self.index
    }

    /// Record a deployment message and reset the index to empty.
    ///
    /// Existing merchant records are left in place; after a re-init they are
    /// orphans until [`reconcile`](Self::reconcile) re-indexes them.
    pub fn initialize(&self, message: &str) -> RegistryResult<Outcome<()>> {
        let result = self.write_init(message);
        self.report(result, None, "Merchant registry initialized successfully.")
    }

    /// Create `merchant` unless a readable record with its id already exists.
    pub fn create(&self, merchant: Merchant) -> RegistryResult<Outcome<()>> {
        let id = merchant.id.clone();
        let result = self.insert(merchant);
        self.report(result, Some(&id), "Merchant created successfully")
    }

    /// Replace the payload of an existing merchant. The id and its index
    /// position never change.
    pub fn update(&self, id: &MerchantId, fields: MerchantFields) -> RegistryResult<Outcome<()>> {
        let result = self.replace_fields(id, fields);
        self.report(result, Some(id), "Merchant updated successfully")
    }

    /// Delete the record under `id` and its first index entry.
    ///
    /// Deleting an unknown id is not an error: the record delete is a no-op
    /// and the index is rewritten unchanged.
    pub fn delete(&self, id: &MerchantId) -> RegistryResult<Outcome<()>> {
        let result = self.remove(id);
        self.report(result, Some(id), "Merchant deleted successfully")
    }

    /// Fetch the record under `id`.
    pub fn get(&self, id: &MerchantId) -> RegistryResult<Outcome<Merchant>> {
        let result = match self.records.get(id) {
            Ok(Some(merchant)) => Ok(Outcome::Completed(merchant)),
            Ok(None) => Ok(Outcome::Rejected(Rejection::NotFound { id: id.clone() })),
            Err(e) => Err(e),
        };
        self.report(result, Some(id), "Merchant retrieved successfully")
    }

    /// Every indexed merchant, in index order.
    pub fn list_all(&self) -> RegistryResult<MerchantListing> {
        let result = CollectionReader::new(&self.index, &self.records)
            .list_all()
            .map(Outcome::Completed);
        self.report(result, None, "Merchants retrieved successfully")
            .map(|outcome| outcome.completed().unwrap_or_default())
    }

    fn write_init(&self, message: &str) -> RegistryResult<Outcome<()>> {
        self.store.put(&self.config.init_key, message.as_bytes())?;
        self.index.reset()?;
        info!(init_key = %self.config.init_key, "merchant registry initialized");
        Ok(Outcome::Completed(()))
    }

    fn insert(&self, merchant: Merchant) -> RegistryResult<Outcome<()>> {
        if self.records.resolve(&merchant.id)?.is_some() {
            return Ok(Outcome::Rejected(Rejection::AlreadyExists { id: merchant.id }));
        }
        self.records.put(&merchant)?;
        self.index.append(&merchant.id)?;
        info!(merchant_id = %merchant.id, "merchant created");
        Ok(Outcome::Completed(()))
    }

    fn replace_fields(
        &self,
        id: &MerchantId,
        fields: MerchantFields,
    ) -> RegistryResult<Outcome<()>> {
        let Some(mut merchant) = self.records.resolve(id)? else {
            return Ok(Outcome::Rejected(Rejection::NotFound { id: id.clone() }));
        };
        merchant.apply(fields);
        self.records.put(&merchant)?;
        info!(merchant_id = %id, "merchant updated");
        Ok(Outcome::Completed(()))
    }

    fn remove(&self, id: &MerchantId) -> RegistryResult<Outcome<()>> {
        self.records.delete(id)?;
        let removed = self.index.remove(id)?;
        info!(merchant_id = %id, indexed = removed, "merchant deleted");
        Ok(Outcome::Completed(()))
    }

    /// Publish the notification matching `result` and hand it back.
    pub(crate) fn report<T>(
        &self,
        result: RegistryResult<Outcome<T>>,
        id: Option<&MerchantId>,
        success: &str,
    ) -> RegistryResult<Outcome<T>> {
        let notification = match &result {
            Ok(Outcome::Completed(_)) => Notification::success(success),
            Ok(Outcome::Rejected(rejection)) => {
                debug!(%rejection, "operation rejected");
                Notification::failure(rejection.to_string())
            }
            Err(e) => {
                warn!(error = %e, "operation failed");
                Notification::failure(e.to_string())
            }
        };
        let notification = match id {
            Some(id) => notification.for_merchant(id.as_str()),
            None => notification,
        };
        self.notify(&notification);
        result
    }

    /// Send `notification` on the success or error channel. Never fails.
    pub(crate) fn notify(&self, notification: &Notification) {
        let name = if notification.is_success() {
            &self.config.success_event
        } else {
            &self.config.error_event
        };
        let sent = notification
            .to_bytes()
            .map_err(|e| e.to_string())
            .and_then(|payload| {
                self.events
                    .set_event(name, &payload)
                    .map_err(|e| e.to_string())
            });
        if let Err(error) = sent {
            warn!(event = %name, %error, "failed to publish notification");
        }
    }
}
