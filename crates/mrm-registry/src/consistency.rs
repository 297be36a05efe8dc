//! Index consistency checks and repair.
//!
//! The two-write mutation protocol can leave the store in one of two
//! partial states after a crash: a record the index does not list
//! (orphan), or an index entry whose record is gone (dangling). Duplicate
//! entries can appear when an append is replayed. All three are found
//! here; [`MerchantRegistry::reconcile`] rebuilds the index to remove them.

use std::collections::{BTreeSet, HashSet};

use mrm_events::Notification;
use mrm_types::MerchantId;
use serde::Serialize;
use tracing::{info, warn};

use crate::error::RegistryResult;
use crate::registry::MerchantRegistry;

/// Differences between the index and the records on the store.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ConsistencyReport {
    /// Number of index entries, duplicates included.
    pub indexed: usize,
    /// Number of readable merchant records on the store.
    pub records: usize,
    /// Records with no index entry, in key order.
    pub orphaned: Vec<MerchantId>,
    /// Index entries with no record, in index order.
    pub dangling: Vec<MerchantId>,
    /// Ids listed more than once, in order of their second appearance.
    pub duplicates: Vec<MerchantId>,
}

impl ConsistencyReport {
    /// Returns `true` if the index lists every record exactly once.
    pub fn is_consistent(&self) -> bool {
        self.orphaned.is_empty() && self.dangling.is_empty() && self.duplicates.is_empty()
    }
}

impl MerchantRegistry {
    /// Compare the index with the merchant records on the store.
    ///
    /// Needs a store that can enumerate its keys. Keys in the reserved
    /// namespace are skipped, as are records that do not decode.
    pub fn check_consistency(&self) -> RegistryResult<ConsistencyReport> {
        let (report, _) = self.scan()?;
        Ok(report)
    }

    /// Rebuild the index so that it lists every record exactly once.
    ///
    /// Surviving entries keep their order (first occurrence wins); orphans
    /// are appended in key order. Returns the report from before the
    /// rebuild. A consistent index is left untouched.
    pub fn reconcile(&self) -> RegistryResult<ConsistencyReport> {
        let result = self.scan().and_then(|(report, entries)| {
            if report.is_consistent() {
                return Ok(report);
            }
            let dangling: HashSet<&MerchantId> = report.dangling.iter().collect();
            let mut seen = HashSet::new();
            let mut rebuilt: Vec<MerchantId> = entries
                .into_iter()
                .filter(|id| !dangling.contains(id) && seen.insert(id.clone()))
                .collect();
            rebuilt.extend(report.orphaned.iter().cloned());
            self.index.replace(&rebuilt)?;
            info!(
                orphaned = report.orphaned.len(),
                dangling = report.dangling.len(),
                duplicates = report.duplicates.len(),
                len = rebuilt.len(),
                "merchant index rebuilt"
            );
            Ok(report)
        });
        let notification = match &result {
            Ok(_) => Notification::success("Merchant index reconciled successfully"),
            Err(e) => Notification::failure(e.to_string()),
        };
        self.notify(&notification);
        result
    }

    /// Build the report, also handing back the raw index entries.
    fn scan(&self) -> RegistryResult<(ConsistencyReport, Vec<MerchantId>)> {
        let entries = self.index.entries()?;

        let mut live = BTreeSet::new();
        for key in self.store.keys()? {
            let Ok(id) = MerchantId::parse(key.as_str()) else {
                continue;
            };
            match self.records.resolve(&id)? {
                Some(_) => {
                    live.insert(id);
                }
                None => warn!(key = %key, "skipping unreadable merchant record"),
            }
        }

        let mut seen = HashSet::new();
        let mut report = ConsistencyReport {
            indexed: entries.len(),
            records: live.len(),
            ..Default::default()
        };
        for id in &entries {
            if !seen.insert(id) {
                report.duplicates.push(id.clone());
            } else if !live.contains(id) {
                report.dangling.push(id.clone());
            }
        }
        report.orphaned = live.into_iter().filter(|id| !seen.contains(id)).collect();
        Ok((report, entries))
    }
}
