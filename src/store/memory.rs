use chrono::{DateTime, Utc};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use super::{RateLimitStore, Update};
use crate::error::StoreError;
use crate::models::RateLimitRecord;

// Process-local store. The entry API holds the shard write lock while the
// update closure runs, which makes each update atomic per key.
#[derive(Default)]
pub struct MemoryStore {
    records: DashMap<(String, String), RateLimitRecord>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RateLimitStore for MemoryStore {
    fn purge_before(&self, cutoff: DateTime<Utc>) -> Result<usize, StoreError> {
        let mut purged = 0;
        self.records.retain(|_, record| {
            let keep = record.window_start >= cutoff;
            if !keep {
                purged += 1;
            }
            keep
        });
        Ok(purged)
    }

    fn update(&self, identity: &str, endpoint: &str, apply: Update<'_>) -> Result<(), StoreError> {
        match self.records.entry((identity.to_string(), endpoint.to_string())) {
            Entry::Occupied(mut entry) => {
                if let Some(next) = apply(Some(entry.get())) {
                    entry.insert(next);
                }
            }
            Entry::Vacant(entry) => {
                if let Some(next) = apply(None) {
                    entry.insert(next);
                }
            }
        }
        Ok(())
    }

    fn get(&self, identity: &str, endpoint: &str) -> Result<Option<RateLimitRecord>, StoreError> {
        Ok(self
            .records
            .get(&(identity.to_string(), endpoint.to_string()))
            .map(|r| r.value().clone()))
    }

    fn count(&self) -> Result<usize, StoreError> {
        Ok(self.records.len())
    }
}
