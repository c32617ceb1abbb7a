// rate limit record storage, one record per (identity, endpoint)

mod memory;
mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use chrono::{DateTime, Utc};

use crate::error::StoreError;
use crate::models::RateLimitRecord;

// Closure run under the per-key lock. Returning `Some` writes the record,
// `None` leaves the store untouched.
pub type Update<'a> = &'a mut dyn FnMut(Option<&RateLimitRecord>) -> Option<RateLimitRecord>;

pub trait RateLimitStore: Send + Sync {
    // Deletes every record whose window started strictly before `cutoff`.
    fn purge_before(&self, cutoff: DateTime<Utc>) -> Result<usize, StoreError>;

    // Atomically reads the record for the key and applies `apply`.
    fn update(&self, identity: &str, endpoint: &str, apply: Update<'_>) -> Result<(), StoreError>;

    fn get(&self, identity: &str, endpoint: &str) -> Result<Option<RateLimitRecord>, StoreError>;

    fn count(&self) -> Result<usize, StoreError>;
}
