use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;

use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, TransactionBehavior, params};

use super::{RateLimitStore, Update};
use crate::error::StoreError;
use crate::models::RateLimitRecord;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS rate_limits (
    identity        TEXT    NOT NULL,
    endpoint        TEXT    NOT NULL,
    request_count   INTEGER NOT NULL CHECK (request_count >= 1),
    window_start    INTEGER NOT NULL,
    last_request_at INTEGER NOT NULL,
    PRIMARY KEY (identity, endpoint)
);
CREATE INDEX IF NOT EXISTS rate_limits_window_start ON rate_limits (window_start);
";

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

// Rate limit table in a SQLite database.
//
// Several processes may share one database file. Updates run in a
// `BEGIN IMMEDIATE` transaction, so the write lock is taken before the
// record is read and concurrent writers queue behind it. Timestamps are
// stored as Unix milliseconds.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        conn.pragma_update_and_check(None, "journal_mode", "WAL", |_| Ok(()))?;
        Self::init(conn)
    }

    #[cfg(test)]
    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self, StoreError> {
        conn.busy_timeout(BUSY_TIMEOUT)?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn: Mutex::new(conn) })
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>, StoreError> {
        self.conn.lock().map_err(|_| StoreError::Poisoned)
    }
}

fn from_millis(ms: i64) -> Result<DateTime<Utc>, StoreError> {
    DateTime::from_timestamp_millis(ms).ok_or_else(|| StoreError::Corrupt(format!("timestamp {ms} out of range")))
}

fn read_record(
    conn: &Connection,
    identity: &str,
    endpoint: &str,
) -> Result<Option<RateLimitRecord>, StoreError> {
    let row = conn
        .query_row(
            "SELECT request_count, window_start, last_request_at
             FROM rate_limits WHERE identity = ?1 AND endpoint = ?2",
            params![identity, endpoint],
            |row| Ok((row.get::<_, i64>(0)?, row.get::<_, i64>(1)?, row.get::<_, i64>(2)?)),
        )
        .optional()?;

    let Some((count, window_start, last_request_at)) = row else {
        return Ok(None);
    };
    let request_count = u32::try_from(count)
        .map_err(|_| StoreError::Corrupt(format!("request_count {count} for {identity}/{endpoint}")))?;

    Ok(Some(RateLimitRecord {
        identity: identity.to_string(),
        endpoint: endpoint.to_string(),
        request_count,
        window_start: from_millis(window_start)?,
        last_request_at: from_millis(last_request_at)?,
    }))
}

impl RateLimitStore for SqliteStore {
    fn purge_before(&self, cutoff: DateTime<Utc>) -> Result<usize, StoreError> {
        let conn = self.lock()?;
        let deleted = conn.execute(
            "DELETE FROM rate_limits WHERE window_start < ?1",
            params![cutoff.timestamp_millis()],
        )?;
        Ok(deleted)
    }

    fn update(&self, identity: &str, endpoint: &str, apply: Update<'_>) -> Result<(), StoreError> {
        let mut conn = self.lock()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let current = read_record(&tx, identity, endpoint)?;
        if let Some(next) = apply(current.as_ref()) {
            tx.execute(
                "INSERT INTO rate_limits (identity, endpoint, request_count, window_start, last_request_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)
                 ON CONFLICT (identity, endpoint) DO UPDATE SET
                     request_count = excluded.request_count,
                     window_start = excluded.window_start,
                     last_request_at = excluded.last_request_at",
                params![
                    next.identity,
                    next.endpoint,
                    next.request_count,
                    next.window_start.timestamp_millis(),
                    next.last_request_at.timestamp_millis(),
                ],
            )?;
        }

        tx.commit()?;
        Ok(())
    }

    fn get(&self, identity: &str, endpoint: &str) -> Result<Option<RateLimitRecord>, StoreError> {
        let conn = self.lock()?;
        read_record(&conn, identity, endpoint)
    }

    fn count(&self) -> Result<usize, StoreError> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM rate_limits", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}
