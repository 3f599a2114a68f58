//! Keyed visitor storage with upsert-with-seeding semantics.

use std::path::Path;
use std::time::Duration;

use glimpse_core::{Transaction, Visitor};
use rand::Rng;
use rusqlite::{params, Connection, OptionalExtension};
use thiserror::Error;

/// Fixed demo catalog for seeded purchase history.
pub const SKU_CATALOG: [&str; 8] = [
    "milk",
    "coffee-beans",
    "bread",
    "apples",
    "laundry-detergent",
    "toothpaste",
    "instant-noodles",
    "eggs",
];

/// Rows synthesised for every newly created visitor.
const SEED_COUNT: usize = 5;
/// Gap between consecutive seeded rows: one hour to one day.
const SEED_GAP_SECS: std::ops::RangeInclusive<i64> = 3_600..=86_400;
const SEED_QUANTITY: std::ops::RangeInclusive<i64> = 1..=3;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS visitors (
  id TEXT PRIMARY KEY,
  first_seen_ts INTEGER NOT NULL,
  last_seen_ts INTEGER NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_visitors_last_seen ON visitors(last_seen_ts);

CREATE TABLE IF NOT EXISTS transactions (
  visitor_id TEXT NOT NULL,
  ts INTEGER NOT NULL,
  sku TEXT NOT NULL,
  quantity INTEGER NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_transactions_visitor ON transactions(visitor_id, ts DESC);
";

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("sqlite: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Outcome of an upsert: was this digest seen before?
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sighting {
    First,
    Returning,
}

/// Handle to the visitor database.
///
/// The producer process holds one for writing; each reader opens its own.
pub struct ProfileStore {
    conn: Connection,
}

impl ProfileStore {
    /// Open (creating if absent) the database at `path` and apply the schema.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        Self::bootstrap(conn)
    }

    /// In-memory store for tests.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        Self::bootstrap(conn)
    }

    fn bootstrap(conn: Connection) -> Result<Self, StoreError> {
        // WAL lets the web process read while the camera loop writes.
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.busy_timeout(Duration::from_secs(5))?;
        conn.execute_batch(SCHEMA)?;
        tracing::debug!("visitor schema applied");
        Ok(Self { conn })
    }

    /// Record a sighting of `id` at `now` (unix seconds).
    ///
    /// First sighting: inserts the visitor and seeds [`SEED_COUNT`] synthetic
    /// purchases inside a single transaction — a concurrent reader never
    /// observes the visitor without its history. Later sightings: updates
    /// `last_seen_ts` only; `first_seen_ts` and the history are immutable.
    ///
    /// An I/O failure rolls the whole transaction back and surfaces as
    /// `StoreError`; no partially seeded visitor can remain.
    pub fn upsert(&mut self, id: &str, now: i64) -> Result<Sighting, StoreError> {
        let tx = self.conn.transaction()?;

        let known = tx
            .query_row(
                "SELECT 1 FROM visitors WHERE id = ?1",
                params![id],
                |_| Ok(()),
            )
            .optional()?
            .is_some();

        let sighting = if known {
            tx.execute(
                "UPDATE visitors SET last_seen_ts = ?1 WHERE id = ?2",
                params![now, id],
            )?;
            Sighting::Returning
        } else {
            tx.execute(
                "INSERT INTO visitors(id, first_seen_ts, last_seen_ts) VALUES(?1, ?2, ?3)",
                params![id, now, now],
            )?;
            seed_history(&tx, id, now)?;
            Sighting::First
        };

        tx.commit()?;
        Ok(sighting)
    }

    /// The visitor with the greatest `last_seen_ts`, or `None` when empty.
    ///
    /// Ties on `last_seen_ts` resolve to the lexicographically smallest id.
    pub fn find_latest(&self) -> Result<Option<Visitor>, StoreError> {
        let row = self
            .conn
            .query_row(
                "SELECT id, first_seen_ts, last_seen_ts FROM visitors
                 ORDER BY last_seen_ts DESC, id ASC LIMIT 1",
                [],
                |row| {
                    Ok(Visitor {
                        id: row.get(0)?,
                        first_seen_ts: row.get(1)?,
                        last_seen_ts: row.get(2)?,
                    })
                },
            )
            .optional()?;
        Ok(row)
    }

    /// Up to `limit` transactions for `id`, newest first.
    ///
    /// Unknown ids yield an empty vec, not an error.
    pub fn recent_transactions(
        &self,
        id: &str,
        limit: usize,
    ) -> Result<Vec<Transaction>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT visitor_id, ts, sku, quantity FROM transactions
             WHERE visitor_id = ?1 ORDER BY ts DESC LIMIT ?2",
        )?;
        let rows = stmt.query_map(params![id, limit as i64], |row| {
            Ok(Transaction {
                visitor_id: row.get(0)?,
                ts: row.get(1)?,
                sku: row.get(2)?,
                quantity: row.get(3)?,
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    pub fn visitor_count(&self) -> Result<i64, StoreError> {
        Ok(self
            .conn
            .query_row("SELECT COUNT(*) FROM visitors", [], |row| row.get(0))?)
    }

    pub fn transaction_count(&self) -> Result<i64, StoreError> {
        Ok(self
            .conn
            .query_row("SELECT COUNT(*) FROM transactions", [], |row| row.get(0))?)
    }
}

/// Insert the synthetic purchase history for a brand-new visitor.
///
/// Timestamps walk strictly backward from `now`: each row is the previous
/// one minus an independently drawn gap of one hour to one day, so every
/// seeded row is strictly in the past and the sequence is monotone. The
/// randomness only has to look plausible on a demo ad; it models nothing.
fn seed_history(tx: &rusqlite::Transaction<'_>, id: &str, now: i64) -> Result<(), StoreError> {
    let mut rng = rand::thread_rng();
    let mut ts = now;
    for _ in 0..SEED_COUNT {
        ts -= rng.gen_range(SEED_GAP_SECS);
        let sku = SKU_CATALOG[rng.gen_range(0..SKU_CATALOG.len())];
        let quantity = rng.gen_range(SEED_QUANTITY);
        tx.execute(
            "INSERT INTO transactions(visitor_id, ts, sku, quantity) VALUES(?1, ?2, ?3, ?4)",
            params![id, ts, sku, quantity],
        )?;
    }
    Ok(())
}
