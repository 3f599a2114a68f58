//! glimpse-store — durable visitor profiles and purchase history.
//!
//! One SQLite file shared by the producer (camera loop, sole writer) and
//! the consumer (web process, readers). WAL mode keeps readers from
//! blocking on the writer.

pub mod recency;
pub mod store;

pub use recency::{history_for, latest_visitor_id, HistoryEntry, HISTORY_LIMIT};
pub use store::{ProfileStore, Sighting, StoreError};
