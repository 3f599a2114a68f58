//! Read-side queries feeding the ad-serving path.

use glimpse_core::elapsed::format_elapsed;
use serde::Serialize;

use crate::store::{ProfileStore, StoreError};

/// History entries shown on an ad page.
pub const HISTORY_LIMIT: usize = 5;

/// One purchase, augmented with a human-readable elapsed-time bucket.
#[derive(Debug, Clone, Serialize)]
pub struct HistoryEntry {
    pub sku: String,
    pub quantity: i64,
    pub ts: i64,
    /// Elapsed-time bucket of `now - ts`, e.g. "45s", "1m", "2h", "2d".
    pub ago: String,
}

/// Identifier of the most recently active visitor, if any.
pub fn latest_visitor_id(store: &ProfileStore) -> Result<Option<String>, StoreError> {
    Ok(store.find_latest()?.map(|v| v.id))
}

/// The last [`HISTORY_LIMIT`] purchases for `id`, newest first, each
/// bucketed relative to `now`. Unknown ids yield an empty vec.
pub fn history_for(
    store: &ProfileStore,
    id: &str,
    now: i64,
) -> Result<Vec<HistoryEntry>, StoreError> {
    let txs = store.recent_transactions(id, HISTORY_LIMIT)?;
    Ok(txs
        .into_iter()
        .map(|tx| HistoryEntry {
            ago: format_elapsed(now - tx.ts),
            sku: tx.sku,
            quantity: tx.quantity,
            ts: tx.ts,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latest_visitor_id_empty() {
        let s = ProfileStore::open_in_memory().unwrap();
        assert!(latest_visitor_id(&s).unwrap().is_none());
    }

    #[test]
    fn test_latest_visitor_id_delegates() {
        let mut s = ProfileStore::open_in_memory().unwrap();
        s.upsert("abc", 100).unwrap();
        s.upsert("def", 200).unwrap();
        assert_eq!(latest_visitor_id(&s).unwrap().as_deref(), Some("def"));
    }

    #[test]
    fn test_history_augments_with_buckets() {
        let mut s = ProfileStore::open_in_memory().unwrap();
        let now = 1_700_000_000;
        s.upsert("abc", now).unwrap();

        let history = history_for(&s, "abc", now).unwrap();
        assert_eq!(history.len(), HISTORY_LIMIT);
        for entry in &history {
            let elapsed = now - entry.ts;
            assert!(elapsed > 0);
            assert_eq!(entry.ago, format_elapsed(elapsed));
            // Seed gaps start at one hour, so buckets are hour-scale or larger.
            assert!(entry.ago.ends_with('h') || entry.ago.ends_with('d'));
        }
    }

    #[test]
    fn test_history_unknown_id_is_empty() {
        let s = ProfileStore::open_in_memory().unwrap();
        assert!(history_for(&s, "nonexistent", 0).unwrap().is_empty());
    }
}
