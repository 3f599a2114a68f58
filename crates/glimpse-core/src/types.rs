use serde::{Deserialize, Serialize};

/// One pseudonymous identity, keyed by its digest.
///
/// Created on the first sighting of a previously-unseen digest and updated
/// (never re-created, never deleted) on every later sighting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Visitor {
    /// Output of [`crate::identity::stable_id`]; 64 lowercase hex chars.
    pub id: String,
    /// Unix seconds of the first sighting. Immutable after creation.
    pub first_seen_ts: i64,
    /// Unix seconds of the most recent sighting. Always >= `first_seen_ts`.
    pub last_seen_ts: i64,
}

/// One (simulated) purchase event attributed to a visitor.
///
/// A batch of exactly five is synthesised when a visitor is first created;
/// rows are never mutated or deleted afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub visitor_id: String,
    /// Unix seconds, strictly in the past relative to creation time.
    pub ts: i64,
    /// Item label from the fixed catalog.
    pub sku: String,
    pub quantity: i64,
}
