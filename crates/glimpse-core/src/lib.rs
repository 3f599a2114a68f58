//! glimpse-core — identity resolution primitives.
//!
//! Turns a face-embedding feature vector into a stable pseudonymous
//! identifier via a salted one-way digest, rate-limits repeat sightings
//! of the same identifier, and buckets elapsed time for display.

pub mod elapsed;
pub mod identity;
pub mod throttle;
pub mod types;

pub use identity::{stable_id, DigestError};
pub use throttle::EmissionThrottle;
pub use types::{Transaction, Visitor};
