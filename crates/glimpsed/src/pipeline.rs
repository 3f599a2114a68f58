//! The capture → digest → throttle → upsert loop.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use glimpse_core::{stable_id, EmissionThrottle};
use glimpse_sensor::{CaptureError, FeatureExtractor, FrameSource};
use glimpse_store::{ProfileStore, Sighting};

/// Single-threaded producer pipeline.
///
/// Owns every mutable piece of the write path — frame source, extractor,
/// throttle, store handle — so there is no intra-process race on the store:
/// subjects sharing a frame are processed sequentially in encounter order.
pub struct Pipeline<C, E> {
    camera: C,
    extractor: E,
    store: ProfileStore,
    throttle: EmissionThrottle,
    salt: String,
    frame_interval: Duration,
    read_backoff: Duration,
}

impl<C: FrameSource, E: FeatureExtractor> Pipeline<C, E> {
    pub fn new(
        camera: C,
        extractor: E,
        store: ProfileStore,
        throttle: EmissionThrottle,
        salt: String,
        frame_interval: Duration,
        read_backoff: Duration,
    ) -> Self {
        Self {
            camera,
            extractor,
            store,
            throttle,
            salt,
            frame_interval,
            read_backoff,
        }
    }

    /// Run until `shutdown` is set.
    ///
    /// The flag is checked at the top of each iteration, so the current
    /// iteration always completes before return; the camera and the store
    /// handle are released by drop when the pipeline goes out of scope,
    /// never mid-transaction.
    pub fn run(&mut self, shutdown: &AtomicBool) {
        tracing::info!("producer loop started");
        while !shutdown.load(Ordering::SeqCst) {
            match self.camera.next_frame() {
                Ok(frame) => {
                    let vectors = self.extractor.detect_and_encode(&frame);
                    if !vectors.is_empty() {
                        self.process_subjects(&vectors, unix_now());
                    }
                    // Deliberate backpressure, not an error condition.
                    std::thread::sleep(self.frame_interval);
                }
                Err(CaptureError::Transient(reason)) => {
                    tracing::warn!(%reason, "frame read failed; skipping iteration");
                    std::thread::sleep(self.read_backoff);
                }
                Err(err @ CaptureError::DeviceUnavailable(_)) => {
                    // Startup open succeeded, so the device disappeared
                    // underneath us. Operator fixes and restarts.
                    tracing::error!(error = %err, "capture device lost; stopping producer");
                    break;
                }
            }
        }
        tracing::info!("producer loop stopped");
    }

    /// Digest, throttle, and upsert each subject of one frame in order.
    ///
    /// A malformed vector or a failed write rejects that single subject
    /// only; remaining subjects in the frame still get processed. Returns
    /// the number of sightings actually written.
    pub fn process_subjects(&mut self, vectors: &[Vec<f32>], now: i64) -> usize {
        let mut written = 0;
        for vector in vectors {
            let id = match stable_id(vector, &self.salt) {
                Ok(id) => id,
                Err(err) => {
                    tracing::warn!(error = %err, "rejecting malformed feature vector");
                    continue;
                }
            };

            if !self.throttle.should_emit(&id, now as f64) {
                tracing::debug!(visitor = %id, "within cooldown; suppressed");
                continue;
            }

            match self.store.upsert(&id, now) {
                Ok(Sighting::First) => {
                    written += 1;
                    tracing::info!(visitor = %id, "new visitor recorded");
                }
                Ok(Sighting::Returning) => {
                    written += 1;
                    tracing::info!(visitor = %id, "returning visitor");
                }
                Err(err) => {
                    tracing::error!(error = %err, visitor = %id, "upsert failed; continuing");
                }
            }
        }
        written
    }
}

fn unix_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use glimpse_sensor::{SyntheticCamera, SyntheticExtractor};

    fn pipeline() -> Pipeline<SyntheticCamera, SyntheticExtractor> {
        Pipeline::new(
            SyntheticCamera::open(0).unwrap(),
            SyntheticExtractor::new(2, 42),
            ProfileStore::open_in_memory().unwrap(),
            EmissionThrottle::new(3.0),
            "test-salt".to_string(),
            Duration::from_millis(0),
            Duration::from_millis(0),
        )
    }

    #[test]
    fn test_same_subject_within_cooldown_writes_once() {
        let mut p = pipeline();
        let subject = vec![0.125f32; 16];
        assert_eq!(p.process_subjects(&[subject.clone()], 100), 1);
        assert_eq!(p.process_subjects(&[subject], 101), 0);
        assert_eq!(p.store.visitor_count().unwrap(), 1);
        assert_eq!(p.store.transaction_count().unwrap(), 5);
    }

    #[test]
    fn test_same_subject_after_cooldown_updates_not_reseeds() {
        let mut p = pipeline();
        let subject = vec![0.125f32; 16];
        assert_eq!(p.process_subjects(&[subject.clone()], 100), 1);
        assert_eq!(p.process_subjects(&[subject], 104), 1);
        assert_eq!(p.store.visitor_count().unwrap(), 1);
        assert_eq!(p.store.transaction_count().unwrap(), 5);
        let v = p.store.find_latest().unwrap().unwrap();
        assert_eq!(v.first_seen_ts, 100);
        assert_eq!(v.last_seen_ts, 104);
    }

    #[test]
    fn test_malformed_subject_skipped_rest_of_frame_processed() {
        let mut p = pipeline();
        let bad = vec![f32::NAN; 16];
        let good = vec![0.25f32; 16];
        assert_eq!(p.process_subjects(&[bad, good], 100), 1);
        assert_eq!(p.store.visitor_count().unwrap(), 1);
    }

    #[test]
    fn test_distinct_subjects_in_one_frame_both_recorded() {
        let mut p = pipeline();
        let a = vec![0.25f32; 16];
        let b = vec![-0.75f32; 16];
        assert_eq!(p.process_subjects(&[a, b], 100), 2);
        assert_eq!(p.store.visitor_count().unwrap(), 2);
    }

    #[test]
    fn test_noisy_reobservation_resolves_to_same_visitor() {
        // End to end: two noisy observations of one synthetic subject must
        // collapse onto a single stored visitor.
        let mut p = pipeline();
        let base = vec![0.125f32; 16];
        let noisy: Vec<f32> = base.iter().map(|v| v + 0.0001).collect();
        p.process_subjects(&[base], 100);
        p.process_subjects(&[noisy], 110);
        assert_eq!(p.store.visitor_count().unwrap(), 1);
    }
}
