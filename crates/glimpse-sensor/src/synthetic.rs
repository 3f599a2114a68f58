//! Synthetic stand-ins for the camera and the vision model.
//!
//! The camera emits small blank frames with a running sequence number;
//! the extractor derives which subjects appear in a frame from that
//! sequence number alone, so a frame re-presented to the extractor always
//! yields the same observation. Noise is kept below half the digest's
//! rounding quantum, which is what makes repeated observations of one
//! subject collapse onto one identifier.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::frame::Frame;
use crate::{CaptureError, FeatureExtractor, FrameSource};

const SYNTH_WIDTH: u32 = 64;
const SYNTH_HEIGHT: u32 = 64;
/// Dimensionality of synthetic embeddings (mirrors common face encoders).
const SYNTH_DIM: usize = 128;
/// Additive noise amplitude. Must stay under half the canonical rounding
/// quantum (5e-4) or identities stop being stable.
const SYNTH_NOISE: f32 = 2.0e-4;

/// Frame source that fabricates frames at no hardware cost.
pub struct SyntheticCamera {
    sequence: u32,
    /// Report every Nth read as a transient failure (0 = never). Lets a
    /// demo exercise the producer's skip-and-backoff path.
    drop_every: u32,
}

impl SyntheticCamera {
    pub fn open(drop_every: u32) -> Result<Self, CaptureError> {
        tracing::info!(
            width = SYNTH_WIDTH,
            height = SYNTH_HEIGHT,
            drop_every,
            "synthetic camera opened"
        );
        Ok(Self {
            sequence: 0,
            drop_every,
        })
    }
}

impl FrameSource for SyntheticCamera {
    fn next_frame(&mut self) -> Result<Frame, CaptureError> {
        self.sequence = self.sequence.wrapping_add(1);
        if self.drop_every != 0 && self.sequence % self.drop_every == 0 {
            return Err(CaptureError::Transient(format!(
                "injected read failure at sequence {}",
                self.sequence
            )));
        }
        Ok(Frame {
            data: vec![0u8; (SYNTH_WIDTH * SYNTH_HEIGHT) as usize],
            width: SYNTH_WIDTH,
            height: SYNTH_HEIGHT,
            sequence: self.sequence,
        })
    }
}

/// Extractor backed by a pool of fixed pseudo-random subjects.
pub struct SyntheticExtractor {
    subjects: Vec<Vec<f32>>,
}

impl SyntheticExtractor {
    /// Build a pool of `count` subjects from a fixed seed. The same seed
    /// reproduces the same population across restarts, so returning
    /// visitors stay "returning" in the durable store.
    ///
    /// Components are drawn on the 1e-3 grid: the downstream digest rounds
    /// to three decimals, and a grid-aligned base plus sub-quantum noise
    /// can never straddle a rounding boundary.
    pub fn new(count: usize, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let subjects = (0..count)
            .map(|_| {
                (0..SYNTH_DIM)
                    .map(|_| rng.gen_range(-1000i32..=1000) as f32 / 1000.0)
                    .collect()
            })
            .collect();
        Self { subjects }
    }

    pub fn pool_size(&self) -> usize {
        self.subjects.len()
    }

    /// Noisy copy of subject `idx`, seeded per frame for reproducibility.
    fn observe(&self, idx: usize, rng: &mut StdRng) -> Vec<f32> {
        self.subjects[idx]
            .iter()
            .map(|v| v + rng.gen_range(-SYNTH_NOISE..SYNTH_NOISE))
            .collect()
    }
}

impl FeatureExtractor for SyntheticExtractor {
    fn detect_and_encode(&mut self, frame: &Frame) -> Vec<Vec<f32>> {
        if self.subjects.is_empty() {
            return Vec::new();
        }
        let mut rng = StdRng::seed_from_u64(frame.sequence as u64);

        // Roughly: 30% empty frames, 55% one subject, 15% two.
        let roll: u32 = rng.gen_range(0..100);
        let count = if roll < 30 {
            0
        } else if roll < 85 {
            1
        } else {
            2
        };

        let mut seen = Vec::with_capacity(count);
        let mut vectors = Vec::with_capacity(count);
        for _ in 0..count {
            let idx = rng.gen_range(0..self.subjects.len());
            if seen.contains(&idx) {
                continue;
            }
            seen.push(idx);
            vectors.push(self.observe(idx, &mut rng));
        }
        vectors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(sequence: u32) -> Frame {
        Frame {
            data: vec![0u8; 16],
            width: 4,
            height: 4,
            sequence,
        }
    }

    #[test]
    fn test_camera_sequences_increase() {
        let mut cam = SyntheticCamera::open(0).unwrap();
        let a = cam.next_frame().unwrap();
        let b = cam.next_frame().unwrap();
        assert!(b.sequence > a.sequence);
    }

    #[test]
    fn test_camera_injected_drop() {
        let mut cam = SyntheticCamera::open(2).unwrap();
        assert!(cam.next_frame().is_ok());
        assert!(matches!(
            cam.next_frame(),
            Err(CaptureError::Transient(_))
        ));
        assert!(cam.next_frame().is_ok());
    }

    #[test]
    fn test_pool_reproducible_across_restarts() {
        let a = SyntheticExtractor::new(4, 42);
        let b = SyntheticExtractor::new(4, 42);
        assert_eq!(a.subjects, b.subjects);
    }

    #[test]
    fn test_same_frame_yields_same_observation() {
        let mut ex = SyntheticExtractor::new(4, 42);
        let first = ex.detect_and_encode(&frame(7));
        let second = ex.detect_and_encode(&frame(7));
        assert_eq!(first, second);
    }

    #[test]
    fn test_vectors_have_fixed_dimension() {
        let mut ex = SyntheticExtractor::new(4, 42);
        for seq in 0..50 {
            for v in ex.detect_and_encode(&frame(seq)) {
                assert_eq!(v.len(), SYNTH_DIM);
            }
        }
    }

    #[test]
    fn test_noise_stays_under_rounding_quantum() {
        let mut ex = SyntheticExtractor::new(4, 42);
        let subjects = ex.subjects.clone();
        for seq in 0..200 {
            for v in ex.detect_and_encode(&frame(seq)) {
                // Every observation must sit within SYNTH_NOISE of exactly
                // one pool subject.
                let matches = subjects.iter().filter(|s| {
                    s.iter()
                        .zip(v.iter())
                        .all(|(a, b)| (a - b).abs() < SYNTH_NOISE + 1e-6)
                });
                assert_eq!(matches.count(), 1);
            }
        }
    }

    #[test]
    fn test_empty_pool_detects_nothing() {
        let mut ex = SyntheticExtractor::new(0, 42);
        assert!(ex.detect_and_encode(&frame(1)).is_empty());
    }
}
