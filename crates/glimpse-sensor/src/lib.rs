//! glimpse-sensor — the capture and feature-extraction boundary.
//!
//! The identity pipeline never talks to a camera or a vision model
//! directly; it consumes the [`FrameSource`] and [`FeatureExtractor`]
//! traits. Production deployments back these with a real device and an
//! external recognition library; the bundled synthetic implementation
//! stands in for both in demos and tests.

pub mod frame;
pub mod synthetic;

pub use frame::Frame;
pub use synthetic::{SyntheticCamera, SyntheticExtractor};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CaptureError {
    /// Device missing or unusable at startup. Fatal: the operator fixes
    /// the device and restarts; the producer never retries open.
    #[error("capture device unavailable: {0}")]
    DeviceUnavailable(String),
    /// A single frame read failed. The producer skips the iteration,
    /// backs off briefly, and continues.
    #[error("transient frame read failure: {0}")]
    Transient(String),
}

/// Supplies captured frames, one at a time.
pub trait FrameSource {
    fn next_frame(&mut self) -> Result<Frame, CaptureError>;
}

/// Detects subjects in a frame and encodes each as a feature vector.
///
/// Returns zero or more fixed-length vectors: stable (give or take sensor
/// noise) across repeated observations of the same physical subject,
/// arbitrary across different subjects. Zero subjects is the common case,
/// not an error.
pub trait FeatureExtractor {
    fn detect_and_encode(&mut self, frame: &Frame) -> Vec<Vec<f32>>;
}
