//! Salted one-way digest from a feature vector to a stable identifier.
//!
//! The digest is an HMAC-SHA256 over a canonical serialization of the
//! vector, keyed by an operator-supplied salt. No image or raw embedding
//! ever leaves this function — only the irreversible MAC.

use std::fmt::Write as _;

use hmac::{Hmac, Mac};
use sha2::Sha256;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

/// Fractional digits kept when canonicalising vector components.
///
/// Rounding to three decimals collapses small sensor noise across repeated
/// observations of the same subject onto one digest. Vectors differing by
/// less than half the quantum (5e-4) serialize identically.
const CANONICAL_PRECISION: usize = 3;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum DigestError {
    #[error("empty feature vector")]
    EmptyVector,
    #[error("non-finite component at index {index}")]
    NonFinite { index: usize },
}

/// Derive the stable pseudonymous identifier for a feature vector.
///
/// Deterministic: identical vector + identical salt always yields the same
/// 64-character lowercase hex string, independent of process state or time.
/// Changing either input changes the output with overwhelming probability.
///
/// Empty vectors and vectors containing NaN or infinity are rejected; the
/// upstream extractor never produces them, so a malformed vector means a
/// misbehaving collaborator rather than a subject to record.
pub fn stable_id(embedding: &[f32], salt: &str) -> Result<String, DigestError> {
    if embedding.is_empty() {
        return Err(DigestError::EmptyVector);
    }
    if let Some(index) = embedding.iter().position(|v| !v.is_finite()) {
        return Err(DigestError::NonFinite { index });
    }

    let payload = canonicalize(embedding);

    let mut mac = HmacSha256::new_from_slice(salt.as_bytes())
        .expect("HMAC accepts keys of any length");
    mac.update(payload.as_bytes());
    let digest = mac.finalize().into_bytes();

    let mut out = String::with_capacity(digest.len() * 2);
    for byte in digest {
        // write! to a String cannot fail
        let _ = write!(out, "{byte:02x}");
    }
    Ok(out)
}

/// Serialize a vector into its exact canonical byte form.
///
/// Fixed separators and fixed fractional precision: `[0.123,-1.000,4.500]`.
/// Two logically-equal vectors always produce identical bytes.
fn canonicalize(embedding: &[f32]) -> String {
    let mut payload = String::with_capacity(embedding.len() * 8 + 2);
    payload.push('[');
    for (i, value) in embedding.iter().enumerate() {
        if i > 0 {
            payload.push(',');
        }
        let _ = write!(payload, "{value:.CANONICAL_PRECISION$}");
    }
    payload.push(']');
    payload
}

#[cfg(test)]
mod tests {
    use super::*;

    const SALT: &str = "unit-test-salt";

    #[test]
    fn test_digest_deterministic() {
        let v = vec![0.125, -0.5, 0.75, 0.0];
        let a = stable_id(&v, SALT).unwrap();
        let b = stable_id(&v, SALT).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_digest_shape() {
        let id = stable_id(&[0.1, 0.2], SALT).unwrap();
        assert_eq!(id.len(), 64);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn test_salt_sensitivity() {
        let v = vec![0.125, -0.5, 0.75];
        let a = stable_id(&v, "salt-one").unwrap();
        let b = stable_id(&v, "salt-two").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_vector_sensitivity() {
        let a = stable_id(&[0.125, -0.5], SALT).unwrap();
        let b = stable_id(&[0.125, -0.501], SALT).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_noise_collapses_under_rounding() {
        // Two observations of the same subject differing by less than
        // half the canonical quantum must map to the same identifier.
        let clean = vec![0.1232, -0.5672, 0.8881];
        let noisy: Vec<f32> = clean.iter().map(|v| v + 0.0001).collect();
        let a = stable_id(&clean, SALT).unwrap();
        let b = stable_id(&noisy, SALT).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_empty_vector_rejected() {
        assert_eq!(stable_id(&[], SALT), Err(DigestError::EmptyVector));
    }

    #[test]
    fn test_nan_rejected() {
        let v = vec![0.1, f32::NAN, 0.3];
        assert_eq!(stable_id(&v, SALT), Err(DigestError::NonFinite { index: 1 }));
    }

    #[test]
    fn test_infinity_rejected() {
        let v = vec![f32::INFINITY];
        assert_eq!(stable_id(&v, SALT), Err(DigestError::NonFinite { index: 0 }));
    }

    #[test]
    fn test_canonical_form() {
        assert_eq!(canonicalize(&[0.1234, -1.0, 4.5]), "[0.123,-1.000,4.500]");
    }
}
