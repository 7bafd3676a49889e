//! Content fingerprinting
//!
//! A fingerprint is the lowercase hex SHA-256 digest of the original
//! plaintext. It detects storage corruption and wrong reconstructions; it is
//! not an authentication mechanism (the cipher layer covers tampering).

use crate::error::{Error, Result};
use sha2::{Digest, Sha256};

/// Length of a fingerprint in hex characters
pub const FINGERPRINT_HEX_LEN: usize = 64;

/// Compute the fingerprint of `data`
#[must_use]
pub fn fingerprint(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

/// Check `data` against an expected fingerprint
///
/// An empty `expected` means the caller opted out and always passes.
pub fn verify(data: &[u8], expected: &str) -> Result<()> {
    if expected.is_empty() {
        return Ok(());
    }

    let actual = fingerprint(data);
    if !actual.eq_ignore_ascii_case(expected.trim()) {
        return Err(Error::CorruptData {
            expected: expected.to_string(),
            actual,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{Rng, SeedableRng, rngs::StdRng};

    #[test]
    fn test_fingerprint_known_value() {
        assert_eq!(
            fingerprint(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
        assert_eq!(fingerprint(b"hello").len(), FINGERPRINT_HEX_LEN);
    }

    #[test]
    fn test_verify_roundtrip() {
        let data = b"hello, world!";
        assert!(verify(data, &fingerprint(data)).is_ok());
        assert!(verify(data, &fingerprint(data).to_uppercase()).is_ok());
    }

    #[test]
    fn test_verify_skipped_when_empty() {
        assert!(verify(b"anything", "").is_ok());
    }

    #[test]
    fn test_verify_detects_single_bit_flip() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut data = vec![0u8; 4096];
        rng.fill(&mut data[..]);
        let expected = fingerprint(&data);

        for _ in 0..64 {
            let mut corrupted = data.clone();
            let pos = rng.gen_range(0..corrupted.len());
            corrupted[pos] ^= 1u8 << rng.gen_range(0..8u32);

            match verify(&corrupted, &expected) {
                Err(Error::CorruptData {
                    expected: e,
                    actual,
                }) => {
                    assert_eq!(e, expected);
                    assert_eq!(actual, fingerprint(&corrupted));
                }
                other => panic!("expected CorruptData, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_verify_detects_truncation() {
        let data = b"0123456789";
        assert!(verify(&data[..9], &fingerprint(data)).is_err());
    }
}
