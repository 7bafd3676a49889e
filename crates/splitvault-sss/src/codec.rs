//! Shamir split/combine
//!
//! This module provides the free functions `split` and `combine`, which work
//! on raw index-to-payload maps, and the `SharingCodec` wrapper that
//! validates its parameters once and produces [`Share`] values for a file.

use crate::gf256::Gf256;
use crate::share::Share;
use rand::rngs::OsRng;
use rand::{CryptoRng, RngCore};
use splitvault_common::{Error as CommonError, FileId, Result, ShareIndex, SharingConfig};
use std::collections::BTreeMap;
use thiserror::Error;

/// Errors specific to secret-sharing operations
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SharingError {
    #[error("invalid threshold: {threshold} must be between 1 and share count {share_count}")]
    InvalidThreshold { threshold: u8, share_count: u8 },

    #[error("malformed share set: {0}")]
    MalformedShareSet(String),

    #[error("insufficient shares: have {available}, need {required}")]
    InsufficientShares { available: usize, required: usize },
}

impl From<SharingError> for CommonError {
    fn from(e: SharingError) -> Self {
        match e {
            SharingError::InvalidThreshold {
                threshold,
                share_count,
            } => CommonError::InvalidThreshold {
                threshold,
                share_count,
            },
            SharingError::MalformedShareSet(msg) => CommonError::MalformedShareSet(msg),
            SharingError::InsufficientShares {
                available,
                required,
            } => CommonError::MalformedShareSet(format!(
                "have {available} shares, need {required}"
            )),
        }
    }
}

fn check_parameters(share_count: u8, threshold: u8) -> std::result::Result<(), SharingError> {
    if share_count == 0 || threshold == 0 || threshold > share_count {
        return Err(SharingError::InvalidThreshold {
            threshold,
            share_count,
        });
    }
    Ok(())
}

/// Split `data` into `share_count` shares, any `threshold` of which recover it
///
/// Shares are evaluated at `x = 1..=share_count`. Coefficients come from the
/// operating system's CSPRNG.
pub fn split(
    data: &[u8],
    share_count: u8,
    threshold: u8,
) -> std::result::Result<BTreeMap<ShareIndex, Vec<u8>>, SharingError> {
    split_with_rng(data, share_count, threshold, &mut OsRng)
}

/// Split with a caller-supplied CSPRNG
pub fn split_with_rng<R: RngCore + CryptoRng + ?Sized>(
    data: &[u8],
    share_count: u8,
    threshold: u8,
    rng: &mut R,
) -> std::result::Result<BTreeMap<ShareIndex, Vec<u8>>, SharingError> {
    check_parameters(share_count, threshold)?;

    let mut outputs: Vec<Vec<u8>> = (0..share_count)
        .map(|_| Vec::with_capacity(data.len()))
        .collect();

    // coefficients a1..a(t-1); a0 is the secret byte
    let mut coefficients = vec![0u8; usize::from(threshold) - 1];

    for &secret in data {
        rng.fill_bytes(&mut coefficients);

        for (output, x) in outputs.iter_mut().zip(1..=share_count) {
            let x = Gf256(x);
            // Horner's rule over a(t-1)..a1, then the constant term
            let mut acc = Gf256::ZERO;
            for &c in coefficients.iter().rev() {
                acc = acc * x + Gf256(c);
            }
            output.push((acc * x + Gf256(secret)).0);
        }
    }
    coefficients.fill(0);

    Ok((1..=share_count)
        .filter_map(ShareIndex::new)
        .zip(outputs)
        .collect())
}

/// Lagrange basis polynomials evaluated at zero for the given points
///
/// `w_j = prod_{m != j} x_m / (x_m - x_j)`; the points must be distinct and
/// nonzero, which `ShareIndex` keys of a map guarantee.
fn lagrange_weights_at_zero(xs: &[Gf256]) -> Vec<Gf256> {
    xs.iter()
        .enumerate()
        .map(|(j, &xj)| {
            let mut numerator = Gf256::ONE;
            let mut denominator = Gf256::ONE;
            for (m, &xm) in xs.iter().enumerate() {
                if m != j {
                    numerator *= xm;
                    denominator *= xm - xj;
                }
            }
            numerator / denominator
        })
        .collect()
}

/// Recover the protected buffer from a set of shares
///
/// Interpolates at `x = 0` independently at every offset. Supplying fewer
/// shares than the split threshold does not fail; it yields unrelated bytes.
pub fn combine(
    shares: &BTreeMap<ShareIndex, Vec<u8>>,
) -> std::result::Result<Vec<u8>, SharingError> {
    let Some(first) = shares.values().next() else {
        return Err(SharingError::MalformedShareSet("no shares supplied".into()));
    };
    let len = first.len();

    if let Some((index, payload)) = shares.iter().find(|(_, p)| p.len() != len) {
        return Err(SharingError::MalformedShareSet(format!(
            "share {index} has {} bytes, expected {len}",
            payload.len()
        )));
    }

    let xs: Vec<Gf256> = shares.keys().map(|i| Gf256(i.get())).collect();
    let weights = lagrange_weights_at_zero(&xs);

    let mut output = vec![0u8; len];
    for (payload, &weight) in shares.values().zip(&weights) {
        for (out, &y) in output.iter_mut().zip(payload) {
            *out ^= (Gf256(y) * weight).0;
        }
    }
    Ok(output)
}

/// Threshold sharing codec bound to one validated [`SharingConfig`]
#[derive(Clone, Debug)]
pub struct SharingCodec {
    config: SharingConfig,
}

impl SharingCodec {
    /// Create a codec, rejecting invalid thresholds
    pub fn new(config: SharingConfig) -> Result<Self> {
        check_parameters(config.share_count, config.threshold)?;
        Ok(Self { config })
    }

    /// Get the configuration
    #[must_use]
    pub const fn config(&self) -> SharingConfig {
        self.config
    }

    /// Split a buffer into shares of `file_id`, ordered by index
    pub fn split_file(&self, file_id: &FileId, data: &[u8]) -> Result<Vec<Share>> {
        self.split_file_with_rng(file_id, data, &mut OsRng)
    }

    /// Split with a caller-supplied CSPRNG
    pub fn split_file_with_rng<R: RngCore + CryptoRng + ?Sized>(
        &self,
        file_id: &FileId,
        data: &[u8],
        rng: &mut R,
    ) -> Result<Vec<Share>> {
        let raw = split_with_rng(data, self.config.share_count, self.config.threshold, rng)?;
        Ok(raw
            .into_iter()
            .map(|(index, payload)| {
                Share::new(file_id.clone(), index, self.config.threshold, payload)
            })
            .collect())
    }
}

/// Combine shares of one file back into the protected buffer
///
/// Uses the threshold recorded in the shares themselves. Rejects share sets
/// mixing files or thresholds or repeating an index, and refuses to
/// interpolate below the threshold, where [`combine`] would silently return
/// unrelated bytes.
pub fn combine_shares(shares: &[Share]) -> std::result::Result<Vec<u8>, SharingError> {
    let Some(first) = shares.first() else {
        return Err(SharingError::MalformedShareSet("no shares supplied".into()));
    };

    let mut points = BTreeMap::new();
    for share in shares {
        if share.file_id != first.file_id {
            return Err(SharingError::MalformedShareSet(format!(
                "share {} belongs to file {}, expected {}",
                share.index, share.file_id, first.file_id
            )));
        }
        if share.threshold != first.threshold {
            return Err(SharingError::MalformedShareSet(format!(
                "share {} was split with threshold {}, expected {}",
                share.index, share.threshold, first.threshold
            )));
        }
        if points.insert(share.index, share.payload.to_vec()).is_some() {
            return Err(SharingError::MalformedShareSet(format!(
                "duplicate share index {}",
                share.index
            )));
        }
    }

    let required = usize::from(first.threshold);
    if points.len() < required {
        return Err(SharingError::InsufficientShares {
            available: points.len(),
            required,
        });
    }
    combine(&points)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::seq::SliceRandom;
    use rand::{Rng, SeedableRng};

    fn random_bytes(rng: &mut StdRng, len: usize) -> Vec<u8> {
        let mut data = vec![0u8; len];
        rng.fill(&mut data[..]);
        data
    }

    fn random_subset(
        rng: &mut StdRng,
        shares: &BTreeMap<ShareIndex, Vec<u8>>,
        size: usize,
    ) -> BTreeMap<ShareIndex, Vec<u8>> {
        let mut entries: Vec<_> = shares.iter().collect();
        entries.shuffle(rng);
        entries
            .into_iter()
            .take(size)
            .map(|(k, v)| (*k, v.clone()))
            .collect()
    }

    #[test]
    fn test_split_combine_roundtrip() {
        let data = b"Hello, World! This is a test of threshold secret sharing.";
        let shares = split(data, 5, 3).unwrap();
        assert_eq!(shares.len(), 5);
        assert!(shares.values().all(|s| s.len() == data.len()));

        let subset: BTreeMap<_, _> = shares.into_iter().take(3).collect();
        assert_eq!(combine(&subset).unwrap(), data);
    }

    #[test]
    fn test_every_threshold_subset_reconstructs() {
        let mut rng = StdRng::seed_from_u64(1);
        let data = random_bytes(&mut rng, 64);
        let shares = split_with_rng(&data, 5, 3, &mut rng).unwrap();
        let indices: Vec<ShareIndex> = shares.keys().copied().collect();

        for a in 0..5 {
            for b in a + 1..5 {
                for c in b + 1..5 {
                    let subset: BTreeMap<_, _> = [indices[a], indices[b], indices[c]]
                        .iter()
                        .map(|i| (*i, shares[i].clone()))
                        .collect();
                    assert_eq!(combine(&subset).unwrap(), data, "subset {a},{b},{c}");
                }
            }
        }
    }

    #[test]
    fn test_roundtrip_across_parameters() {
        let mut rng = StdRng::seed_from_u64(2);
        let params: [(u8, u8); 9] = [
            (1, 1),
            (2, 1),
            (2, 2),
            (3, 2),
            (5, 5),
            (10, 4),
            (16, 9),
            (100, 50),
            (255, 255),
        ];
        for (n, t) in params {
            for len in [0usize, 1, 33] {
                let data = random_bytes(&mut rng, len);
                let shares = split_with_rng(&data, n, t, &mut rng).unwrap();
                assert_eq!(shares.len(), usize::from(n));
                let subset = random_subset(&mut rng, &shares, usize::from(t));
                assert_eq!(combine(&subset).unwrap(), data, "n={n} t={t} len={len}");
            }
        }
    }

    #[test]
    fn test_more_than_threshold_reconstructs() {
        let mut rng = StdRng::seed_from_u64(3);
        let data = random_bytes(&mut rng, 100);
        let shares = split_with_rng(&data, 7, 3, &mut rng).unwrap();
        assert_eq!(combine(&shares).unwrap(), data);
    }

    #[test]
    fn test_threshold_one_shares_equal_secret() {
        let data = b"plain";
        let shares = split(data, 4, 1).unwrap();
        assert!(shares.values().all(|s| s == data));
    }

    #[test]
    fn test_empty_input() {
        let shares = split(b"", 3, 2).unwrap();
        assert_eq!(shares.len(), 3);
        assert!(shares.values().all(Vec::is_empty));
        assert_eq!(combine(&shares).unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn test_share_indices_are_one_based() {
        let shares = split(b"x", 255, 2).unwrap();
        let indices: Vec<u8> = shares.keys().map(|i| i.get()).collect();
        assert_eq!(indices, (1..=255).collect::<Vec<u8>>());
    }

    #[test]
    fn test_invalid_threshold() {
        assert_eq!(
            split(b"data", 3, 4).unwrap_err(),
            SharingError::InvalidThreshold {
                threshold: 4,
                share_count: 3
            }
        );
        assert!(split(b"data", 0, 0).is_err());
        assert!(split(b"data", 3, 0).is_err());
    }

    #[test]
    fn test_combine_rejects_mismatched_lengths() {
        let mut shares = split(b"some data", 3, 2).unwrap();
        let first = *shares.keys().next().unwrap();
        shares.get_mut(&first).unwrap().pop();
        assert!(matches!(
            combine(&shares),
            Err(SharingError::MalformedShareSet(_))
        ));
    }

    #[test]
    fn test_combine_rejects_empty_set() {
        assert!(matches!(
            combine(&BTreeMap::new()),
            Err(SharingError::MalformedShareSet(_))
        ));
    }

    #[test]
    fn test_under_threshold_gives_wrong_bytes() {
        let mut rng = StdRng::seed_from_u64(4);
        let data = random_bytes(&mut rng, 256);
        let shares = split_with_rng(&data, 5, 3, &mut rng).unwrap();
        let subset: BTreeMap<_, _> = shares.into_iter().take(2).collect();
        assert_ne!(combine(&subset).unwrap(), data);
    }

    /// With t-1 shares fixed at the same x positions, interpolating them must
    /// produce a value distributed independently of the secret byte.
    #[test]
    fn test_sub_threshold_shares_are_independent_of_secret() {
        const TRIALS: usize = 25_600;
        let mut rng = StdRng::seed_from_u64(5);

        let histogram = |secret: u8, rng: &mut StdRng| {
            let mut counts = [0u32; 256];
            let data = vec![secret; TRIALS];
            let shares = split_with_rng(&data, 3, 3, rng).unwrap();
            // shares 1 and 2 only
            let subset: BTreeMap<_, _> = shares.into_iter().take(2).collect();
            for value in combine(&subset).unwrap() {
                counts[value as usize] += 1;
            }
            counts
        };

        for secret in [0x00u8, 0x5A, 0xFF] {
            let counts = histogram(secret, &mut rng);
            // chi-squared against uniform, 255 degrees of freedom
            let expected = TRIALS as f64 / 256.0;
            let chi2: f64 = counts
                .iter()
                .map(|&c| {
                    let d = f64::from(c) - expected;
                    d * d / expected
                })
                .sum();
            assert!(chi2 < 360.0, "secret {secret:#04x}: chi2 = {chi2}");
        }
    }

    /// A single share's byte at an offset takes every value equally often
    /// regardless of the secret (threshold 2).
    #[test]
    fn test_single_share_is_uniform_for_any_secret() {
        const TRIALS: usize = 25_600;
        let mut rng = StdRng::seed_from_u64(6);

        for secret in [0x00u8, 0x80] {
            let data = vec![secret; TRIALS];
            let shares = split_with_rng(&data, 2, 2, &mut rng).unwrap();
            let mut counts = [0u32; 256];
            for &b in shares.values().next().unwrap() {
                counts[b as usize] += 1;
            }
            let expected = TRIALS as f64 / 256.0;
            let chi2: f64 = counts
                .iter()
                .map(|&c| (f64::from(c) - expected).powi(2) / expected)
                .sum();
            assert!(chi2 < 360.0, "secret {secret:#04x}: chi2 = {chi2}");
        }
    }

    #[test]
    fn test_codec_split_and_combine() {
        let codec = SharingCodec::new(SharingConfig::new(5, 3)).unwrap();
        let file_id = FileId::generate();
        let data = b"codec round trip";

        let shares = codec.split_file(&file_id, data).unwrap();
        assert_eq!(shares.len(), 5);
        assert!(shares.iter().all(|s| s.file_id == file_id && s.threshold == 3));
        assert!(shares.windows(2).all(|w| w[0].index < w[1].index));

        assert_eq!(combine_shares(&shares[2..]).unwrap(), data);
        assert_eq!(combine_shares(&shares).unwrap(), data);
    }

    #[test]
    fn test_combine_shares_uses_recorded_threshold() {
        let codec = SharingCodec::new(SharingConfig::new(5, 3)).unwrap();
        let shares = codec.split_file(&FileId::generate(), b"needs three").unwrap();

        assert_eq!(
            combine_shares(&shares[..2]).unwrap_err(),
            SharingError::InsufficientShares {
                available: 2,
                required: 3
            }
        );
    }

    #[test]
    fn test_combine_shares_rejects_bad_sets() {
        let codec = SharingCodec::new(SharingConfig::new(4, 2)).unwrap();
        let file_id = FileId::generate();
        let shares = codec.split_file(&file_id, b"abc").unwrap();

        assert!(matches!(
            combine_shares(&[]),
            Err(SharingError::MalformedShareSet(_))
        ));

        let duplicated = vec![shares[0].clone(), shares[0].clone()];
        assert!(matches!(
            combine_shares(&duplicated),
            Err(SharingError::MalformedShareSet(_))
        ));

        let mut foreign = shares[1].clone();
        foreign.file_id = FileId::generate();
        assert!(matches!(
            combine_shares(&[shares[0].clone(), foreign]),
            Err(SharingError::MalformedShareSet(_))
        ));

        let mut resplit = shares[1].clone();
        resplit.threshold = 3;
        assert!(matches!(
            combine_shares(&[shares[0].clone(), resplit]),
            Err(SharingError::MalformedShareSet(_))
        ));
    }

    #[test]
    fn test_insufficient_shares_converts_to_malformed() {
        let err: CommonError = SharingError::InsufficientShares {
            available: 1,
            required: 2,
        }
        .into();
        assert!(matches!(err, CommonError::MalformedShareSet(_)));
    }

    #[test]
    fn test_codec_rejects_invalid_config() {
        assert!(matches!(
            SharingCodec::new(SharingConfig::new(2, 3)),
            Err(CommonError::InvalidThreshold { .. })
        ));
    }
}
