//! Error types for SplitVault
//!
//! This module defines the workspace-wide error type. Component crates keep
//! their own narrower enums and convert into this one at their boundary.

use crate::types::FileIdError;
use thiserror::Error;

/// Common result type for SplitVault operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error type for SplitVault
#[derive(Debug, Error)]
pub enum Error {
    // Configuration errors
    #[error(
        "invalid threshold: threshold {threshold} must be between 1 and share count {share_count}"
    )]
    InvalidThreshold { threshold: u8, share_count: u8 },

    #[error("invalid key material: expected {expected} bytes, got {actual}")]
    InvalidKeyMaterial { expected: usize, actual: usize },

    #[error("invalid file id: {0}")]
    InvalidFileId(#[from] FileIdError),

    #[error("configuration error: {0}")]
    Configuration(String),

    // Integrity errors
    #[error("corrupt data: fingerprints didn't match (expected {expected}, got {actual})")]
    CorruptData { expected: String, actual: String },

    #[error("authentication failed: ciphertext was tampered with or the key is wrong")]
    AuthenticationFailed,

    // Algorithmic precondition violations
    #[error("malformed share set: {0}")]
    MalformedShareSet(String),

    // Reconstruction outcomes
    #[error("no shares found for file {file_id}")]
    NoSharesFound { file_id: String },

    #[error("insufficient shares for file {file_id}: have {found}, need {required}")]
    InsufficientShares {
        file_id: String,
        found: usize,
        required: usize,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("cipher error: {0}")]
    Cipher(String),
}

impl Error {
    /// Create a configuration error
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Caller configuration errors, raised before any I/O or cryptography
    #[must_use]
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::InvalidThreshold { .. }
                | Self::InvalidKeyMaterial { .. }
                | Self::InvalidFileId(_)
                | Self::Configuration(_)
        )
    }

    /// Integrity failures; the reconstructed data must not be used
    #[must_use]
    pub fn is_integrity(&self) -> bool {
        matches!(self, Self::CorruptData { .. } | Self::AuthenticationFailed)
    }

    /// Outcomes where the file simply could not be gathered
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::NoSharesFound { .. } | Self::InsufficientShares { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_classes() {
        let threshold = Error::InvalidThreshold {
            threshold: 4,
            share_count: 3,
        };
        assert!(threshold.is_configuration());
        assert!(!threshold.is_integrity());

        let bad_id: Error = crate::FileId::parse("../etc").unwrap_err().into();
        assert!(bad_id.is_configuration());

        assert!(Error::AuthenticationFailed.is_integrity());
        assert!(
            Error::CorruptData {
                expected: "aa".into(),
                actual: "bb".into()
            }
            .is_integrity()
        );

        let insufficient = Error::InsufficientShares {
            file_id: "f".into(),
            found: 2,
            required: 3,
        };
        assert!(insufficient.is_not_found());
        assert!(!insufficient.is_integrity());
    }

    #[test]
    fn test_corrupt_data_message_carries_both_values() {
        let err = Error::CorruptData {
            expected: "abc".into(),
            actual: "def".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("abc"));
        assert!(msg.contains("def"));
    }
}
