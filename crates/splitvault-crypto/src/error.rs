//! Cipher errors

use splitvault_common::Error as CommonError;
use thiserror::Error;

/// Errors raised by the encryption layer
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum CipherError {
    /// Key length does not match the cipher
    #[error("invalid key material: expected {expected} bytes, got {actual}")]
    InvalidKeyMaterial { expected: usize, actual: usize },

    /// Tag did not verify, or the input cannot hold a nonce and a tag
    #[error("authentication failed")]
    AuthenticationFailed,

    #[error("encryption failed")]
    EncryptionFailed,
}

impl From<CipherError> for CommonError {
    fn from(e: CipherError) -> Self {
        match e {
            CipherError::InvalidKeyMaterial { expected, actual } => {
                Self::InvalidKeyMaterial { expected, actual }
            }
            CipherError::AuthenticationFailed => Self::AuthenticationFailed,
            CipherError::EncryptionFailed => Self::Cipher(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conversion_keeps_error_class() {
        let err: CommonError = CipherError::InvalidKeyMaterial {
            expected: 32,
            actual: 5,
        }
        .into();
        assert!(err.is_configuration());

        let err: CommonError = CipherError::AuthenticationFailed.into();
        assert!(err.is_integrity());

        let err: CommonError = CipherError::EncryptionFailed.into();
        assert!(matches!(err, CommonError::Cipher(_)));
    }
}
