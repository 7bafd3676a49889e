//! AES-256-GCM wrapper

use crate::error::CipherError;
use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Nonce};
use rand::RngCore;
use rand::rngs::OsRng;
use std::fmt;
use zeroize::Zeroizing;

/// Key length accepted when encryption is enabled (AES-256)
pub const REQUIRED_KEY_LEN: usize = 32;

/// GCM nonce length (96 bits)
pub const NONCE_LEN: usize = 12;

/// GCM authentication tag length (128 bits)
pub const TAG_LEN: usize = 16;

/// Whether to encrypt, and with which key
///
/// Key bytes are wiped when the settings are dropped and never appear in
/// `Debug` output.
#[derive(Clone)]
pub struct CipherSettings {
    enabled: bool,
    key: Zeroizing<Vec<u8>>,
}

impl CipherSettings {
    /// Settings that pass data through unchanged
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            key: Zeroizing::new(Vec::new()),
        }
    }

    /// Settings that encrypt with `key`
    ///
    /// The key is not checked here; [`Encryptor::new`] rejects a bad length.
    #[must_use]
    pub fn enabled(key: impl Into<Vec<u8>>) -> Self {
        Self {
            enabled: true,
            key: Zeroizing::new(key.into()),
        }
    }

    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Length of the configured key material
    #[must_use]
    pub fn key_len(&self) -> usize {
        self.key.len()
    }

    /// Check the key-length policy without building a cipher
    pub fn validate(&self) -> Result<(), CipherError> {
        if self.enabled && self.key.len() != REQUIRED_KEY_LEN {
            return Err(CipherError::InvalidKeyMaterial {
                expected: REQUIRED_KEY_LEN,
                actual: self.key.len(),
            });
        }
        Ok(())
    }
}

impl Default for CipherSettings {
    fn default() -> Self {
        Self::disabled()
    }
}

impl fmt::Debug for CipherSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CipherSettings")
            .field("enabled", &self.enabled)
            .field("key_len", &self.key.len())
            .finish_non_exhaustive()
    }
}

/// Encrypts and decrypts whole buffers according to [`CipherSettings`]
pub struct Encryptor {
    cipher: Option<Aes256Gcm>,
}

impl Encryptor {
    /// Build an encryptor, validating the key before any cryptographic call
    pub fn new(settings: &CipherSettings) -> Result<Self, CipherError> {
        settings.validate()?;
        if !settings.enabled {
            return Ok(Self { cipher: None });
        }

        let cipher = Aes256Gcm::new_from_slice(&settings.key).map_err(|_| {
            CipherError::InvalidKeyMaterial {
                expected: REQUIRED_KEY_LEN,
                actual: settings.key.len(),
            }
        })?;
        Ok(Self {
            cipher: Some(cipher),
        })
    }

    /// Whether this encryptor transforms data
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.cipher.is_some()
    }

    /// Seal `plaintext` under a fresh random nonce
    ///
    /// Returns `nonce || ciphertext || tag`, or a copy of the input when
    /// encryption is disabled.
    pub fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>, CipherError> {
        let Some(cipher) = &self.cipher else {
            return Ok(plaintext.to_vec());
        };

        let mut nonce = [0u8; NONCE_LEN];
        OsRng.fill_bytes(&mut nonce);

        let sealed = cipher
            .encrypt(Nonce::from_slice(&nonce), plaintext)
            .map_err(|_| CipherError::EncryptionFailed)?;

        let mut output = Vec::with_capacity(NONCE_LEN + sealed.len());
        output.extend_from_slice(&nonce);
        output.extend_from_slice(&sealed);
        Ok(output)
    }

    /// Open a buffer produced by [`Encryptor::encrypt`]
    ///
    /// Any failure, including input too short to hold a nonce and a tag, is
    /// reported as `AuthenticationFailed`; no partial plaintext is returned.
    pub fn decrypt(&self, data: &[u8]) -> Result<Vec<u8>, CipherError> {
        let Some(cipher) = &self.cipher else {
            return Ok(data.to_vec());
        };

        if data.len() < NONCE_LEN + TAG_LEN {
            return Err(CipherError::AuthenticationFailed);
        }
        let (nonce, sealed) = data.split_at(NONCE_LEN);
        cipher
            .decrypt(Nonce::from_slice(nonce), sealed)
            .map_err(|_| CipherError::AuthenticationFailed)
    }
}

impl fmt::Debug for Encryptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Encryptor")
            .field("enabled", &self.is_enabled())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn test_key(seed: u8) -> Vec<u8> {
        (0..REQUIRED_KEY_LEN as u8).map(|i| i ^ seed).collect()
    }

    fn enabled(seed: u8) -> Encryptor {
        Encryptor::new(&CipherSettings::enabled(test_key(seed))).unwrap()
    }

    #[test]
    fn test_key_policy_is_aes_256() {
        assert_eq!(REQUIRED_KEY_LEN, 32);

        for len in [0usize, 1, 16, 24, 31, 33, 64] {
            let settings = CipherSettings::enabled(vec![7u8; len]);
            assert_eq!(
                Encryptor::new(&settings).unwrap_err(),
                CipherError::InvalidKeyMaterial {
                    expected: REQUIRED_KEY_LEN,
                    actual: len
                }
            );
        }
        assert!(Encryptor::new(&CipherSettings::enabled(vec![7u8; 32])).is_ok());
    }

    #[test]
    fn test_disabled_ignores_key_and_passes_through() {
        let encryptor = Encryptor::new(&CipherSettings::disabled()).unwrap();
        assert!(!encryptor.is_enabled());

        let data = b"not encrypted";
        assert_eq!(encryptor.encrypt(data).unwrap(), data);
        assert_eq!(encryptor.decrypt(data).unwrap(), data);
    }

    #[test]
    fn test_roundtrip() {
        let encryptor = enabled(0);
        let mut rng = StdRng::seed_from_u64(11);

        for len in [0usize, 1, 15, 16, 17, 1000] {
            let mut data = vec![0u8; len];
            rng.fill(&mut data[..]);

            let sealed = encryptor.encrypt(&data).unwrap();
            assert_eq!(sealed.len(), NONCE_LEN + len + TAG_LEN);
            assert_eq!(encryptor.decrypt(&sealed).unwrap(), data);
        }
    }

    #[test]
    fn test_fresh_nonce_per_call() {
        let encryptor = enabled(0);
        let a = encryptor.encrypt(b"same input").unwrap();
        let b = encryptor.encrypt(b"same input").unwrap();

        assert_ne!(a[..NONCE_LEN], b[..NONCE_LEN]);
        assert_ne!(a, b);
    }

    #[test]
    fn test_every_bit_flip_is_rejected() {
        let encryptor = enabled(0);
        let sealed = encryptor.encrypt(b"sixteen byte msg").unwrap();

        // covers nonce, body and tag positions
        for pos in 0..sealed.len() {
            for bit in 0..8 {
                let mut tampered = sealed.clone();
                tampered[pos] ^= 1 << bit;
                assert_eq!(
                    encryptor.decrypt(&tampered).unwrap_err(),
                    CipherError::AuthenticationFailed,
                    "flip at byte {pos} bit {bit}"
                );
            }
        }
    }

    #[test]
    fn test_truncated_input_is_rejected() {
        let encryptor = enabled(0);
        let sealed = encryptor.encrypt(b"payload").unwrap();

        for len in [0, 1, NONCE_LEN, NONCE_LEN + TAG_LEN - 1, sealed.len() - 1] {
            assert_eq!(
                encryptor.decrypt(&sealed[..len]).unwrap_err(),
                CipherError::AuthenticationFailed
            );
        }
    }

    #[test]
    fn test_wrong_key_is_rejected() {
        let sealed = enabled(0).encrypt(b"for key zero").unwrap();
        assert_eq!(
            enabled(1).decrypt(&sealed).unwrap_err(),
            CipherError::AuthenticationFailed
        );
    }

    #[test]
    fn test_debug_redacts_key() {
        let settings = CipherSettings::enabled(vec![0xAB; 32]);
        let rendered = format!("{settings:?}");
        assert!(rendered.contains("key_len: 32"));
        assert!(!rendered.contains("171"));
        assert!(!rendered.to_lowercase().contains("ab, "));
    }
}
