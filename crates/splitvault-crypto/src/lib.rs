//! SplitVault Crypto - optional encryption applied before splitting
//!
//! When enabled, the protected buffer is sealed with AES-256-GCM under a
//! caller-supplied 32-byte key. Each call draws a fresh 96-bit nonce from the
//! operating system RNG, and the nonce travels in front of the ciphertext:
//!
//! ```text
//! nonce (12) || ciphertext (len) || tag (16)
//! ```
//!
//! When disabled, both directions pass the data through unchanged.

pub mod cipher;
pub mod error;

pub use cipher::{CipherSettings, Encryptor, NONCE_LEN, REQUIRED_KEY_LEN, TAG_LEN};
pub use error::CipherError;
