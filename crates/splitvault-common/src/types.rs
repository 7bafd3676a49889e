//! Core type definitions for SplitVault
//!
//! This module defines the identifiers and sharing parameters shared by the
//! secret-sharing engine, the storage backends and the orchestrator.

use derive_more::Display;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::NonZeroU8;
use std::str::FromStr;
use uuid::Uuid;

/// Maximum length of a file identifier
pub const MAX_FILE_ID_LEN: usize = 64;

/// Identifier correlating all shares of one stored file
///
/// Restricted to ASCII letters, digits, `-` and `_` so it can be embedded
/// in file names and object keys without escaping.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Display)]
#[serde(try_from = "String", into = "String")]
#[display("{_0}")]
pub struct FileId(String);

impl FileId {
    /// Generate a new random file ID
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }

    /// Parse and validate a caller-supplied file ID
    pub fn parse(id: impl Into<String>) -> Result<Self, FileIdError> {
        let id = id.into();
        Self::validate(&id)?;
        Ok(Self(id))
    }

    /// Get the file ID as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn validate(id: &str) -> Result<(), FileIdError> {
        if id.is_empty() {
            return Err(FileIdError::Empty);
        }
        if id.len() > MAX_FILE_ID_LEN {
            return Err(FileIdError::TooLong);
        }
        if let Some(c) = id
            .chars()
            .find(|c| !c.is_ascii_alphanumeric() && *c != '-' && *c != '_')
        {
            return Err(FileIdError::InvalidChar(c));
        }
        Ok(())
    }
}

impl fmt::Debug for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FileId({:?})", self.0)
    }
}

impl FromStr for FileId {
    type Err = FileIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for FileId {
    type Error = FileIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<FileId> for String {
    fn from(id: FileId) -> Self {
        id.0
    }
}

/// Errors that can occur when parsing a file ID
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FileIdError {
    #[error("file id cannot be empty")]
    Empty,
    #[error("file id cannot exceed {MAX_FILE_ID_LEN} characters")]
    TooLong,
    #[error("file id contains invalid character: {0:?}")]
    InvalidChar(char),
}

/// Evaluation point of a share (the x-coordinate), never zero
///
/// Zero is the point at which the protected value sits, so it can never be
/// handed out as a share.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Display)]
#[serde(try_from = "u8", into = "u8")]
#[display("{_0}")]
pub struct ShareIndex(NonZeroU8);

impl ShareIndex {
    /// Create a share index, returning `None` for zero
    #[must_use]
    pub const fn new(value: u8) -> Option<Self> {
        match NonZeroU8::new(value) {
            Some(v) => Some(Self(v)),
            None => None,
        }
    }

    /// Get the raw field element
    #[must_use]
    pub const fn get(self) -> u8 {
        self.0.get()
    }
}

impl fmt::Debug for ShareIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ShareIndex({})", self.0)
    }
}

impl TryFrom<u8> for ShareIndex {
    type Error = ShareIndexError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value).ok_or(ShareIndexError)
    }
}

impl From<ShareIndex> for u8 {
    fn from(index: ShareIndex) -> Self {
        index.get()
    }
}

impl FromStr for ShareIndex {
    type Err = ShareIndexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<u8>()
            .ok()
            .and_then(Self::new)
            .ok_or(ShareIndexError)
    }
}

/// Error returned for a zero or out-of-range share index
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("share index must be in 1..=255")]
pub struct ShareIndexError;

/// Threshold sharing parameters: N shares, any M of which reconstruct
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SharingConfig {
    /// Total number of shares produced (N)
    pub share_count: u8,
    /// Minimum number of shares required to reconstruct (M)
    pub threshold: u8,
}

impl SharingConfig {
    /// Create a new sharing config (unvalidated, see [`SharingConfig::validate`])
    #[must_use]
    pub const fn new(share_count: u8, threshold: u8) -> Self {
        Self {
            share_count,
            threshold,
        }
    }

    /// 2-of-2, the CLI default
    pub const TWO_OF_TWO: Self = Self::new(2, 2);

    /// 3-of-5
    pub const THREE_OF_FIVE: Self = Self::new(5, 3);

    /// Check `1 <= threshold <= share_count`
    pub fn validate(&self) -> crate::Result<()> {
        if self.share_count == 0 || self.threshold == 0 || self.threshold > self.share_count {
            return Err(crate::Error::InvalidThreshold {
                threshold: self.threshold,
                share_count: self.share_count,
            });
        }
        Ok(())
    }

    /// Number of shares that may be lost while the file stays recoverable
    #[must_use]
    pub const fn fault_tolerance(&self) -> u8 {
        self.share_count.saturating_sub(self.threshold)
    }
}

impl Default for SharingConfig {
    fn default() -> Self {
        Self::TWO_OF_TWO
    }
}

impl fmt::Display for SharingConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-of-{}", self.threshold, self.share_count)
    }
}
