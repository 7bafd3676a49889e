//! Share type for secret-shared data

use bytes::Bytes;
use splitvault_common::{FileId, ShareIndex};
use std::fmt;

/// One fragment of a split file
///
/// The payload holds one field element per byte of the protected buffer, at
/// the same offset, so every share of a file has the same length. Each share
/// also records the threshold it was split with, so a reader can tell how
/// many shares are needed without being told.
#[derive(Clone, PartialEq, Eq)]
pub struct Share {
    /// File this share belongs to
    pub file_id: FileId,
    /// Evaluation point (x-coordinate), unique within the file
    pub index: ShareIndex,
    /// Shares required to reconstruct the file
    pub threshold: u8,
    /// Polynomial evaluations, one per protected byte
    pub payload: Bytes,
}

impl Share {
    /// Create a new share
    #[must_use]
    pub fn new(
        file_id: FileId,
        index: ShareIndex,
        threshold: u8,
        payload: impl Into<Bytes>,
    ) -> Self {
        Self {
            file_id,
            index,
            threshold,
            payload: payload.into(),
        }
    }

    /// Get the size of the share payload
    #[must_use]
    pub fn len(&self) -> usize {
        self.payload.len()
    }

    /// Check if the payload is empty (the protected buffer was empty)
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }
}

impl fmt::Debug for Share {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Share bytes are sensitive below the threshold too; keep them out of logs
        f.debug_struct("Share")
            .field("file_id", &self.file_id)
            .field("index", &self.index)
            .field("threshold", &self.threshold)
            .field("len", &self.payload.len())
            .finish_non_exhaustive()
    }
}
