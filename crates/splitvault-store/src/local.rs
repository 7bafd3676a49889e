//! Local directory backend
//!
//! Each share lives in its own file named
//! `<file-id>.<share-index>.<threshold>.share` whose contents are the raw
//! payload. The share metadata is recovered from the name on read, so the
//! directory needs no index of its own.

use crate::backend::ShareBackend;
use crate::error::{BackendError, BackendResult};
use async_trait::async_trait;
use splitvault_common::{FileId, ShareIndex};
use splitvault_sss::Share;
use std::io::ErrorKind;
use std::num::NonZeroU8;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// File extension of share files
pub const SHARE_EXTENSION: &str = "share";

/// A file in the directory that belongs to one file id
#[derive(Debug)]
struct ShareFile {
    path: PathBuf,
    /// Index and threshold; `None` when the name matched but did not parse
    layout: Option<(ShareIndex, u8)>,
}

/// Backend storing shares as files in one directory
#[derive(Debug, Clone)]
pub struct LocalBackend {
    name: String,
    directory: PathBuf,
}

impl LocalBackend {
    /// Create a backend over `directory`
    ///
    /// The directory is not created; a missing directory makes the backend
    /// report itself unavailable.
    pub fn new(name: impl Into<String>, directory: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            directory: directory.into(),
        }
    }

    /// Directory holding the share files
    #[must_use]
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// File name for a share
    #[must_use]
    pub fn share_file_name(share: &Share) -> String {
        format!(
            "{}.{}.{}.{SHARE_EXTENSION}",
            share.file_id, share.index, share.threshold
        )
    }

    /// Match `<file-id>.<middle>.share` for the given file
    ///
    /// Returns `None` for files of other ids, `Some(None)` when the middle
    /// part is not `<index>.<threshold>`. File ids never contain `.`, so the
    /// prefix match cannot catch another file's shares.
    fn match_share_file_name(name: &str, file_id: &FileId) -> Option<Option<(ShareIndex, u8)>> {
        let rest = name.strip_prefix(file_id.as_str())?.strip_prefix('.')?;
        let middle = rest.strip_suffix(SHARE_EXTENSION)?.strip_suffix('.')?;
        Some(Self::parse_layout(middle))
    }

    fn parse_layout(middle: &str) -> Option<(ShareIndex, u8)> {
        let (index, threshold) = middle.split_once('.')?;
        let index: ShareIndex = index.parse().ok()?;
        let threshold: NonZeroU8 = threshold.parse().ok()?;
        Some((index, threshold.get()))
    }

    /// Find every file of `file_id` in the directory, parsable or not
    async fn find_shares(&self, file_id: &FileId) -> BackendResult<Vec<ShareFile>> {
        let mut entries = tokio::fs::read_dir(&self.directory).await?;
        let mut matches = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let file_name = entry.file_name();
            let Some(name) = file_name.to_str() else {
                continue;
            };
            if let Some(layout) = Self::match_share_file_name(name, file_id) {
                matches.push(ShareFile {
                    path: entry.path(),
                    layout,
                });
            }
        }
        Ok(matches)
    }

    /// Locate the single share file of `file_id`
    async fn find_share(&self, file_id: &FileId) -> BackendResult<ShareFile> {
        let mut matches = self.find_shares(file_id).await?;
        match matches.len() {
            0 => Err(BackendError::not_found(file_id)),
            1 => Ok(matches.remove(0)),
            count => Err(BackendError::AmbiguousMatch {
                file_id: file_id.to_string(),
                count,
            }),
        }
    }
}

#[async_trait]
impl ShareBackend for LocalBackend {
    fn name(&self) -> &str {
        &self.name
    }

    async fn is_available(&self) -> BackendResult<bool> {
        match tokio::fs::metadata(&self.directory).await {
            Ok(meta) => Ok(meta.is_dir()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    async fn put(&self, share: &Share) -> BackendResult<()> {
        let path = self.directory.join(Self::share_file_name(share));
        tokio::fs::write(&path, &share.payload).await?;
        debug!(
            backend = %self.name,
            path = %path.display(),
            bytes = share.len(),
            "Wrote share file"
        );

        // one share per file id: drop whatever an earlier put left behind
        for stale in self.find_shares(&share.file_id).await? {
            if stale.path == path {
                continue;
            }
            match tokio::fs::remove_file(&stale.path).await {
                Ok(()) => debug!(
                    backend = %self.name,
                    path = %stale.path.display(),
                    "Replaced stale share file"
                ),
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => warn!(
                    backend = %self.name,
                    path = %stale.path.display(),
                    error = %e,
                    "Failed to remove stale share file"
                ),
            }
        }
        Ok(())
    }

    async fn get(&self, file_id: &FileId) -> BackendResult<Share> {
        let found = self.find_share(file_id).await?;
        let Some((index, threshold)) = found.layout else {
            return Err(BackendError::CorruptShare(format!(
                "unrecognised share file name {}",
                found.path.display()
            )));
        };
        let payload = match tokio::fs::read(&found.path).await {
            Ok(payload) => payload,
            // removed between the scan and the read
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(BackendError::not_found(file_id));
            }
            Err(e) => return Err(e.into()),
        };
        Ok(Share::new(file_id.clone(), index, threshold, payload))
    }

    async fn delete(&self, file_id: &FileId) -> BackendResult<()> {
        let found = self.find_share(file_id).await?;
        match tokio::fs::remove_file(&found.path).await {
            Ok(()) => {
                debug!(backend = %self.name, path = %found.path.display(), "Removed share file");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Err(BackendError::not_found(file_id)),
            Err(e) => Err(e.into()),
        }
    }
}
