//! In-memory backend
//!
//! Keeps shares in a map for the lifetime of the process. Failure switches
//! let tests and embedders simulate an unreachable destination, a failing
//! probe, failing I/O, and a slow probe or slow data calls.

use crate::backend::ShareBackend;
use crate::error::{BackendError, BackendResult};
use async_trait::async_trait;
use parking_lot::Mutex;
use splitvault_common::{FileId, ShareIndex};
use splitvault_sss::Share;
use std::collections::HashMap;
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

/// Map-backed backend
#[derive(Debug)]
pub struct MemoryBackend {
    name: String,
    shares: Mutex<HashMap<FileId, Share>>,
    available: AtomicBool,
    probe_fails: AtomicBool,
    io_fails: AtomicBool,
    latency: Mutex<Option<Duration>>,
    probe_latency: Mutex<Option<Duration>>,
}

impl MemoryBackend {
    /// Create an empty, available backend
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            shares: Mutex::new(HashMap::new()),
            available: AtomicBool::new(true),
            probe_fails: AtomicBool::new(false),
            io_fails: AtomicBool::new(false),
            latency: Mutex::new(None),
            probe_latency: Mutex::new(None),
        }
    }

    /// Report the backend as available or not from the probe
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Make the availability probe itself return an error
    pub fn set_probe_fails(&self, fails: bool) {
        self.probe_fails.store(fails, Ordering::SeqCst);
    }

    /// Make `put`, `get` and `delete` return I/O errors
    pub fn set_io_fails(&self, fails: bool) {
        self.io_fails.store(fails, Ordering::SeqCst);
    }

    /// Delay `put`, `get` and `delete` by `latency`
    pub fn set_latency(&self, latency: Option<Duration>) {
        *self.latency.lock() = latency;
    }

    /// Delay the availability probe by `latency`
    pub fn set_probe_latency(&self, latency: Option<Duration>) {
        *self.probe_latency.lock() = latency;
    }

    /// Number of shares held
    #[must_use]
    pub fn len(&self) -> usize {
        self.shares.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.shares.lock().is_empty()
    }

    /// Index of the share held for `file_id`, if any
    #[must_use]
    pub fn share_index(&self, file_id: &FileId) -> Option<ShareIndex> {
        self.shares.lock().get(file_id).map(|s| s.index)
    }

    async fn simulate(&self) -> BackendResult<()> {
        let latency = *self.latency.lock();
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
        if self.io_fails.load(Ordering::SeqCst) {
            return Err(io::Error::other(format!("simulated I/O failure on {}", self.name)).into());
        }
        Ok(())
    }
}

#[async_trait]
impl ShareBackend for MemoryBackend {
    fn name(&self) -> &str {
        &self.name
    }

    async fn is_available(&self) -> BackendResult<bool> {
        let latency = *self.probe_latency.lock();
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
        if self.probe_fails.load(Ordering::SeqCst) {
            return Err(BackendError::Unavailable(format!(
                "simulated probe failure on {}",
                self.name
            )));
        }
        Ok(self.available.load(Ordering::SeqCst))
    }

    async fn put(&self, share: &Share) -> BackendResult<()> {
        self.simulate().await?;
        self.shares
            .lock()
            .insert(share.file_id.clone(), share.clone());
        Ok(())
    }

    async fn get(&self, file_id: &FileId) -> BackendResult<Share> {
        self.simulate().await?;
        self.shares
            .lock()
            .get(file_id)
            .cloned()
            .ok_or_else(|| BackendError::not_found(file_id))
    }

    async fn delete(&self, file_id: &FileId) -> BackendResult<()> {
        self.simulate().await?;
        self.shares
            .lock()
            .remove(file_id)
            .map(|_| ())
            .ok_or_else(|| BackendError::not_found(file_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn share(file_id: &FileId, index: u8) -> Share {
        Share::new(file_id.clone(), ShareIndex::new(index).unwrap(), 2, vec![index; 4])
    }

    #[tokio::test]
    async fn test_put_get_delete() {
        let backend = MemoryBackend::new("mem");
        let file_id = FileId::generate();

        backend.put(&share(&file_id, 2)).await.unwrap();
        assert_eq!(backend.len(), 1);
        assert_eq!(backend.share_index(&file_id).unwrap().get(), 2);
        assert_eq!(backend.get(&file_id).await.unwrap().index.get(), 2);

        backend.delete(&file_id).await.unwrap();
        assert!(backend.is_empty());
        assert!(backend.get(&file_id).await.unwrap_err().is_not_found());
        assert!(backend.delete(&file_id).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_failure_switches() {
        let backend = MemoryBackend::new("mem");
        let file_id = FileId::generate();
        assert!(backend.is_available().await.unwrap());

        backend.set_available(false);
        assert!(!backend.is_available().await.unwrap());

        backend.set_probe_fails(true);
        assert!(matches!(
            backend.is_available().await,
            Err(BackendError::Unavailable(_))
        ));

        backend.set_io_fails(true);
        assert!(matches!(
            backend.put(&share(&file_id, 1)).await,
            Err(BackendError::Io(_))
        ));
        assert!(backend.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_latency_is_applied() {
        let backend = MemoryBackend::new("slow");
        let file_id = FileId::generate();
        backend.set_probe_latency(Some(Duration::from_secs(5)));
        backend.set_latency(Some(Duration::from_secs(2)));

        let started = tokio::time::Instant::now();
        backend.is_available().await.unwrap();
        let probe = started.elapsed();
        assert!(probe >= Duration::from_secs(5) && probe < Duration::from_secs(6));

        let started = tokio::time::Instant::now();
        backend.put(&share(&file_id, 1)).await.unwrap();
        let put = started.elapsed();
        assert!(put >= Duration::from_secs(2) && put < Duration::from_secs(3));
    }

    #[tokio::test(start_paused = true)]
    async fn test_availability_latency_leaves_data_calls_fast() {
        let backend = MemoryBackend::new("slow-probe");
        let file_id = FileId::generate();
        backend.set_probe_latency(Some(Duration::from_secs(5)));

        let started = tokio::time::Instant::now();
        backend.put(&share(&file_id, 1)).await.unwrap();
        backend.get(&file_id).await.unwrap();
        assert_eq!(started.elapsed(), Duration::ZERO);
    }
}
