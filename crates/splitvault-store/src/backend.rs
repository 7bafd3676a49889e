//! Backend capability contract

use crate::error::BackendResult;
use async_trait::async_trait;
use splitvault_common::FileId;
use splitvault_sss::Share;
use std::sync::Arc;

/// Shared handle to a backend, as passed to the orchestrator
pub type BackendHandle = Arc<dyn ShareBackend>;

/// A storage destination for shares
///
/// Implementations must be `Send + Sync`; the orchestrator borrows handles
/// for the duration of one operation and never touches one backend
/// concurrently within that operation.
#[async_trait]
pub trait ShareBackend: Send + Sync {
    /// Name used in logs and diagnostics
    fn name(&self) -> &str;

    /// Cheap availability probe
    ///
    /// `Ok(false)` means "skip me"; an error is logged by the caller and
    /// treated the same way.
    async fn is_available(&self) -> BackendResult<bool>;

    /// Persist a share
    async fn put(&self, share: &Share) -> BackendResult<()>;

    /// Fetch this backend's share of `file_id`
    ///
    /// Returns `BackendError::NotFound` when the backend holds none.
    async fn get(&self, file_id: &FileId) -> BackendResult<Share>;

    /// Remove this backend's share of `file_id`
    ///
    /// Returns `BackendError::NotFound` when the backend holds none.
    async fn delete(&self, file_id: &FileId) -> BackendResult<()>;
}
