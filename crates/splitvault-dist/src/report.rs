//! Operation reports
//!
//! Every orchestrator call returns a report describing what happened on each
//! backend. The caller decides how to surface the diagnostics.

use splitvault_common::{FileId, ShareIndex, SharingConfig};
use std::fmt;

/// Backend call that produced a diagnostic
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Stage {
    Probe,
    Put,
    Get,
    Delete,
}

impl Stage {
    /// Get the stage name
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Probe => "probe",
            Self::Put => "put",
            Self::Get => "get",
            Self::Delete => "delete",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A backend that was skipped or failed during an operation
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BackendDiagnostic {
    pub backend: String,
    pub stage: Stage,
    pub message: String,
}

impl BackendDiagnostic {
    pub fn new(backend: impl Into<String>, stage: Stage, message: impl Into<String>) -> Self {
        Self {
            backend: backend.into(),
            stage,
            message: message.into(),
        }
    }
}

impl fmt::Display for BackendDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}): {}", self.backend, self.stage, self.message)
    }
}

/// Where one share ended up
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Placement {
    pub index: ShareIndex,
    pub backend: String,
}

/// Outcome of a store operation
#[derive(Clone, Debug)]
pub struct StoreReport {
    /// Identifier to retrieve or delete the file with
    pub file_id: FileId,
    /// Fingerprint of the original plaintext
    pub fingerprint: String,
    /// Sharing parameters used
    pub config: SharingConfig,
    /// Placed shares, in index order
    pub placements: Vec<Placement>,
    pub diagnostics: Vec<BackendDiagnostic>,
}

impl StoreReport {
    /// Number of shares written
    #[must_use]
    pub fn placed(&self) -> usize {
        self.placements.len()
    }

    /// Every share found a backend
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.placed() == usize::from(self.config.share_count)
    }

    /// Enough shares were written to reconstruct the file
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        self.placed() >= usize::from(self.config.threshold)
    }
}

/// Outcome of a successful retrieve operation
#[derive(Clone)]
pub struct RetrieveReport {
    pub file_id: FileId,
    /// Reconstructed plaintext
    pub data: Vec<u8>,
    /// Distinct shares combined
    pub shares_used: usize,
    /// Whether a fingerprint was supplied and matched
    pub verified: bool,
    pub diagnostics: Vec<BackendDiagnostic>,
}

impl fmt::Debug for RetrieveReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetrieveReport")
            .field("file_id", &self.file_id)
            .field("len", &self.data.len())
            .field("shares_used", &self.shares_used)
            .field("verified", &self.verified)
            .field("diagnostics", &self.diagnostics)
            .finish()
    }
}

/// Overall result of a delete operation
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeleteStatus {
    /// No backend removed a share
    NothingDeleted,
    /// Some shares removed, but a backend failed or could not be reached
    Partial,
    /// Every reachable backend was cleaned and none was skipped
    Complete,
}

/// Outcome of a delete operation
#[derive(Clone, Debug)]
pub struct DeleteReport {
    pub file_id: FileId,
    /// Backends that removed a share
    pub deleted: usize,
    /// Backends that held no share of the file
    pub not_found: usize,
    /// Backends whose delete call failed
    pub failed: usize,
    /// Backends skipped as unavailable
    pub skipped: usize,
    pub diagnostics: Vec<BackendDiagnostic>,
}

impl DeleteReport {
    #[must_use]
    pub const fn new(file_id: FileId) -> Self {
        Self {
            file_id,
            deleted: 0,
            not_found: 0,
            failed: 0,
            skipped: 0,
            diagnostics: Vec::new(),
        }
    }

    #[must_use]
    pub const fn status(&self) -> DeleteStatus {
        if self.deleted == 0 {
            DeleteStatus::NothingDeleted
        } else if self.failed > 0 || self.skipped > 0 {
            DeleteStatus::Partial
        } else {
            DeleteStatus::Complete
        }
    }
}
