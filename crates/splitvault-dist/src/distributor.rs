//! Store, retrieve and delete across a list of backends
//!
//! Backends are visited in caller order, one at a time. Availability is
//! probed once per operation and the resulting snapshot drives the rest of
//! the call, so a backend coming or going mid-operation cannot reshuffle
//! placement.

use crate::options::DistributorOptions;
use crate::report::{
    BackendDiagnostic, DeleteReport, Placement, RetrieveReport, Stage, StoreReport,
};
use futures::future::join_all;
use splitvault_common::{Error, FileId, Result, SharingConfig, fingerprint};
use splitvault_crypto::{CipherSettings, Encryptor};
use splitvault_sss::{Share, SharingCodec, combine_shares};
use splitvault_store::{BackendError, BackendHandle, BackendResult};
use std::future::Future;
use std::path::Path;
use tracing::{debug, error, info, warn};

/// Parameters of a retrieve call
#[derive(Clone, Debug)]
pub struct RetrieveRequest {
    pub file_id: FileId,
    /// Expected fingerprint of the plaintext; empty skips verification
    pub fingerprint: String,
    /// Minimum number of shares to insist on, on top of the threshold
    /// recorded in the shares
    pub threshold: Option<u8>,
}

impl RetrieveRequest {
    pub const fn new(file_id: FileId) -> Self {
        Self {
            file_id,
            fingerprint: String::new(),
            threshold: None,
        }
    }

    /// Require at least `threshold` shares even if the shares record less
    #[must_use]
    pub const fn with_threshold(mut self, threshold: u8) -> Self {
        self.threshold = Some(threshold);
        self
    }

    /// Verify the reconstruction against `fingerprint`
    #[must_use]
    pub fn with_fingerprint(mut self, fingerprint: impl Into<String>) -> Self {
        self.fingerprint = fingerprint.into();
        self
    }
}

/// Splits files into shares and spreads them over backends
///
/// Holds no state between calls besides its cipher and options; backends
/// are borrowed per call.
#[derive(Debug)]
pub struct Distributor {
    encryptor: Encryptor,
    options: DistributorOptions,
}

impl Distributor {
    /// Create a distributor
    ///
    /// Fails with `InvalidKeyMaterial` when encryption is enabled with a key
    /// of the wrong length.
    pub fn new(cipher: &CipherSettings, options: DistributorOptions) -> Result<Self> {
        Ok(Self {
            encryptor: Encryptor::new(cipher)?,
            options,
        })
    }

    /// Split `data` and place one share per available backend
    ///
    /// Best effort: a backend rejecting its share is recorded and the share
    /// moves on to the next backend. Running out of backends ends the call
    /// with whatever was placed; check [`StoreReport::is_recoverable`].
    pub async fn store(
        &self,
        backends: &[BackendHandle],
        data: &[u8],
        config: SharingConfig,
    ) -> Result<StoreReport> {
        let codec = SharingCodec::new(config)?;
        let file_id = FileId::generate();

        let protected = self.encryptor.encrypt(data)?;
        let fingerprint = fingerprint(data);
        let shares = codec.split_file(&file_id, &protected)?;

        let (available, mut diagnostics) = self.probe_all(backends).await;
        let mut candidates = available.into_iter();
        let mut placements = Vec::with_capacity(shares.len());

        'shares: for share in &shares {
            for backend in candidates.by_ref() {
                match self.call(backend.put(share)).await {
                    Ok(()) => {
                        debug!(
                            file_id = %file_id,
                            index = %share.index,
                            backend = backend.name(),
                            "Placed share"
                        );
                        placements.push(Placement {
                            index: share.index,
                            backend: backend.name().to_string(),
                        });
                        continue 'shares;
                    }
                    Err(e) => {
                        warn!(
                            file_id = %file_id,
                            index = %share.index,
                            backend = backend.name(),
                            error = %e,
                            "Failed to store share, trying next backend"
                        );
                        diagnostics.push(BackendDiagnostic::new(
                            backend.name(),
                            Stage::Put,
                            e.to_string(),
                        ));
                    }
                }
            }
            warn!(
                file_id = %file_id,
                placed = placements.len(),
                total = shares.len(),
                "Ran out of backends"
            );
            break;
        }

        let report = StoreReport {
            file_id,
            fingerprint,
            config,
            placements,
            diagnostics,
        };

        if report.is_recoverable() {
            info!(
                file_id = %report.file_id,
                placed = report.placed(),
                config = %config,
                fault_tolerance = config.fault_tolerance(),
                "Stored file"
            );
        } else {
            error!(
                file_id = %report.file_id,
                placed = report.placed(),
                required = config.threshold,
                "Stored too few shares to recover the file"
            );
        }
        Ok(report)
    }

    /// Read `path` and [`store`](Self::store) its contents
    pub async fn store_file(
        &self,
        backends: &[BackendHandle],
        path: &Path,
        config: SharingConfig,
    ) -> Result<StoreReport> {
        config.validate()?;
        let data = tokio::fs::read(path).await?;
        debug!(path = %path.display(), bytes = data.len(), "Read source file");
        self.store(backends, &data, config).await
    }

    /// Gather shares from every available backend and rebuild the file
    ///
    /// The shares needed are the threshold recorded in the shares, raised to
    /// the request's threshold when one is given.
    ///
    /// # Errors
    /// - `NoSharesFound` / `InsufficientShares` when too few shares answer;
    ///   combine is not attempted
    /// - `AuthenticationFailed` when decryption fails
    /// - `CorruptData` when the supplied fingerprint does not match
    pub async fn retrieve(
        &self,
        backends: &[BackendHandle],
        request: &RetrieveRequest,
    ) -> Result<RetrieveReport> {
        if request.threshold == Some(0) {
            return Err(Error::configuration("threshold must be at least 1"));
        }
        let file_id = &request.file_id;

        let (available, mut diagnostics) = self.probe_all(backends).await;
        let mut shares: Vec<Share> = Vec::new();

        for backend in available {
            let share = match self.call(backend.get(file_id)).await {
                Ok(share) => share,
                Err(e) if e.is_not_found() => {
                    debug!(file_id = %file_id, backend = backend.name(), "No share on backend");
                    continue;
                }
                Err(e) => {
                    warn!(
                        file_id = %file_id,
                        backend = backend.name(),
                        error = %e,
                        "Failed to fetch share"
                    );
                    diagnostics.push(BackendDiagnostic::new(
                        backend.name(),
                        Stage::Get,
                        e.to_string(),
                    ));
                    continue;
                }
            };

            if &share.file_id != file_id {
                warn!(
                    file_id = %file_id,
                    backend = backend.name(),
                    returned = %share.file_id,
                    "Backend returned a share of another file"
                );
                diagnostics.push(BackendDiagnostic::new(
                    backend.name(),
                    Stage::Get,
                    format!("returned a share of file {}", share.file_id),
                ));
                continue;
            }

            if shares.iter().any(|s| s.index == share.index) {
                warn!(
                    file_id = %file_id,
                    backend = backend.name(),
                    index = %share.index,
                    "Ignoring duplicate share index"
                );
                diagnostics.push(BackendDiagnostic::new(
                    backend.name(),
                    Stage::Get,
                    format!("duplicate share index {}", share.index),
                ));
                continue;
            }

            if let Some(first) = shares.first()
                && first.threshold != share.threshold
            {
                warn!(
                    file_id = %file_id,
                    backend = backend.name(),
                    index = %share.index,
                    threshold = share.threshold,
                    expected = first.threshold,
                    "Ignoring share with a conflicting threshold"
                );
                diagnostics.push(BackendDiagnostic::new(
                    backend.name(),
                    Stage::Get,
                    format!(
                        "share {} records threshold {}, expected {}",
                        share.index, share.threshold, first.threshold
                    ),
                ));
                continue;
            }

            debug!(
                file_id = %file_id,
                backend = backend.name(),
                index = %share.index,
                "Fetched share"
            );
            shares.push(share);
        }

        let Some(recorded) = shares.first().map(|s| s.threshold) else {
            return Err(Error::NoSharesFound {
                file_id: file_id.to_string(),
            });
        };
        let found = shares.len();
        let required = usize::from(recorded.max(request.threshold.unwrap_or(0)));
        if found < required {
            return Err(Error::InsufficientShares {
                file_id: file_id.to_string(),
                found,
                required,
            });
        }

        let combined = combine_shares(&shares)?;
        let data = self.encryptor.decrypt(&combined)?;
        splitvault_common::verify(&data, &request.fingerprint)?;

        let verified = !request.fingerprint.is_empty();
        info!(
            file_id = %file_id,
            shares = found,
            required,
            verified,
            bytes = data.len(),
            "Retrieved file"
        );

        Ok(RetrieveReport {
            file_id: file_id.clone(),
            data,
            shares_used: found,
            verified,
            diagnostics,
        })
    }

    /// [`retrieve`](Self::retrieve) and write the result to `destination`
    ///
    /// The destination is written only after every check passed.
    pub async fn retrieve_to_file(
        &self,
        backends: &[BackendHandle],
        request: &RetrieveRequest,
        destination: &Path,
    ) -> Result<RetrieveReport> {
        let report = self.retrieve(backends, request).await?;
        tokio::fs::write(destination, &report.data).await?;
        debug!(path = %destination.display(), bytes = report.data.len(), "Wrote destination file");
        Ok(report)
    }

    /// Remove the file's share from every available backend
    ///
    /// Idempotent: deleting an unknown or already deleted file reports
    /// nothing deleted.
    pub async fn delete(&self, backends: &[BackendHandle], file_id: &FileId) -> DeleteReport {
        let (available, diagnostics) = self.probe_all(backends).await;

        let mut report = DeleteReport::new(file_id.clone());
        report.skipped = backends.len() - available.len();
        report.diagnostics = diagnostics;

        for backend in available {
            match self.call(backend.delete(file_id)).await {
                Ok(()) => {
                    debug!(file_id = %file_id, backend = backend.name(), "Deleted share");
                    report.deleted += 1;
                }
                Err(e) if e.is_not_found() => {
                    debug!(file_id = %file_id, backend = backend.name(), "No share on backend");
                    report.not_found += 1;
                }
                Err(e) => {
                    warn!(
                        file_id = %file_id,
                        backend = backend.name(),
                        error = %e,
                        "Failed to delete share"
                    );
                    report.failed += 1;
                    report.diagnostics.push(BackendDiagnostic::new(
                        backend.name(),
                        Stage::Delete,
                        e.to_string(),
                    ));
                }
            }
        }

        info!(
            file_id = %file_id,
            deleted = report.deleted,
            not_found = report.not_found,
            failed = report.failed,
            skipped = report.skipped,
            "Deleted file"
        );
        report
    }

    /// Run one backend call under the operation timeout
    async fn call<T>(&self, fut: impl Future<Output = BackendResult<T>>) -> BackendResult<T> {
        let timeout = self.options.operation_timeout;
        tokio::time::timeout(timeout, fut)
            .await
            .unwrap_or_else(|_| Err(BackendError::Timeout(timeout)))
    }

    /// Probe every backend and keep the available ones, in caller order
    async fn probe_all<'a>(
        &self,
        backends: &'a [BackendHandle],
    ) -> (Vec<&'a BackendHandle>, Vec<BackendDiagnostic>) {
        let results = if self.options.parallel_probe {
            join_all(backends.iter().map(|b| self.call(b.is_available()))).await
        } else {
            let mut results = Vec::with_capacity(backends.len());
            for backend in backends {
                results.push(self.call(backend.is_available()).await);
            }
            results
        };

        let mut available = Vec::with_capacity(backends.len());
        let mut diagnostics = Vec::new();
        for (backend, result) in backends.iter().zip(results) {
            match result {
                Ok(true) => available.push(backend),
                Ok(false) => {
                    warn!(backend = backend.name(), "Backend unavailable, skipping");
                    diagnostics.push(BackendDiagnostic::new(
                        backend.name(),
                        Stage::Probe,
                        "unavailable",
                    ));
                }
                Err(e) => {
                    warn!(backend = backend.name(), error = %e, "Availability probe failed, skipping");
                    diagnostics.push(BackendDiagnostic::new(
                        backend.name(),
                        Stage::Probe,
                        e.to_string(),
                    ));
                }
            }
        }
        (available, diagnostics)
    }
}
