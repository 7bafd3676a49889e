//! Orchestrator options

use splitvault_common::DistributionConfig;
use std::time::Duration;

/// Per-operation behaviour of the [`Distributor`](crate::Distributor)
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DistributorOptions {
    /// Upper bound on every individual backend call
    pub operation_timeout: Duration,
    /// Probe backend availability concurrently
    ///
    /// Results are still consumed in backend order, so placement does not
    /// depend on which probe finishes first.
    pub parallel_probe: bool,
}

impl DistributorOptions {
    /// Set the per-call timeout
    #[must_use]
    pub const fn with_operation_timeout(mut self, timeout: Duration) -> Self {
        self.operation_timeout = timeout;
        self
    }

    /// Enable or disable concurrent probing
    #[must_use]
    pub const fn with_parallel_probe(mut self, parallel: bool) -> Self {
        self.parallel_probe = parallel;
        self
    }
}

impl Default for DistributorOptions {
    fn default() -> Self {
        Self::from(&DistributionConfig::default())
    }
}

impl From<&DistributionConfig> for DistributorOptions {
    fn from(config: &DistributionConfig) -> Self {
        Self {
            operation_timeout: config.operation_timeout(),
            parallel_probe: config.parallel_probe,
        }
    }
}
