//! Configuration types for SplitVault
//!
//! This module defines the stores file: the ordered list of backends and the
//! orchestrator options. Parsing from TOML happens in the CLI; these types
//! only carry serde derives and validation.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::PathBuf;
use std::time::Duration;

/// Default per-backend operation timeout
pub const DEFAULT_OPERATION_TIMEOUT_MS: u64 = 30_000;

/// Root configuration (the stores file)
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Config {
    /// Orchestrator options
    #[serde(default)]
    pub distribution: DistributionConfig,
    /// Backends in placement order
    #[serde(default)]
    pub backends: Vec<BackendConfig>,
}

impl Config {
    /// Validate the configuration
    ///
    /// Requires at least one backend and rejects two local backends sharing
    /// a directory, since that would let one location hold two shares of the
    /// same file.
    pub fn validate(&self) -> Result<()> {
        if self.backends.is_empty() {
            return Err(Error::configuration("no backends configured"));
        }

        let mut directories = HashSet::new();
        let mut names = HashSet::new();
        for (position, backend) in self.backends.iter().enumerate() {
            let name = backend.display_name(position);
            if !names.insert(name.clone()) {
                return Err(Error::configuration(format!(
                    "duplicate backend name '{name}'"
                )));
            }
            if let BackendConfig::Local { directory_path, .. } = backend {
                if directory_path.as_os_str().is_empty() {
                    return Err(Error::configuration(format!(
                        "backend '{name}' is missing 'directory_path'"
                    )));
                }
                if !directories.insert(directory_path.clone()) {
                    return Err(Error::configuration(format!(
                        "directory '{}' is used by more than one backend",
                        directory_path.display()
                    )));
                }
            }
        }

        self.distribution.validate()
    }
}

/// Orchestrator options
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct DistributionConfig {
    /// Timeout applied to every individual backend call (milliseconds)
    pub operation_timeout_ms: u64,
    /// Probe backend availability concurrently
    pub parallel_probe: bool,
}

impl DistributionConfig {
    /// Per-backend operation timeout as a `Duration`
    #[must_use]
    pub const fn operation_timeout(&self) -> Duration {
        Duration::from_millis(self.operation_timeout_ms)
    }

    fn validate(&self) -> Result<()> {
        if self.operation_timeout_ms == 0 {
            return Err(Error::configuration(
                "operation_timeout_ms must be greater than 0",
            ));
        }
        Ok(())
    }
}

impl Default for DistributionConfig {
    fn default() -> Self {
        Self {
            operation_timeout_ms: DEFAULT_OPERATION_TIMEOUT_MS,
            parallel_probe: false,
        }
    }
}

/// One backend definition, tagged by `type`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum BackendConfig {
    /// Shares stored as files in a local directory
    Local {
        /// Optional display name (defaults to `local-<position>`)
        #[serde(default)]
        name: Option<String>,
        /// Directory holding the share files
        directory_path: PathBuf,
    },
    /// Process-local, non-persistent store
    Memory {
        /// Optional display name (defaults to `memory-<position>`)
        #[serde(default)]
        name: Option<String>,
    },
}

impl BackendConfig {
    /// Backend type name as written in the stores file
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Local { .. } => "local",
            Self::Memory { .. } => "memory",
        }
    }

    /// Name used in logs, falling back to `<type>-<position>`
    #[must_use]
    pub fn display_name(&self, position: usize) -> String {
        let name = match self {
            Self::Local { name, .. } | Self::Memory { name } => name.as_deref(),
        };
        name.map_or_else(
            || format!("{}-{position}", self.type_name()),
            str::to_string,
        )
    }
}
