//! Backend factory
//!
//! Builds backend handles from the `[[backends]]` records of the stores file.

use crate::backend::BackendHandle;
use crate::local::LocalBackend;
use crate::memory::MemoryBackend;
use splitvault_common::{BackendConfig, Config};
use std::sync::Arc;
use tracing::debug;

/// Factory for creating share backends
pub struct BackendFactory;

impl BackendFactory {
    /// Create the backend described by `config`
    ///
    /// # Arguments
    /// * `config` - Backend record
    /// * `position` - Position in the stores file, used for the default name
    pub fn create(config: &BackendConfig, position: usize) -> BackendHandle {
        let name = config.display_name(position);
        debug!(backend = %name, kind = config.type_name(), "Creating backend");

        match config {
            BackendConfig::Local { directory_path, .. } => {
                Arc::new(LocalBackend::new(name, directory_path.clone()))
            }
            BackendConfig::Memory { .. } => Arc::new(MemoryBackend::new(name)),
        }
    }

    /// Create every configured backend, preserving order
    pub fn create_all(config: &Config) -> Vec<BackendHandle> {
        config
            .backends
            .iter()
            .enumerate()
            .map(|(position, backend)| Self::create(backend, position))
            .collect()
    }
}
