//! SplitVault Store - share storage backends
//!
//! This crate defines the capability contract every storage destination
//! implements and the backends shipped with SplitVault:
//! - `LocalBackend`: one share file per file id in a local directory
//! - `MemoryBackend`: process-local map with failure injection for tests
//! - `BackendFactory`: builds handles from configuration records
//!
//! Each backend holds at most one share of a given file.

pub mod backend;
pub mod error;
pub mod factory;
pub mod local;
pub mod memory;

pub use backend::{BackendHandle, ShareBackend};
pub use error::{BackendError, BackendResult};
pub use factory::BackendFactory;
pub use local::LocalBackend;
pub use memory::MemoryBackend;
