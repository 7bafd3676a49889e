//! SplitVault Distribution - spreading shares across backends
//!
//! The `Distributor` ties the pieces together:
//!
//! ```text
//! store:    plaintext -> encrypt -> split -> put share i on next available backend
//! retrieve: get from every available backend -> combine -> decrypt -> verify
//! delete:   delete on every available backend
//! ```
//!
//! Backend failures never abort an operation. Each one is logged through
//! `tracing` and recorded as a [`BackendDiagnostic`] in the returned report;
//! only configuration and integrity problems surface as errors.

pub mod distributor;
pub mod options;
pub mod report;

pub use distributor::{Distributor, RetrieveRequest};
pub use options::DistributorOptions;
pub use report::{
    BackendDiagnostic, DeleteReport, DeleteStatus, Placement, RetrieveReport, Stage, StoreReport,
};
