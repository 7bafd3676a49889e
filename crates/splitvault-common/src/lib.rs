//! SplitVault Common - Shared types and utilities
//!
//! This crate provides the identifiers, sharing parameters, error type,
//! content fingerprinting, and configuration records used across all
//! SplitVault components.

pub mod config;
pub mod error;
pub mod fingerprint;
pub mod types;

pub use config::{BackendConfig, Config, DistributionConfig};
pub use error::{Error, Result};
pub use fingerprint::{fingerprint, verify};
pub use types::*;
