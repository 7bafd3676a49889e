//! SplitVault Secret Sharing - Shamir's scheme over GF(2^8)
//!
//! Every byte of the input is protected independently: for each offset a
//! random polynomial of degree `threshold - 1` is drawn whose constant term is
//! the input byte, and share `x` receives the polynomial evaluated at `x`.
//! Any `threshold` shares recover the constant term by Lagrange
//! interpolation; fewer reveal nothing about it.
//!
//! # Example
//!
//! ```
//! use splitvault_sss::{combine, split};
//!
//! let shares = split(b"Hello, World!", 5, 3).unwrap();
//! let subset = shares.into_iter().skip(2).collect();
//! assert_eq!(combine(&subset).unwrap(), b"Hello, World!");
//! ```
//!
//! The raw `combine` step carries no checksum of its own: an under-threshold
//! share set silently yields wrong bytes. `combine_shares` works on [`Share`]
//! values, which record their threshold, and refuses such sets. Integrity
//! is checked by the caller with a content fingerprint.

pub mod codec;
pub mod gf256;
pub mod share;

pub use codec::{SharingCodec, SharingError, combine, combine_shares, split, split_with_rng};
pub use gf256::Gf256;
pub use share::Share;
