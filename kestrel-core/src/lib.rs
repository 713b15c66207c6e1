//! # Kestrel Core
//!
//! Core traits and utilities for the kestrel hash-based signature library.
//!
//! This crate provides:
//! - Common error types
//! - The [`StatefulSigner`] trait for schemes with a finite one-time key supply
//! - Secure memory handling with zeroize integration

#![cfg_attr(not(feature = "std"), no_std)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

mod error;
mod traits;

pub use error::{Error, Result};
pub use traits::StatefulSigner;

/// Re-export zeroize for convenience.
pub use zeroize::{Zeroize, ZeroizeOnDrop};

/// Re-export subtle for constant-time operations.
pub use subtle;
