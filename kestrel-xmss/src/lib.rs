//! XMSS and XMSS-MT (RFC 8391) Implementation
//!
//! This crate provides a pure Rust implementation of the eXtended Merkle
//! Signature Scheme and its multi-tree variant. Both are stateful hash-based
//! signature schemes: a key pair owns a finite number of WOTS+ one-time keys,
//! and every signature consumes one of them. Security rests solely on the
//! hash functions.
//!
//! # Supported Parameter Sets
//!
//! All RFC 8391 parameter sets with w = 16:
//!
//! | Family | Heights | Hash | n |
//! |--------|---------|------|---|
//! | XMSS | 10, 16, 20 | SHA-256, SHAKE128 | 32 |
//! | XMSS | 10, 16, 20 | SHA-512, SHAKE256 | 64 |
//! | XMSS-MT | 20/2, 20/4, 40/2, 40/4, 40/8, 60/3, 60/6, 60/12 | SHA-256, SHAKE128 | 32 |
//! | XMSS-MT | 20/2, 20/4, 40/2, 40/4, 40/8, 60/3, 60/6, 60/12 | SHA-512, SHAKE256 | 64 |
//!
//! Custom sets (w = 4 or 16, any `h` divisible by `d`) are available through
//! [`Params::new`] and the generic [`XmssSigningKey`] / [`XmssMtSigningKey`].
//!
//! # Architecture
//!
//! - **WOTS+**: Winternitz one-time signatures over keyed hash chains
//! - **L-tree**: compresses a WOTS+ public key into one Merkle leaf
//! - **Treehash**: stack-based Merkle node construction
//! - **BDS**: amortized authentication path traversal, bounded work per signature
//!
//! # State handling
//!
//! Signing takes the key by `&mut` and advances it before the signature is
//! returned. Export the key with `to_bytes` and persist it before releasing
//! each signature; signing twice from the same persisted state reuses a
//! one-time key and breaks the scheme.
//!
//! # Example
//!
//! ```rust
//! use kestrel_xmss::XmssSha2_10_256;
//! use kestrel_core::StatefulSigner;
//!
//! let mut rng = rand::rng();
//! let (mut sk, pk) = XmssSha2_10_256::keygen(&mut rng).unwrap();
//!
//! let message = b"Hello, post-quantum world!";
//! let signature = XmssSha2_10_256::sign(&mut sk, message).unwrap();
//!
//! assert!(XmssSha2_10_256::verify(&pk, message, &signature).is_ok());
//! assert_eq!(XmssSha2_10_256::remaining_signatures(&sk), 1023);
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![deny(unsafe_code)]
#![warn(missing_docs, clippy::pedantic)]
// Clippy allowances for cryptographic code patterns
#![allow(
    clippy::many_single_char_names,
    clippy::similar_names,
    clippy::too_many_arguments,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_possible_wrap,
    clippy::cast_lossless,
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::doc_markdown,
    clippy::wildcard_imports,
    clippy::too_many_lines,
    clippy::items_after_statements,
    clippy::needless_range_loop
)]

// alloc is available in both std and no_std environments
extern crate alloc;

// Core modules
mod address;
mod hash;
/// SHA2-based hash suites.
#[cfg(feature = "sha2")]
pub mod hash_sha2;
/// SHAKE-based hash suites.
#[cfg(feature = "shake")]
pub mod hash_shake;
/// Parameter sets and the RFC 8391 OID registry.
pub mod params;
mod types;
mod utils;

// Building blocks
/// BDS authentication path traversal.
pub mod bds;
mod ltree;
/// Merkle tree construction and root recomputation.
pub mod treehash;
/// WOTS+ one-time signatures.
pub mod wots;

// Schemes
/// Keys, signatures and verification shared by XMSS and XMSS-MT.
pub mod sign;
mod xmss;
mod xmss_mt;

// Registered parameter sets
#[cfg(feature = "sha2")]
mod xmss_mt_sha2;
#[cfg(feature = "shake")]
mod xmss_mt_shake;
#[cfg(feature = "sha2")]
mod xmss_sha2;
#[cfg(feature = "shake")]
mod xmss_shake;

// Public exports
pub use address::{Address, AdrsType};
pub use hash::HashSuite;
#[cfg(feature = "sha2")]
pub use hash_sha2::{Sha2_256Hash, Sha2_512Hash};
#[cfg(feature = "shake")]
pub use hash_shake::{Shake128Hash, Shake256Hash};
pub use params::{HashFunction, Params};
pub use sign::{PublicKey, Signature};
pub use xmss::{xmss_verify, XmssSigningKey};
pub use xmss_mt::{xmss_mt_verify, XmssMtSigningKey};

// Re-export core types
pub use kestrel_core::{Error, Result, StatefulSigner};

// Variant exports
#[cfg(feature = "sha2")]
pub use xmss_mt_sha2::*;
#[cfg(feature = "shake")]
pub use xmss_mt_shake::*;
#[cfg(feature = "sha2")]
pub use xmss_sha2::*;
#[cfg(feature = "shake")]
pub use xmss_shake::*;
