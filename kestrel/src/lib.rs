//! # Kestrel
//!
//! Stateful hash-based post-quantum signatures (RFC 8391).
//!
//! ## Features
//!
//! - `std` (default): Enable standard library support
//! - `xmss` (default): Enable XMSS and XMSS-MT with the SHA2 and SHAKE suites
//!
//! ## Supported Algorithms
//!
//! - **XMSS**: single-tree scheme, heights 10, 16 and 20
//! - **XMSS-MT**: hypertree scheme, total heights 20, 40 and 60
//!
//! ## Example
//!
//! ```ignore
//! use kestrel::xmss::{XmssSha2_10_256, StatefulSigner};
//!
//! // Generate a key pair
//! let (mut sk, pk) = XmssSha2_10_256::keygen(&mut rng)?;
//!
//! // Sign, then persist the advanced key before releasing the signature
//! let sig = XmssSha2_10_256::sign(&mut sk, b"message")?;
//! store(&sk.to_bytes());
//!
//! XmssSha2_10_256::verify(&pk, b"message", &sig)?;
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub use kestrel_core::{Error, Result};

/// Core traits for cryptographic primitives.
pub mod traits {
    pub use kestrel_core::StatefulSigner;
}

/// XMSS and XMSS-MT (RFC 8391) stateful signatures.
#[cfg(feature = "xmss")]
pub mod xmss {
    pub use kestrel_core::StatefulSigner;
    pub use kestrel_xmss::*;
}
