//! Error types for kestrel signature operations.

use core::fmt;

/// Result type alias using [`Error`].
pub type Result<T> = core::result::Result<T, Error>;

/// Errors that can occur during key generation, signing, verification
/// or (de)serialization of keys and signing state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    /// Invalid key length provided.
    InvalidKeyLength {
        /// Expected length in bytes.
        expected: usize,
        /// Actual length provided.
        actual: usize,
    },

    /// Invalid signature length.
    InvalidSignatureLength {
        /// Expected length in bytes.
        expected: usize,
        /// Actual length provided.
        actual: usize,
    },

    /// Invalid length of a serialized signing state.
    InvalidStateLength {
        /// Expected length in bytes.
        expected: usize,
        /// Actual length provided.
        actual: usize,
    },

    /// Every one-time key of the signing key has been used.
    ///
    /// The signing context is permanently unusable; a new key pair is required.
    KeyExhausted,

    /// Signature verification failed.
    VerificationFailed,

    /// Insufficient randomness provided.
    InsufficientRandomness,

    /// Encoding or decoding error.
    EncodingError,

    /// Parameter set not supported.
    UnsupportedParameterSet,

    /// The BDS retain parameter is odd or larger than the tree height.
    InvalidBdsParameter {
        /// Requested retain parameter.
        k: u32,
        /// Height of a single tree of the parameter set.
        tree_height: u32,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidKeyLength { expected, actual } => {
                write!(f, "invalid key length: expected {expected}, got {actual}")
            }
            Error::InvalidSignatureLength { expected, actual } => {
                write!(
                    f,
                    "invalid signature length: expected {expected}, got {actual}"
                )
            }
            Error::InvalidStateLength { expected, actual } => {
                write!(
                    f,
                    "invalid signing state length: expected {expected}, got {actual}"
                )
            }
            Error::KeyExhausted => write!(f, "signing key exhausted"),
            Error::VerificationFailed => write!(f, "signature verification failed"),
            Error::InsufficientRandomness => write!(f, "insufficient randomness provided"),
            Error::EncodingError => write!(f, "encoding or decoding error"),
            Error::UnsupportedParameterSet => write!(f, "unsupported parameter set"),
            Error::InvalidBdsParameter { k, tree_height } => {
                write!(
                    f,
                    "invalid BDS parameter k={k} for tree height {tree_height}"
                )
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}
