//! SHAKE-based hash suites for XMSS.
//!
//! RFC 8391, Section 5.1: the `XMSS-SHAKE_*_256` sets use SHAKE128 with a
//! 256-bit output (n = 32), the `_512` sets use SHAKE256 with a 512-bit
//! output (n = 64).

use crate::hash::HashSuite;
use crate::params::HashFunction;
use sha3::{
    digest::{ExtendableOutput, Update, XofReader},
    Shake128, Shake256,
};

/// SHAKE128 hash suite (n = 32).
pub struct Shake128Hash;

/// SHAKE256 hash suite (n = 64).
pub struct Shake256Hash;

/// Macro to implement HashSuite for a SHAKE instance with a fixed output length.
macro_rules! impl_shake_hash_suite {
    ($name:ident, $xof:ty, $n:expr, $func:expr) => {
        impl HashSuite<$n> for $name {
            const FUNCTION: HashFunction = $func;

            fn core(parts: &[&[u8]]) -> [u8; $n] {
                // Streaming absorb, no intermediate buffer
                let mut hasher = <$xof>::default();
                for part in parts {
                    hasher.update(part);
                }
                let mut reader = hasher.finalize_xof();
                let mut output = [0u8; $n];
                reader.read(&mut output);
                output
            }
        }
    };
}

impl_shake_hash_suite!(Shake128Hash, Shake128, 32, HashFunction::Shake128);
impl_shake_hash_suite!(Shake256Hash, Shake256, 64, HashFunction::Shake256);
