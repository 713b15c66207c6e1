//! SHA2-based hash suites for XMSS.
//!
//! RFC 8391, Section 5.1: the `_256` parameter sets use SHA-256 (n = 32),
//! the `_512` sets use SHA-512 (n = 64). The full digest is used as output.

use crate::hash::HashSuite;
use crate::params::HashFunction;
use sha2::{Digest, Sha256, Sha512};

/// SHA-256 hash suite (n = 32).
pub struct Sha2_256Hash;

/// SHA-512 hash suite (n = 64).
pub struct Sha2_512Hash;

/// Macro to implement HashSuite for a SHA2 digest of matching output size.
macro_rules! impl_sha2_hash_suite {
    ($name:ident, $digest:ty, $n:expr, $func:expr) => {
        impl HashSuite<$n> for $name {
            const FUNCTION: HashFunction = $func;

            fn core(parts: &[&[u8]]) -> [u8; $n] {
                let mut hasher = <$digest>::new();
                for part in parts {
                    hasher.update(part);
                }
                let mut output = [0u8; $n];
                output.copy_from_slice(&hasher.finalize());
                output
            }
        }
    };
}

impl_sha2_hash_suite!(Sha2_256Hash, Sha256, 32, HashFunction::Sha2_256);
impl_sha2_hash_suite!(Sha2_512Hash, Sha512, 64, HashFunction::Sha2_512);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::Address;

    #[test]
    fn test_core_matches_sha256() {
        let out = Sha2_256Hash::core(&[b"a", b"bc"]);
        assert_eq!(
            hex::encode(out),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_core_matches_sha512() {
        let out = Sha2_512Hash::core(&[b"abc"]);
        assert_eq!(
            hex::encode(out),
            "ddaf35a193617abacc417349ae20413112e6fa4e89a97ea20a9eeee64b55d39a\
             2192992a274fc1a836ba3c23a3feebbd454d4423643ce80e2a9ac94fa54ca49f"
        );
    }

    #[test]
    fn test_prf_is_prefixed_core() {
        let key = [7u8; 32];
        let input = [9u8; 32];
        let mut prefix = [0u8; 32];
        prefix[31] = 3;
        assert_eq!(
            Sha2_256Hash::prf(&key, &input),
            Sha2_256Hash::core(&[&prefix, &key, &input])
        );
    }

    #[test]
    fn test_f_uses_key_and_mask_word() {
        let seed = [1u8; 32];
        let input = [2u8; 32];
        let mut adrs = Address::new();

        let out1 = Sha2_256Hash::f(&input, &seed, &mut adrs);
        assert_eq!(adrs.key_and_mask(), 1);

        // F recomputes key and mask, so a dirty key-and-mask word is ignored.
        let out2 = Sha2_256Hash::f(&input, &seed, &mut adrs);
        assert_eq!(out1, out2);
    }

    #[test]
    fn test_h_is_order_sensitive() {
        let seed = [0u8; 64];
        let a = [1u8; 64];
        let b = [2u8; 64];
        let mut adrs = Address::new();

        let ab = Sha2_512Hash::h(&a, &b, &seed, &mut adrs);
        assert_eq!(adrs.key_and_mask(), 2);
        let ba = Sha2_512Hash::h(&b, &a, &seed, &mut adrs);
        assert_ne!(ab, ba);
    }

    #[test]
    fn test_h_msg_binds_index() {
        let r = [3u8; 32];
        let root = [4u8; 32];
        let d0 = Sha2_256Hash::h_msg(&r, &root, 0, b"message");
        let d1 = Sha2_256Hash::h_msg(&r, &root, 1, b"message");
        assert_ne!(d0, d1);
    }
}
