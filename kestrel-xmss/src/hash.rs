//! Hash function abstraction for XMSS.
//!
//! RFC 8391 builds every keyed function from a single digest `core` that is
//! domain separated by an n-byte prefix (Section 5.1):
//!
//! - **F**: `core(toByte(0, n) || KEY || M)`, the WOTS+ chaining function
//! - **H**: `core(toByte(1, n) || KEY || M)`, the two-to-one tree hash
//! - **H_msg**: `core(toByte(2, n) || KEY || M)`, the message digest
//! - **PRF**: `core(toByte(3, n) || KEY || M)`, keyed pseudorandom function
//! - **PRF_keygen**: `core(toByte(4, n) || SK_SEED || SEED || ADRS)`, WOTS+ secret derivation
//!
//! Implementations only supply `core`; the keyed constructions with their
//! bitmasks are provided methods.

use crate::address::Address;
use crate::params::HashFunction;
use crate::utils::to_byte;

/// Domain separation prefixes (RFC 8391, Section 5.1).
const PREFIX_F: u64 = 0;
const PREFIX_H: u64 = 1;
const PREFIX_HASH_MSG: u64 = 2;
const PREFIX_PRF: u64 = 3;
const PREFIX_PRF_KEYGEN: u64 = 4;

/// Hash function suite trait for XMSS.
///
/// `N` is the digest length in bytes. Implementations provide the raw digest
/// over a sequence of byte strings; every XMSS function is derived from it.
pub trait HashSuite<const N: usize> {
    /// Hash function family this suite implements.
    const FUNCTION: HashFunction;

    /// `core(parts[0] || parts[1] || ...)`, truncated or extended to `N` bytes.
    fn core(parts: &[&[u8]]) -> [u8; N];

    /// PRF: `core(toByte(3, n) || key || input)`.
    ///
    /// Used with a 32-byte address (keys and bitmasks) or a 32-byte index
    /// (message randomizer).
    fn prf(key: &[u8; N], input: &[u8; 32]) -> [u8; N] {
        Self::core(&[&to_byte::<N>(PREFIX_PRF), key, input])
    }

    /// PRF_keygen: derive a WOTS+ secret chain start.
    ///
    /// The caller owns the returned secret and must zeroize it.
    fn prf_keygen(sk_seed: &[u8; N], pub_seed: &[u8; N], adrs: &Address) -> [u8; N] {
        Self::core(&[
            &to_byte::<N>(PREFIX_PRF_KEYGEN),
            sk_seed,
            pub_seed,
            adrs.as_bytes(),
        ])
    }

    /// Keyed chaining function with bitmask (RFC 8391, Algorithm 2 step).
    ///
    /// Overwrites the key-and-mask word of `adrs`.
    fn f(input: &[u8; N], pub_seed: &[u8; N], adrs: &mut Address) -> [u8; N] {
        adrs.set_key_and_mask(0);
        let key = Self::prf(pub_seed, adrs.as_bytes());
        adrs.set_key_and_mask(1);
        let mut masked = Self::prf(pub_seed, adrs.as_bytes());
        for (m, x) in masked.iter_mut().zip(input.iter()) {
            *m ^= x;
        }
        Self::core(&[&to_byte::<N>(PREFIX_F), &key, &masked])
    }

    /// Keyed two-to-one hash with bitmasks (RFC 8391, Algorithm 7).
    ///
    /// Overwrites the key-and-mask word of `adrs`.
    fn h(left: &[u8; N], right: &[u8; N], pub_seed: &[u8; N], adrs: &mut Address) -> [u8; N] {
        adrs.set_key_and_mask(0);
        let key = Self::prf(pub_seed, adrs.as_bytes());
        adrs.set_key_and_mask(1);
        let mut masked_left = Self::prf(pub_seed, adrs.as_bytes());
        adrs.set_key_and_mask(2);
        let mut masked_right = Self::prf(pub_seed, adrs.as_bytes());
        for i in 0..N {
            masked_left[i] ^= left[i];
            masked_right[i] ^= right[i];
        }
        Self::core(&[&to_byte::<N>(PREFIX_H), &key, &masked_left, &masked_right])
    }

    /// H_msg: digest of the message under the randomized key `r || root || toByte(idx, n)`.
    fn h_msg(r: &[u8; N], root: &[u8; N], idx: u64, message: &[u8]) -> [u8; N] {
        Self::core(&[
            &to_byte::<N>(PREFIX_HASH_MSG),
            r,
            root,
            &to_byte::<N>(idx),
            message,
        ])
    }

    /// Message randomizer `r = PRF(SK_PRF, toByte(idx, 32))`.
    fn prf_index(sk_prf: &[u8; N], idx: u64) -> [u8; N] {
        Self::prf(sk_prf, &to_byte::<32>(idx))
    }
}
