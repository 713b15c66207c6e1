//! Property-based tests for XMSS and XMSS-MT using proptest.
//!
//! These tests verify fundamental signature properties on small custom
//! parameter sets (h = 4) so each case builds its trees quickly:
//! - Roundtrip: a fresh signature verifies, sizes match the parameter set
//! - Wrong key: verification under another key pair fails
//! - Tampered message: verification of a modified message fails
//! - Monotonic index: consecutive signatures carry consecutive indices

#![cfg(feature = "shake")]

use kestrel_xmss::{
    xmss_mt_verify, xmss_verify, HashFunction, Params, Shake128Hash, XmssMtSigningKey,
    XmssSigningKey,
};
use proptest::prelude::*;

const N: usize = 32;

/// Generate arbitrary 32-byte seeds for testing
fn arb_seed() -> impl Strategy<Value = [u8; 32]> {
    prop::array::uniform32(any::<u8>())
}

/// Generate arbitrary messages (0-128 bytes)
fn arb_message() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 0..128)
}

fn xmss_params() -> Params {
    Params::new(HashFunction::Shake128, 16, 4, 1).unwrap()
}

fn mt_params() -> Params {
    Params::new(HashFunction::Shake128, 16, 4, 2).unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(8))]

    /// Basic properties: roundtrip sign/verify and encoded sizes.
    #[test]
    fn xmss_basic_properties(seed in arb_seed(), message in arb_message()) {
        let params = xmss_params();
        let (mut sk, pk) =
            XmssSigningKey::<Shake128Hash, N>::from_seed(params, 2, seed, [7u8; N], seed).unwrap();

        prop_assert_eq!(pk.to_bytes().len(), params.public_key_bytes());

        let sig = sk.sign(&message).unwrap();
        prop_assert_eq!(sig.to_bytes().len(), params.signature_bytes());
        prop_assert!(xmss_verify::<Shake128Hash, N>(&pk, &message, &sig).is_ok());
    }

    /// Verification with wrong public key fails.
    #[test]
    fn xmss_wrong_key_fails(seed1 in arb_seed(), seed2 in arb_seed(), message in arb_message()) {
        prop_assume!(seed1 != seed2);
        let params = xmss_params();

        let (mut sk1, _) =
            XmssSigningKey::<Shake128Hash, N>::from_seed(params, 0, seed1, seed1, seed1).unwrap();
        let (_, pk2) =
            XmssSigningKey::<Shake128Hash, N>::from_seed(params, 0, seed2, seed2, seed2).unwrap();

        let sig = sk1.sign(&message).unwrap();
        prop_assert!(xmss_verify::<Shake128Hash, N>(&pk2, &message, &sig).is_err());
    }

    /// Verification with tampered message fails.
    #[test]
    fn xmss_tampered_message_fails(
        seed in arb_seed(),
        message in arb_message(),
        flip_pos in 0usize..128,
        skip in 0usize..16,
    ) {
        prop_assume!(!message.is_empty());
        let params = xmss_params();
        let (mut sk, pk) =
            XmssSigningKey::<Shake128Hash, N>::from_seed(params, 0, seed, seed, seed).unwrap();

        for _ in 0..skip {
            sk.sign(b"skip").unwrap();
        }
        let sig = sk.sign(&message).unwrap();
        prop_assert_eq!(sig.index(), skip as u64);

        let mut tampered = message.clone();
        let pos = flip_pos % tampered.len();
        tampered[pos] ^= 0xFF;

        prop_assert!(xmss_verify::<Shake128Hash, N>(&pk, &tampered, &sig).is_err());
    }

    /// XMSS-MT roundtrip at an arbitrary index, across subtree boundaries.
    #[test]
    fn xmss_mt_roundtrip_any_index(seed in arb_seed(), message in arb_message(), skip in 0usize..16) {
        let params = mt_params();
        let (mut sk, pk) =
            XmssMtSigningKey::<Shake128Hash, N>::from_seed(params, 0, seed, seed, [1u8; N]).unwrap();

        for i in 0..skip {
            let sig = sk.sign(b"skip").unwrap();
            prop_assert_eq!(sig.index(), i as u64);
        }
        let sig = sk.sign(&message).unwrap();
        prop_assert_eq!(sig.index(), skip as u64);
        prop_assert_eq!(sk.remaining_signatures(), 15 - skip as u64);
        prop_assert!(xmss_mt_verify::<Shake128Hash, N>(&pk, &message, &sig).is_ok());

        let mut other = message.clone();
        other.push(0);
        prop_assert!(xmss_mt_verify::<Shake128Hash, N>(&pk, &other, &sig).is_err());
    }
}
