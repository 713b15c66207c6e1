//! XMSS (eXtended Merkle Signature Scheme) with a single tree.
//!
//! One tree of height `h` carries `2^h` WOTS+ key pairs. The signing key
//! keeps its BDS traversal state next to the seeds, so each signature costs
//! one WOTS+ signature plus at most `1 + ceil((h - k) / 2)` leaf computations.
//!
//! RFC 8391, Algorithms 10-14; authentication paths from [`crate::bds`].

use core::fmt;
use core::marker::PhantomData;

use crate::address::Address;
use crate::bds::BdsState;
use crate::hash::HashSuite;
use crate::ltree::ltree;
use crate::params::{Params, MAX_WOTS_LEN};
use crate::sign::{
    check_suite, loaded_index, stored_index, verify, PublicKey, SecretSeeds, Signature,
};
use crate::treehash::compute_root;
use crate::utils::{to_int, write_int};
use crate::wots::{wots_pk_from_sig, wots_sign_to};
use kestrel_core::{Error, Result};
use rand_core::TryCryptoRng;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

#[cfg(not(feature = "std"))]
use alloc::{vec, vec::Vec};

/// Sign `msg` with leaf `leaf` of the tree at `subtree`.
///
/// Writes `WOTS+ signature || auth path` (`(len + tree_height) * n` bytes);
/// the path is taken from `state`, which must be positioned at `leaf`.
pub(crate) fn tree_sign_to<H: HashSuite<N>, const N: usize>(
    out: &mut [u8],
    msg: &[u8; N],
    sk_seed: &[u8; N],
    pub_seed: &[u8; N],
    leaf: u32,
    subtree: &Address,
    state: &BdsState<N>,
    params: &Params,
) {
    debug_assert_eq!(out.len(), params.reduced_sig_bytes());
    let (wots_sig, auth) = out.split_at_mut(params.wots_sig_bytes());
    let mut ots_adrs = subtree.ots_for(leaf);
    wots_sign_to::<H, N>(wots_sig, msg, sk_seed, pub_seed, &mut ots_adrs, params);
    state.write_auth(auth);
}

/// Recompute the root of the tree at `subtree` from one layer's signature.
///
/// RFC 8391, Algorithm 13: XMSS_rootFromSig
pub(crate) fn root_from_sig<H: HashSuite<N>, const N: usize>(
    msg: &[u8; N],
    sig: &[u8],
    leaf: u32,
    pub_seed: &[u8; N],
    subtree: &Address,
    params: &Params,
) -> [u8; N] {
    let (wots_sig, auth) = sig.split_at(params.wots_sig_bytes());

    let mut buf = [[0u8; N]; MAX_WOTS_LEN];
    let pk = &mut buf[..params.wots_len()];
    let mut ots_adrs = subtree.ots_for(leaf);
    wots_pk_from_sig::<H, N>(pk, wots_sig, msg, pub_seed, &mut ots_adrs, params);

    let mut ltree_adrs = subtree.ltree_for(leaf);
    let leaf_node = ltree::<H, N>(pk, pub_seed, &mut ltree_adrs);
    compute_root::<H, N>(&leaf_node, leaf, auth, pub_seed, subtree)
}

/// XMSS signing key: seeds, next leaf index and BDS traversal state.
///
/// Every signature consumes one leaf and advances the key, so the key is used
/// by exclusive reference and deliberately not `Clone`. Persist the exported
/// key ([`Self::to_bytes`]) after each signature and before releasing it.
pub struct XmssSigningKey<H: HashSuite<N>, const N: usize> {
    params: Params,
    seeds: SecretSeeds<N>,
    idx: u64,
    state: BdsState<N>,
    _hash: PhantomData<fn() -> H>,
}

impl<H: HashSuite<N>, const N: usize> XmssSigningKey<H, N> {
    /// Generate a key pair from `3n` bytes of `rng`.
    ///
    /// Fails with [`Error::InsufficientRandomness`] if `rng` reports an error.
    ///
    /// RFC 8391, Algorithm 10: XMSS_keyGen. `bds_k` trades memory for signing
    /// time and must be even and at most `h`.
    pub fn generate(
        params: Params,
        bds_k: u32,
        rng: &mut impl TryCryptoRng,
    ) -> Result<(Self, PublicKey<N>)> {
        Self::check_params(&params, bds_k)?;
        Self::from_seeds(params, bds_k, SecretSeeds::generate(rng)?)
    }

    /// Generate a key pair from explicit seeds.
    pub fn from_seed(
        params: Params,
        bds_k: u32,
        sk_seed: [u8; N],
        sk_prf: [u8; N],
        pub_seed: [u8; N],
    ) -> Result<(Self, PublicKey<N>)> {
        Self::check_params(&params, bds_k)?;
        let seeds = SecretSeeds {
            sk_seed,
            sk_prf,
            pub_seed,
            root: [0u8; N],
        };
        Self::from_seeds(params, bds_k, seeds)
    }

    fn check_params(params: &Params, bds_k: u32) -> Result<()> {
        check_suite::<H, N>(params)?;
        if params.is_multi_tree() {
            return Err(Error::UnsupportedParameterSet);
        }
        params.check_bds_k(bds_k)
    }

    fn from_seeds(
        params: Params,
        bds_k: u32,
        mut seeds: SecretSeeds<N>,
    ) -> Result<(Self, PublicKey<N>)> {
        let mut state = BdsState::new(&params, bds_k)?;
        let subtree = Address::subtree(0, 0);
        seeds.root = state.init::<H>(&seeds.sk_seed, &seeds.pub_seed, &subtree, &params)?;

        tracing::debug!(
            params = params.name().unwrap_or("custom"),
            oid = params.oid(),
            bds_k,
            "generated XMSS key pair"
        );

        let pk = PublicKey::new(params, seeds.root, seeds.pub_seed);
        let sk = Self {
            params,
            seeds,
            idx: 0,
            state,
            _hash: PhantomData,
        };
        Ok((sk, pk))
    }

    /// Parameter set of the key.
    #[must_use]
    pub fn params(&self) -> &Params {
        &self.params
    }

    /// Next leaf index to be used.
    #[must_use]
    pub fn index(&self) -> u64 {
        self.idx
    }

    /// Number of signatures left.
    #[must_use]
    pub fn remaining_signatures(&self) -> u64 {
        self.params.max_signatures().saturating_sub(self.idx)
    }

    /// BDS retain parameter chosen at key generation.
    #[must_use]
    pub fn bds_k(&self) -> u32 {
        self.state.k()
    }

    /// The matching public key.
    #[must_use]
    pub fn public_key(&self) -> PublicKey<N> {
        PublicKey::new(self.params, self.seeds.root, self.seeds.pub_seed)
    }

    /// Sign `message` and return the signature.
    pub fn sign(&mut self, message: &[u8]) -> Result<Signature> {
        let mut out = vec![0u8; self.params.signature_bytes()];
        self.sign_to(&mut out, message)?;
        Ok(Signature::new(self.params, out))
    }

    /// Sign `message` into `out` (`signature_bytes()` long).
    ///
    /// RFC 8391, Algorithms 11 and 12. The index is advanced before the
    /// signature is computed and the authentication path of the next leaf is
    /// prepared before returning. Fails with [`Error::KeyExhausted`] without
    /// touching `out` once all `2^h` leaves are used. If the traversal state
    /// turns out to be inconsistent, `out` is cleared and the index is left
    /// where it was.
    pub fn sign_to(&mut self, out: &mut [u8], message: &[u8]) -> Result<()> {
        if self.idx >= self.params.max_signatures() {
            tracing::warn!(index = self.idx, "signing attempted with exhausted XMSS key");
            return Err(Error::KeyExhausted);
        }
        let expected = self.params.signature_bytes();
        if out.len() != expected {
            return Err(Error::InvalidSignatureLength {
                expected,
                actual: out.len(),
            });
        }

        self.state.check()?;

        let idx = self.idx;
        let leaf = idx as u32;
        self.idx += 1;

        let ib = self.params.index_bytes();
        let (r, digest) = self.seeds.randomize::<H>(idx, message);
        write_int(&mut out[..ib], idx);
        out[ib..ib + N].copy_from_slice(&r);

        let subtree = Address::subtree(0, 0);
        tree_sign_to::<H, N>(
            &mut out[ib + N..],
            &digest,
            &self.seeds.sk_seed,
            &self.seeds.pub_seed,
            leaf,
            &subtree,
            &self.state,
            &self.params,
        );

        if u64::from(leaf) + 1 < self.params.max_signatures() {
            let seeds = &self.seeds;
            self.state
                .round::<H>(leaf, &seeds.sk_seed, &seeds.pub_seed, &subtree, &self.params);
            let budget = self.state.budget();
            let updated = self.state.treehash_update::<H>(
                budget,
                &seeds.sk_seed,
                &seeds.pub_seed,
                &subtree,
                &self.params,
            );
            if let Err(err) = updated {
                tracing::error!(index = idx, "XMSS traversal state is inconsistent");
                out.zeroize();
                self.idx = idx;
                return Err(err);
            }
        } else {
            tracing::warn!(index = idx, "last XMSS one-time key consumed");
            self.seeds.wipe();
        }

        tracing::trace!(index = idx, remaining = self.remaining_signatures(), "XMSS signature");
        Ok(())
    }

    /// Size of the exported key: secret key, `bds_k` (4 bytes) and BDS state.
    #[must_use]
    pub fn exported_size(params: &Params, bds_k: u32) -> usize {
        params.secret_key_bytes() + 4 + BdsState::<N>::serialized_size(params, bds_k)
    }

    /// Export the full signing context.
    ///
    /// Layout: `OID || idx || SK_SEED || SK_PRF || root || SEED || bds_k (4) || BDS state`.
    #[must_use]
    pub fn to_bytes(&self) -> Zeroizing<Vec<u8>> {
        let sk_len = self.params.secret_key_bytes();
        let mut out = Zeroizing::new(vec![0u8; Self::exported_size(&self.params, self.bds_k())]);
        let idx = stored_index(&self.params, self.idx);
        self.seeds
            .write_secret_key(&mut out[..sk_len], &self.params, idx);
        write_int(&mut out[sk_len..sk_len + 4], u64::from(self.bds_k()));
        self.state.write_to(&mut out[sk_len + 4..]);
        out
    }

    /// Import a signing context exported by [`Self::to_bytes`].
    pub fn from_bytes(params: Params, bytes: &[u8]) -> Result<Self> {
        check_suite::<H, N>(&params)?;
        if params.is_multi_tree() {
            return Err(Error::UnsupportedParameterSet);
        }
        let sk_len = params.secret_key_bytes();
        if bytes.len() < sk_len + 4 {
            return Err(Error::InvalidKeyLength {
                expected: sk_len + 4,
                actual: bytes.len(),
            });
        }
        let bds_k = to_int(&bytes[sk_len..sk_len + 4]) as u32;
        params.check_bds_k(bds_k)?;
        let expected = Self::exported_size(&params, bds_k);
        if bytes.len() != expected {
            return Err(Error::InvalidKeyLength {
                expected,
                actual: bytes.len(),
            });
        }

        let (seeds, raw_idx) = SecretSeeds::read_secret_key(&bytes[..sk_len], &params)?;
        let idx = loaded_index(&params, raw_idx, seeds.is_wiped())?;
        let state = BdsState::from_bytes(&params, bds_k, &bytes[sk_len + 4..])?;

        Ok(Self {
            params,
            seeds,
            idx,
            state,
            _hash: PhantomData,
        })
    }
}

impl<H: HashSuite<N>, const N: usize> fmt::Debug for XmssSigningKey<H, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("XmssSigningKey")
            .field("params", &self.params.name())
            .field("index", &self.idx)
            .field("bds_k", &self.bds_k())
            .finish_non_exhaustive()
    }
}

impl<H: HashSuite<N>, const N: usize> Zeroize for XmssSigningKey<H, N> {
    fn zeroize(&mut self) {
        self.seeds.zeroize();
        self.state.zeroize();
    }
}

impl<H: HashSuite<N>, const N: usize> ZeroizeOnDrop for XmssSigningKey<H, N> {}

impl<H: HashSuite<N>, const N: usize> Drop for XmssSigningKey<H, N> {
    fn drop(&mut self) {
        self.zeroize();
    }
}

/// Verify an XMSS signature.
///
/// RFC 8391, Algorithm 14: XMSS_verify
pub fn xmss_verify<H: HashSuite<N>, const N: usize>(
    pk: &PublicKey<N>,
    message: &[u8],
    signature: &Signature,
) -> Result<()> {
    if pk.params().is_multi_tree() {
        return Err(Error::VerificationFailed);
    }
    verify::<H, N>(pk, message, signature)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash_sha2::Sha2_256Hash;
    use crate::hash_shake::Shake128Hash;
    use crate::params::HashFunction;
    use crate::treehash::{auth_path, tree_root};
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    const N: usize = 32;
    type Key = XmssSigningKey<Shake128Hash, N>;

    fn params(h: u32) -> Params {
        Params::new(HashFunction::Shake128, 16, h, 1).unwrap()
    }

    #[test]
    fn test_keygen_root_matches_tree_root() {
        let p = params(3);
        let (sk, pk) = Key::from_seed(p, 0, [1u8; N], [2u8; N], [3u8; N]).unwrap();
        let root = tree_root::<Shake128Hash, N>(&[1u8; N], &[3u8; N], &Address::subtree(0, 0), &p);

        assert_eq!(pk.root(), &root);
        assert_eq!(pk.pub_seed(), &[3u8; N]);
        assert_eq!(sk.public_key(), pk);
        assert_eq!(sk.index(), 0);
        assert_eq!(sk.remaining_signatures(), 8);
    }

    #[test]
    fn test_keygen_determinism() {
        let p = params(2);
        let mut rng1 = ChaCha20Rng::seed_from_u64(42);
        let mut rng2 = ChaCha20Rng::seed_from_u64(42);
        let (_, pk1) = Key::generate(p, 0, &mut rng1).unwrap();
        let (_, pk2) = Key::generate(p, 0, &mut rng2).unwrap();
        assert_eq!(pk1, pk2);
    }

    #[test]
    fn test_sign_verify_roundtrip() {
        let p = params(3);
        let mut rng = ChaCha20Rng::seed_from_u64(1);
        let (mut sk, pk) = Key::generate(p, 2, &mut rng).unwrap();

        let message = b"Hello, XMSS!";
        let sig = sk.sign(message).unwrap();

        assert_eq!(sig.to_bytes().len(), p.signature_bytes());
        assert_eq!(sig.index(), 0);
        assert!(xmss_verify::<Shake128Hash, N>(&pk, message, &sig).is_ok());
        assert_eq!(sk.index(), 1);
    }

    #[test]
    fn test_signature_carries_bds_path() {
        let p = params(3);
        let (mut sk, _) = Key::from_seed(p, 0, [1u8; N], [2u8; N], [3u8; N]).unwrap();
        let subtree = Address::subtree(0, 0);

        for leaf in 0..8u32 {
            let sig = sk.sign(b"path").unwrap();
            let mut path = [[0u8; N]; 3];
            auth_path::<Shake128Hash, N>(&mut path, &[1u8; N], &[3u8; N], &subtree, leaf, &p);
            let auth_start = 4 + N + p.wots_sig_bytes();
            let expected: Vec<u8> = path.iter().flatten().copied().collect();
            assert_eq!(&sig.to_bytes()[auth_start..], expected.as_slice(), "leaf {leaf}");
        }
    }

    #[test]
    fn test_wrong_message_fails() {
        let p = params(2);
        let mut rng = ChaCha20Rng::seed_from_u64(7);
        let (mut sk, pk) = Key::generate(p, 0, &mut rng).unwrap();

        let sig = sk.sign(b"Original message").unwrap();
        assert_eq!(
            xmss_verify::<Shake128Hash, N>(&pk, b"Wrong message", &sig),
            Err(Error::VerificationFailed)
        );
    }

    #[test]
    fn test_wrong_public_key_fails() {
        let p = params(2);
        let mut rng = ChaCha20Rng::seed_from_u64(7);
        let (mut sk, _) = Key::generate(p, 0, &mut rng).unwrap();
        let (_, other_pk) = Key::generate(p, 0, &mut rng).unwrap();

        let sig = sk.sign(b"message").unwrap();
        assert!(xmss_verify::<Shake128Hash, N>(&other_pk, b"message", &sig).is_err());
    }

    #[test]
    fn test_exhaustion_leaves_output_untouched() {
        let p = params(2);
        let (mut sk, pk) = Key::from_seed(p, 0, [1u8; N], [2u8; N], [3u8; N]).unwrap();
        for i in 0..4 {
            let sig = sk.sign(b"m").unwrap();
            assert_eq!(sig.index(), i);
            assert!(xmss_verify::<Shake128Hash, N>(&pk, b"m", &sig).is_ok());
        }
        assert_eq!(sk.remaining_signatures(), 0);
        assert!(sk.seeds.is_wiped());

        let mut out = vec![0xAAu8; p.signature_bytes()];
        assert_eq!(sk.sign_to(&mut out, b"m"), Err(Error::KeyExhausted));
        assert!(out.iter().all(|&b| b == 0xAA));
    }

    #[test]
    fn test_sign_to_checks_buffer_length() {
        let p = params(2);
        let (mut sk, _) = Key::from_seed(p, 0, [1u8; N], [2u8; N], [3u8; N]).unwrap();
        let mut out = vec![0u8; p.signature_bytes() - 1];
        assert!(matches!(
            sk.sign_to(&mut out, b"m"),
            Err(Error::InvalidSignatureLength { .. })
        ));
        assert_eq!(sk.index(), 0);
    }

    #[test]
    fn test_rejects_mismatched_params() {
        let mt = Params::new(HashFunction::Shake128, 16, 4, 2).unwrap();
        assert_eq!(
            Key::from_seed(mt, 0, [0u8; N], [0u8; N], [0u8; N]).unwrap_err(),
            Error::UnsupportedParameterSet
        );
        let sha = Params::new(HashFunction::Sha2_256, 16, 2, 1).unwrap();
        assert_eq!(
            Key::from_seed(sha, 0, [0u8; N], [0u8; N], [0u8; N]).unwrap_err(),
            Error::UnsupportedParameterSet
        );
        assert_eq!(
            Key::from_seed(params(2), 1, [0u8; N], [0u8; N], [0u8; N]).unwrap_err(),
            Error::InvalidBdsParameter {
                k: 1,
                tree_height: 2
            }
        );
    }

    #[test]
    fn test_export_import_resumes_signing() {
        let p = Params::new(HashFunction::Sha2_256, 16, 4, 1).unwrap();
        let (mut sk, pk) =
            XmssSigningKey::<Sha2_256Hash, N>::from_seed(p, 2, [5u8; N], [6u8; N], [7u8; N])
                .unwrap();
        for _ in 0..6 {
            sk.sign(b"before").unwrap();
        }

        let exported = sk.to_bytes();
        assert_eq!(exported.len(), XmssSigningKey::<Sha2_256Hash, N>::exported_size(&p, 2));
        let mut resumed = XmssSigningKey::<Sha2_256Hash, N>::from_bytes(p, &exported).unwrap();
        assert_eq!(resumed.index(), 6);
        assert_eq!(resumed.bds_k(), 2);
        assert_eq!(resumed.public_key(), pk);

        let a = sk.sign(b"after").unwrap();
        let b = resumed.sign(b"after").unwrap();
        assert_eq!(a, b);
        assert!(xmss_verify::<Sha2_256Hash, N>(&pk, b"after", &b).is_ok());
    }

    #[test]
    fn test_import_rejects_bad_context() {
        let p = params(2);
        let (sk, _) = Key::from_seed(p, 0, [1u8; N], [2u8; N], [3u8; N]).unwrap();
        let exported = sk.to_bytes();

        assert!(matches!(
            Key::from_bytes(p, &exported[..exported.len() - 1]),
            Err(Error::InvalidKeyLength { .. })
        ));

        let mut bad = exported.to_vec();
        bad[7] = 5; // index beyond 2^h
        assert_eq!(Key::from_bytes(p, &bad).unwrap_err(), Error::EncodingError);
    }

    #[test]
    fn test_import_rejects_overfull_stack() {
        let p = params(4);
        let (sk, _) = Key::from_seed(p, 0, [1u8; N], [2u8; N], [3u8; N]).unwrap();
        let mut bad = sk.to_bytes().to_vec();

        // BDS state follows the secret key and the 4-byte retain parameter.
        let base = p.secret_key_bytes() + 4;
        let levels_pos = base + (4 + 2 + 5) * N;
        let offset_pos = levels_pos + 5;
        let inst1 = offset_pos + 4 + N + 10;
        bad[levels_pos..offset_pos].fill(3);
        bad[offset_pos + 3] = 5;
        bad[inst1 + N + 8] = 5;
        bad[inst1 + N + 9] = 0;

        assert_eq!(Key::from_bytes(p, &bad).unwrap_err(), Error::EncodingError);
    }

    #[test]
    fn test_failed_sign_keeps_index() {
        let p = params(4);
        let (mut sk, _) = Key::from_seed(p, 0, [1u8; N], [2u8; N], [3u8; N]).unwrap();
        sk.sign(b"first").unwrap();
        sk.sign(b"second").unwrap();
        sk.state.overfill_stack();

        let mut out = vec![0xAAu8; p.signature_bytes()];
        assert_eq!(sk.sign_to(&mut out, b"third"), Err(Error::EncodingError));
        assert_eq!(sk.index(), 2);
        assert_eq!(sk.remaining_signatures(), 14);
        assert!(out.iter().all(|&b| b == 0xAA));
        assert_eq!(sk.sign(b"third").unwrap_err(), Error::EncodingError);
        assert_eq!(sk.index(), 2);
    }

    #[test]
    fn test_exhausted_key_exports_exhausted() {
        let p = params(1);
        let (mut sk, _) = Key::from_seed(p, 0, [1u8; N], [2u8; N], [3u8; N]).unwrap();
        sk.sign(b"a").unwrap();
        sk.sign(b"b").unwrap();

        let mut restored = Key::from_bytes(p, &sk.to_bytes()).unwrap();
        assert_eq!(restored.remaining_signatures(), 0);
        assert_eq!(restored.sign(b"c").unwrap_err(), Error::KeyExhausted);
    }
}
