//! XMSS-MT: a hypertree of `d` layers of XMSS trees of height `h / d`.
//!
//! RFC 8391, Algorithms 15-17.
//!
//! Each layer keeps a current BDS state, and every layer below the top keeps a
//! second state in which the following tree of that layer is built while the
//! current one is in use. The WOTS+ signature that certifies a tree's root
//! under its parent changes only when the tree changes, so those signatures
//! are cached and copied into every signature.
//!
//! Per signature the leaf budget `ceil((h/d - k) / 2)` is shared across the
//! layers, lowest layer first. The following tree of layer 0 gets one leaf per
//! signature, which completes it exactly when the current tree runs out.
//! Upper layers build theirs from leftover budget and are finished on demand
//! when their current tree is exhausted.

use core::fmt;
use core::marker::PhantomData;

use crate::address::Address;
use crate::bds::BdsState;
use crate::hash::HashSuite;
use crate::params::Params;
use crate::sign::{
    check_suite, loaded_index, stored_index, verify, PublicKey, SecretSeeds, Signature,
};
use crate::utils::{to_int, write_int};
use crate::wots::wots_sign_to;
use crate::xmss::tree_sign_to;
use kestrel_core::{Error, Result};
use rand_core::TryCryptoRng;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

#[cfg(not(feature = "std"))]
use alloc::{vec, vec::Vec};

/// XMSS-MT signing key.
///
/// Holds the seeds, the next global index, `d` current BDS states, `d - 1`
/// states for the following trees and `d - 1` cached WOTS+ signatures of the
/// current roots. Not `Clone`: duplicating a stateful key reuses one-time keys.
pub struct XmssMtSigningKey<H: HashSuite<N>, const N: usize> {
    params: Params,
    seeds: SecretSeeds<N>,
    idx: u64,
    states: Vec<BdsState<N>>,
    next: Vec<BdsState<N>>,
    wots_sigs: Vec<u8>,
    _hash: PhantomData<fn() -> H>,
}

impl<H: HashSuite<N>, const N: usize> XmssMtSigningKey<H, N> {
    /// Generate a key pair from `3n` bytes of `rng`.
    ///
    /// Fails with [`Error::InsufficientRandomness`] if `rng` reports an error.
    ///
    /// RFC 8391, Algorithm 15: XMSSMT_keyGen. Builds the leftmost tree of every
    /// layer and signs each root with the first WOTS+ key of the layer above.
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
        if !params.is_multi_tree() {
            return Err(Error::UnsupportedParameterSet);
        }
        params.check_bds_k(bds_k)
    }

    fn from_seeds(
        params: Params,
        bds_k: u32,
        mut seeds: SecretSeeds<N>,
    ) -> Result<(Self, PublicKey<N>)> {
        let d = params.layers() as usize;
        let sig_len = params.wots_sig_bytes();

        let mut states = (0..d)
            .map(|_| BdsState::new(&params, bds_k))
            .collect::<Result<Vec<_>>>()?;
        let next = (0..d - 1)
            .map(|_| BdsState::new(&params, bds_k))
            .collect::<Result<Vec<_>>>()?;
        let mut wots_sigs = vec![0u8; (d - 1) * sig_len];

        for (layer, state) in states.iter_mut().enumerate() {
            let layer = layer as u32;
            let root = state.init::<H>(
                &seeds.sk_seed,
                &seeds.pub_seed,
                &Address::subtree(layer, 0),
                &params,
            )?;
            if layer + 1 == params.layers() {
                seeds.root = root;
            } else {
                let start = layer as usize * sig_len;
                let mut adrs = Address::subtree(layer + 1, 0).ots_for(0);
                wots_sign_to::<H, N>(
                    &mut wots_sigs[start..start + sig_len],
                    &root,
                    &seeds.sk_seed,
                    &seeds.pub_seed,
                    &mut adrs,
                    &params,
                );
            }
        }

        tracing::debug!(
            params = params.name().unwrap_or("custom"),
            oid = params.oid(),
            layers = d,
            bds_k,
            "generated XMSS-MT key pair"
        );

        let pk = PublicKey::new(params, seeds.root, seeds.pub_seed);
        let sk = Self {
            params,
            seeds,
            idx: 0,
            states,
            next,
            wots_sigs,
            _hash: PhantomData,
        };
        Ok((sk, pk))
    }

    /// Parameter set of the key.
    #[must_use]
    pub fn params(&self) -> &Params {
        &self.params
    }

    /// Next global leaf index to be used.
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
        self.states[0].k()
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
    /// RFC 8391, Algorithm 16: XMSSMT_sign, followed by the traversal updates
    /// that prepare every layer for the next index.
    pub fn sign_to(&mut self, out: &mut [u8], message: &[u8]) -> Result<()> {
        let max = self.params.max_signatures();
        if self.idx >= max {
            tracing::warn!(index = self.idx, "signing attempted with exhausted XMSS-MT key");
            return Err(Error::KeyExhausted);
        }
        let expected = self.params.signature_bytes();
        if out.len() != expected {
            return Err(Error::InvalidSignatureLength {
                expected,
                actual: out.len(),
            });
        }

        for state in self.states.iter().chain(&self.next) {
            state.check()?;
        }

        let idx = self.idx;
        self.idx += 1;

        let params = self.params;
        let th = params.tree_height();
        let leaf_mask = (1u64 << th) - 1;
        let ib = params.index_bytes();
        let layer_len = params.reduced_sig_bytes();
        let sig_len = params.wots_sig_bytes();

        let (r, digest) = self.seeds.randomize::<H>(idx, message);
        write_int(&mut out[..ib], idx);
        out[ib..ib + N].copy_from_slice(&r);

        let mut layers = out[ib + N..].chunks_exact_mut(layer_len);
        if let Some(bottom) = layers.next() {
            tree_sign_to::<H, N>(
                bottom,
                &digest,
                &self.seeds.sk_seed,
                &self.seeds.pub_seed,
                (idx & leaf_mask) as u32,
                &Address::subtree(0, idx >> th),
                &self.states[0],
                &params,
            );
        }
        for ((layer_sig, cached), state) in layers
            .zip(self.wots_sigs.chunks_exact(sig_len))
            .zip(&self.states[1..])
        {
            let (wots_sig, auth) = layer_sig.split_at_mut(sig_len);
            wots_sig.copy_from_slice(cached);
            state.write_auth(auth);
        }

        if idx + 1 == max {
            tracing::warn!(index = idx, "last XMSS-MT one-time key consumed");
            self.seeds.wipe();
        } else if let Err(err) = self.advance(idx) {
            tracing::error!(index = idx, "XMSS-MT traversal state is inconsistent");
            out.zeroize();
            self.idx = idx;
            return Err(err);
        }

        tracing::trace!(index = idx, remaining = self.remaining_signatures(), "XMSS-MT signature");
        Ok(())
    }

    /// Move every layer from index `idx` to `idx + 1`.
    fn advance(&mut self, idx: u64) -> Result<()> {
        let params = self.params;
        let h = params.height();
        let th = params.tree_height();
        let leaf_mask = (1u64 << th) - 1;
        let d = params.layers() as usize;
        let sk_seed = &self.seeds.sk_seed;
        let pub_seed = &self.seeds.pub_seed;

        let mut updates = self.states[0].budget();
        let mut round_layer = 0usize;

        // The following bottom tree receives one leaf per signature.
        let idx_tree = idx >> th;
        if ((idx_tree + 1) << th) + (idx & leaf_mask) < params.max_signatures() {
            self.next[0].state_update::<H>(
                sk_seed,
                pub_seed,
                &Address::subtree(0, idx_tree + 1),
                &params,
            )?;
        }

        for i in 0..d {
            let layer = i as u32;
            let span = th * (layer + 1);
            let idx_leaf = ((idx >> (th * layer)) & leaf_mask) as u32;
            let idx_tree = idx >> span;

            if (idx + 1) & ((1u64 << span) - 1) != 0 {
                let subtree = Address::subtree(layer, idx_tree);
                let state = &mut self.states[i];
                if i == round_layer {
                    state.round::<H>(idx_leaf, sk_seed, pub_seed, &subtree, &params);
                }
                updates = state.treehash_update::<H>(updates, sk_seed, pub_seed, &subtree, &params)?;

                let has_next_tree = span < h && idx_tree + 1 < (1u64 << (h - span));
                if i > 0 && updates > 0 && has_next_tree {
                    if let Some(next) = self.next.get_mut(i) {
                        if !next.is_next_tree_complete() {
                            next.state_update::<H>(
                                sk_seed,
                                pub_seed,
                                &Address::subtree(layer, idx_tree + 1),
                                &params,
                            )?;
                            updates -= 1;
                        }
                    }
                }
            } else if i + 1 < d {
                let root = self.next[i].complete_next_tree::<H>(
                    sk_seed,
                    pub_seed,
                    &Address::subtree(layer, idx_tree + 1),
                    &params,
                )?;
                core::mem::swap(&mut self.states[i], &mut self.next[i]);

                let parent_tree = (idx + 1) >> (span + th);
                let parent_leaf = ((idx >> span) + 1) & leaf_mask;
                let mut adrs = Address::subtree(layer + 1, parent_tree).ots_for(parent_leaf as u32);
                let sig_len = params.wots_sig_bytes();
                wots_sign_to::<H, N>(
                    &mut self.wots_sigs[i * sig_len..(i + 1) * sig_len],
                    &root,
                    sk_seed,
                    pub_seed,
                    &mut adrs,
                    &params,
                );

                self.next[i].reset_next_tree();
                self.states[i].mark_treehash_completed();
                updates = updates.saturating_sub(1);
                round_layer = i + 1;

                tracing::debug!(layer, tree = idx_tree + 1, "switched to next XMSS-MT tree");
            }
        }
        Ok(())
    }

    /// Size of the exported key.
    #[must_use]
    pub fn exported_size(params: &Params, bds_k: u32) -> usize {
        let d = params.layers() as usize;
        params.secret_key_bytes()
            + 4
            + (2 * d - 1) * BdsState::<N>::serialized_size(params, bds_k)
            + (d - 1) * params.wots_sig_bytes()
    }

    /// Export the full signing context.
    ///
    /// Layout: secret key, `bds_k` (4 bytes), the `d` current states, the
    /// `d - 1` following-tree states, then the `d - 1` cached WOTS+ signatures.
    #[must_use]
    pub fn to_bytes(&self) -> Zeroizing<Vec<u8>> {
        let params = &self.params;
        let k = self.bds_k();
        let sk_len = params.secret_key_bytes();
        let state_len = BdsState::<N>::serialized_size(params, k);

        let mut out = Zeroizing::new(vec![0u8; Self::exported_size(params, k)]);
        self.seeds
            .write_secret_key(&mut out[..sk_len], params, stored_index(params, self.idx));
        write_int(&mut out[sk_len..sk_len + 4], u64::from(k));

        let mut pos = sk_len + 4;
        for state in self.states.iter().chain(&self.next) {
            state.write_to(&mut out[pos..pos + state_len]);
            pos += state_len;
        }
        out[pos..].copy_from_slice(&self.wots_sigs);
        out
    }

    /// Import a signing context exported by [`Self::to_bytes`].
    pub fn from_bytes(params: Params, bytes: &[u8]) -> Result<Self> {
        check_suite::<H, N>(&params)?;
        if !params.is_multi_tree() {
            return Err(Error::UnsupportedParameterSet);
        }
        let sk_len = params.secret_key_bytes();
        if bytes.len() < sk_len + 4 {
            return Err(Error::InvalidKeyLength {
                expected: sk_len + 4,
                actual: bytes.len(),
            });
        }
        let k = to_int(&bytes[sk_len..sk_len + 4]) as u32;
        params.check_bds_k(k)?;
        let expected = Self::exported_size(&params, k);
        if bytes.len() != expected {
            return Err(Error::InvalidKeyLength {
                expected,
                actual: bytes.len(),
            });
        }

        let (seeds, raw_idx) = SecretSeeds::read_secret_key(&bytes[..sk_len], &params)?;
        let idx = loaded_index(&params, raw_idx, seeds.is_wiped())?;

        let d = params.layers() as usize;
        let state_len = BdsState::<N>::serialized_size(&params, k);
        let states_end = sk_len + 4 + (2 * d - 1) * state_len;
        let mut all = bytes[sk_len + 4..states_end]
            .chunks_exact(state_len)
            .map(|chunk| BdsState::from_bytes(&params, k, chunk))
            .collect::<Result<Vec<_>>>()?;
        let next = all.split_off(d);

        Ok(Self {
            params,
            seeds,
            idx,
            states: all,
            next,
            wots_sigs: bytes[states_end..].to_vec(),
            _hash: PhantomData,
        })
    }
}

impl<H: HashSuite<N>, const N: usize> fmt::Debug for XmssMtSigningKey<H, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("XmssMtSigningKey")
            .field("params", &self.params.name())
            .field("index", &self.idx)
            .field("layers", &self.params.layers())
            .field("bds_k", &self.bds_k())
            .finish_non_exhaustive()
    }
}

impl<H: HashSuite<N>, const N: usize> Zeroize for XmssMtSigningKey<H, N> {
    fn zeroize(&mut self) {
        self.seeds.zeroize();
        for state in self.states.iter_mut().chain(self.next.iter_mut()) {
            state.zeroize();
        }
        self.wots_sigs.zeroize();
    }
}

impl<H: HashSuite<N>, const N: usize> ZeroizeOnDrop for XmssMtSigningKey<H, N> {}

impl<H: HashSuite<N>, const N: usize> Drop for XmssMtSigningKey<H, N> {
    fn drop(&mut self) {
        self.zeroize();
    }
}

/// Verify an XMSS-MT signature.
///
/// RFC 8391, Algorithm 17: XMSSMT_verify
pub fn xmss_mt_verify<H: HashSuite<N>, const N: usize>(
    pk: &PublicKey<N>,
    message: &[u8],
    signature: &Signature,
) -> Result<()> {
    if !pk.params().is_multi_tree() {
        return Err(Error::VerificationFailed);
    }
    verify::<H, N>(pk, message, signature)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash_shake::Shake128Hash;
    use crate::params::HashFunction;
    use crate::treehash::{auth_path, tree_root};

    const N: usize = 32;
    type Key = XmssMtSigningKey<Shake128Hash, N>;

    const SK_SEED: [u8; N] = [1u8; N];
    const SK_PRF: [u8; N] = [2u8; N];
    const PUB_SEED: [u8; N] = [3u8; N];

    fn params(h: u32, d: u32) -> Params {
        Params::new(HashFunction::Shake128, 16, h, d).unwrap()
    }

    /// Authentication path of every layer for global index `idx`, from scratch.
    fn expected_paths(p: &Params, idx: u64) -> Vec<u8> {
        let th = p.tree_height();
        let mut out = Vec::new();
        let mut tree = idx;
        for layer in 0..p.layers() {
            let leaf = (tree & ((1 << th) - 1)) as u32;
            tree >>= th;
            let mut path = vec![[0u8; N]; th as usize];
            auth_path::<Shake128Hash, N>(
                &mut path,
                &SK_SEED,
                &PUB_SEED,
                &Address::subtree(layer, tree),
                leaf,
                p,
            );
            out.extend(path.iter().flatten());
        }
        out
    }

    fn layer_auth(p: &Params, sig: &[u8]) -> Vec<u8> {
        let body = &sig[p.index_bytes() + N..];
        body.chunks_exact(p.reduced_sig_bytes())
            .flat_map(|layer| layer[p.wots_sig_bytes()..].iter().copied())
            .collect()
    }

    #[test]
    fn test_root_is_top_tree_root() {
        let p = params(4, 2);
        let (_, pk) = Key::from_seed(p, 0, SK_SEED, SK_PRF, PUB_SEED).unwrap();
        let top = tree_root::<Shake128Hash, N>(&SK_SEED, &PUB_SEED, &Address::subtree(1, 0), &p);
        assert_eq!(pk.root(), &top);
    }

    #[test]
    fn test_full_lifetime_two_layers() {
        let p = params(4, 2);
        let (mut sk, pk) = Key::from_seed(p, 0, SK_SEED, SK_PRF, PUB_SEED).unwrap();

        for idx in 0..16u64 {
            let sig = sk.sign(b"layers").unwrap();
            assert_eq!(sig.index(), idx);
            assert_eq!(layer_auth(&p, sig.as_ref()), expected_paths(&p, idx), "index {idx}");
            assert!(xmss_mt_verify::<Shake128Hash, N>(&pk, b"layers", &sig).is_ok());
        }
        assert_eq!(sk.sign(b"layers").unwrap_err(), Error::KeyExhausted);
    }

    #[test]
    fn test_three_layers_cross_boundaries() {
        let p = params(6, 3);
        let (mut sk, pk) = Key::from_seed(p, 2, SK_SEED, SK_PRF, PUB_SEED).unwrap();

        for idx in 0..64u64 {
            let sig = sk.sign(&idx.to_be_bytes()).unwrap();
            assert_eq!(layer_auth(&p, sig.as_ref()), expected_paths(&p, idx), "index {idx}");
            assert!(xmss_mt_verify::<Shake128Hash, N>(&pk, &idx.to_be_bytes(), &sig).is_ok());
        }
        assert_eq!(sk.remaining_signatures(), 0);
        assert!(sk.seeds.is_wiped());
    }

    #[test]
    fn test_tampered_upper_layer_fails() {
        let p = params(4, 2);
        let (mut sk, pk) = Key::from_seed(p, 0, SK_SEED, SK_PRF, PUB_SEED).unwrap();
        let sig = sk.sign(b"msg").unwrap();

        let mut bytes = sig.to_bytes().to_vec();
        let upper = p.index_bytes() + N + p.reduced_sig_bytes();
        bytes[upper] ^= 1;
        let tampered = Signature::from_bytes(p, &bytes).unwrap();
        assert_eq!(
            xmss_mt_verify::<Shake128Hash, N>(&pk, b"msg", &tampered),
            Err(Error::VerificationFailed)
        );
    }

    #[test]
    fn test_rejects_single_tree_params() {
        let p = params(4, 1);
        assert_eq!(
            Key::from_seed(p, 0, SK_SEED, SK_PRF, PUB_SEED).unwrap_err(),
            Error::UnsupportedParameterSet
        );
    }

    #[test]
    fn test_export_import_across_tree_switch() {
        let p = params(4, 2);
        let (mut sk, pk) = Key::from_seed(p, 2, SK_SEED, SK_PRF, PUB_SEED).unwrap();
        for _ in 0..3 {
            sk.sign(b"x").unwrap();
        }

        let exported = sk.to_bytes();
        assert_eq!(exported.len(), Key::exported_size(&p, 2));
        let mut resumed = Key::from_bytes(p, &exported).unwrap();
        assert_eq!(resumed.index(), 3);
        assert_eq!(resumed.public_key(), pk);

        // Index 3 is the last leaf of the first bottom tree.
        for _ in 0..3 {
            let a = sk.sign(b"y").unwrap();
            let b = resumed.sign(b"y").unwrap();
            assert_eq!(a, b);
            assert!(xmss_mt_verify::<Shake128Hash, N>(&pk, b"y", &b).is_ok());
        }
    }

    #[test]
    fn test_every_state_reimports() {
        let p = params(6, 2);
        let (mut sk, pk) = Key::from_seed(p, 0, SK_SEED, SK_PRF, PUB_SEED).unwrap();
        for idx in 0..64u64 {
            sk = Key::from_bytes(p, &sk.to_bytes()).unwrap();
            assert_eq!(sk.index(), idx);
            let sig = sk.sign(b"reimport").unwrap();
            assert!(xmss_mt_verify::<Shake128Hash, N>(&pk, b"reimport", &sig).is_ok());
        }
    }

    #[test]
    fn test_failed_sign_keeps_index() {
        let p = params(4, 2);
        let (mut sk, _) = Key::from_seed(p, 0, SK_SEED, SK_PRF, PUB_SEED).unwrap();
        sk.sign(b"first").unwrap();
        sk.next[0].overfill_stack();

        let mut out = vec![0x55u8; p.signature_bytes()];
        assert_eq!(sk.sign_to(&mut out, b"second"), Err(Error::EncodingError));
        assert_eq!(sk.index(), 1);
        assert!(out.iter().all(|&b| b == 0x55));
        assert!(matches!(
            Key::from_bytes(p, &sk.to_bytes()),
            Err(Error::EncodingError)
        ));
    }

    #[test]
    fn test_xmss_verify_rejects_mt_signature() {
        let p = params(4, 2);
        let (mut sk, pk) = Key::from_seed(p, 0, SK_SEED, SK_PRF, PUB_SEED).unwrap();
        let sig = sk.sign(b"m").unwrap();
        assert_eq!(
            crate::xmss::xmss_verify::<Shake128Hash, N>(&pk, b"m", &sig),
            Err(Error::VerificationFailed)
        );
    }
}
