//! WOTS+ (Winternitz One-Time Signature) implementation.
//!
//! Each WOTS+ key pair signs a single n-byte digest. Secret chain starts are
//! derived from `SK_SEED` with PRF_keygen, public values are the chain ends
//! after `w - 1` applications of the keyed chaining function F.
//!
//! RFC 8391, Section 3.1 (Algorithms 2-6), with the secret key expansion of
//! the reference implementation.

use crate::address::Address;
use crate::hash::HashSuite;
use crate::params::{Params, MAX_WOTS_LEN};
use crate::utils::{base_w, encode_checksum, wots_checksum};
use zeroize::Zeroize;

/// Compute `steps` iterations of the WOTS+ chain.
///
/// RFC 8391, Algorithm 2: chain(X, i, s, SEED, ADRS)
///
/// Starts from `x` at chain position `start`. The hash address word of `adrs`
/// runs from `start` to `start + steps - 1`; `adrs` must be an OTS address with
/// its chain word set.
pub fn wots_chain<H: HashSuite<N>, const N: usize>(
    x: &[u8; N],
    start: u32,
    steps: u32,
    pub_seed: &[u8; N],
    adrs: &mut Address,
) -> [u8; N] {
    let mut result = *x;
    for j in start..start + steps {
        adrs.set_hash(j);
        result = H::f(&result, pub_seed, adrs);
    }
    result
}

/// Compute the chain lengths for a digest: `len1` base-w message digits
/// followed by `len2` checksum digits.
///
/// RFC 8391, Algorithm 5 steps 1-6.
pub(crate) fn chain_lengths(lengths: &mut [u32], msg: &[u8], params: &Params) {
    debug_assert_eq!(lengths.len(), params.wots_len());
    let (digits, checksum) = lengths.split_at_mut(params.len1());
    base_w(digits, msg, params.log_w());
    let csum = wots_checksum(digits, params.w());
    encode_checksum(checksum, csum, params.log_w());
}

/// Derive the secret start of chain `chain` for the OTS key pair at `ots_adrs`.
fn secret_chain_start<H: HashSuite<N>, const N: usize>(
    sk_seed: &[u8; N],
    pub_seed: &[u8; N],
    ots_adrs: &mut Address,
    chain: u32,
) -> [u8; N] {
    ots_adrs.set_chain(chain);
    ots_adrs.set_hash(0);
    ots_adrs.set_key_and_mask(0);
    H::prf_keygen(sk_seed, pub_seed, ots_adrs)
}

/// Generate a WOTS+ public key (all `len` chain ends).
///
/// RFC 8391, Algorithm 4: WOTS_genPK
///
/// `adrs` must be an OTS address for the key pair; its chain, hash and
/// key-and-mask words are overwritten. `pk` must hold `len` nodes.
pub fn wots_pk_gen<H: HashSuite<N>, const N: usize>(
    pk: &mut [[u8; N]],
    sk_seed: &[u8; N],
    pub_seed: &[u8; N],
    adrs: &mut Address,
    params: &Params,
) {
    debug_assert_eq!(pk.len(), params.wots_len());
    let last = params.w() - 1;

    for (i, node) in pk.iter_mut().enumerate() {
        let mut sk = secret_chain_start::<H, N>(sk_seed, pub_seed, adrs, i as u32);
        *node = wots_chain::<H, N>(&sk, 0, last, pub_seed, adrs);
        sk.zeroize();
    }
}

/// Generate a WOTS+ signature over an n-byte digest.
///
/// RFC 8391, Algorithm 5: WOTS_sign
///
/// Writes `len * n` bytes into `sig`. `adrs` must be an OTS address for the
/// key pair.
pub fn wots_sign_to<H: HashSuite<N>, const N: usize>(
    sig: &mut [u8],
    msg: &[u8; N],
    sk_seed: &[u8; N],
    pub_seed: &[u8; N],
    adrs: &mut Address,
    params: &Params,
) {
    debug_assert_eq!(sig.len(), params.wots_sig_bytes());
    let mut buf = [0u32; MAX_WOTS_LEN];
    let lengths = &mut buf[..params.wots_len()];
    chain_lengths(lengths, msg, params);

    for (i, (out, &steps)) in sig.chunks_exact_mut(N).zip(lengths.iter()).enumerate() {
        let mut sk = secret_chain_start::<H, N>(sk_seed, pub_seed, adrs, i as u32);
        out.copy_from_slice(&wots_chain::<H, N>(&sk, 0, steps, pub_seed, adrs));
        sk.zeroize();
    }
}

/// Recover the WOTS+ public key from a signature.
///
/// RFC 8391, Algorithm 6: WOTS_pkFromSig
///
/// Continues each chain from its signed position to `w - 1`. Touches no
/// secret material. `sig` must be `len * n` bytes and `pk` must hold `len` nodes.
pub fn wots_pk_from_sig<H: HashSuite<N>, const N: usize>(
    pk: &mut [[u8; N]],
    sig: &[u8],
    msg: &[u8; N],
    pub_seed: &[u8; N],
    adrs: &mut Address,
    params: &Params,
) {
    debug_assert_eq!(sig.len(), params.wots_sig_bytes());
    debug_assert_eq!(pk.len(), params.wots_len());
    let mut buf = [0u32; MAX_WOTS_LEN];
    let lengths = &mut buf[..params.wots_len()];
    chain_lengths(lengths, msg, params);
    let last = params.w() - 1;

    for (i, ((node, chunk), &start)) in pk
        .iter_mut()
        .zip(sig.chunks_exact(N))
        .zip(lengths.iter())
        .enumerate()
    {
        let mut value = [0u8; N];
        value.copy_from_slice(chunk);
        adrs.set_chain(i as u32);
        *node = wots_chain::<H, N>(&value, start, last - start, pub_seed, adrs);
    }
}
