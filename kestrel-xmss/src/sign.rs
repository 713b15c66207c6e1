//! Keys, signatures and verification shared by XMSS and XMSS-MT.
//!
//! RFC 8391, Sections 4.1.8-4.1.10 and 4.2.4-4.2.5.
//!
//! Encodings:
//!
//! - public key: `OID (4) || root || SEED`
//! - secret key: `OID (4) || idx || SK_SEED || SK_PRF || root || SEED`
//! - signature: `idx || r || (WOTS+ signature || auth path)` per layer, bottom first

use crate::address::Address;
use crate::hash::HashSuite;
use crate::params::{Params, OID_BYTES};
use crate::utils::{to_int, write_int};
use crate::xmss::root_from_sig;
use kestrel_core::{Error, Result};
use rand_core::TryCryptoRng;
use subtle::ConstantTimeEq;
use zeroize::{Zeroize, ZeroizeOnDrop};

#[cfg(not(feature = "std"))]
use alloc::{vec, vec::Vec};

/// Check that a parameter set matches the compile-time hash suite.
pub(crate) fn check_suite<H: HashSuite<N>, const N: usize>(params: &Params) -> Result<()> {
    if params.n() != N || params.hash_function() != H::FUNCTION {
        return Err(Error::UnsupportedParameterSet);
    }
    Ok(())
}

/// Secret and public seeds of a key pair, together with the public root.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub(crate) struct SecretSeeds<const N: usize> {
    pub(crate) sk_seed: [u8; N],
    pub(crate) sk_prf: [u8; N],
    pub(crate) pub_seed: [u8; N],
    pub(crate) root: [u8; N],
}

impl<const N: usize> SecretSeeds<N> {
    /// Draw `SK_SEED || SK_PRF || SEED` (3n bytes) from `rng`.
    pub(crate) fn generate(rng: &mut impl TryCryptoRng) -> Result<Self> {
        let mut seeds = Self {
            sk_seed: [0u8; N],
            sk_prf: [0u8; N],
            pub_seed: [0u8; N],
            root: [0u8; N],
        };
        for seed in [&mut seeds.sk_seed, &mut seeds.sk_prf, &mut seeds.pub_seed] {
            rng.try_fill_bytes(seed).map_err(|_| Error::InsufficientRandomness)?;
        }
        Ok(seeds)
    }

    /// Whether the secret part has been wiped.
    pub(crate) fn is_wiped(&self) -> bool {
        let zero = [0u8; N];
        bool::from(self.sk_seed.ct_eq(&zero) & self.sk_prf.ct_eq(&zero))
    }

    /// Wipe the secret part, keeping the public seed and root.
    pub(crate) fn wipe(&mut self) {
        self.sk_seed.zeroize();
        self.sk_prf.zeroize();
    }

    /// Encode as `OID || idx || SK_SEED || SK_PRF || root || SEED`.
    pub(crate) fn write_secret_key(&self, out: &mut [u8], params: &Params, idx: u64) {
        debug_assert_eq!(out.len(), params.secret_key_bytes());
        let ib = params.index_bytes();
        write_int(&mut out[..OID_BYTES], u64::from(params.oid()));
        write_int(&mut out[OID_BYTES..OID_BYTES + ib], idx);
        let body = &mut out[OID_BYTES + ib..];
        body[..N].copy_from_slice(&self.sk_seed);
        body[N..2 * N].copy_from_slice(&self.sk_prf);
        body[2 * N..3 * N].copy_from_slice(&self.root);
        body[3 * N..].copy_from_slice(&self.pub_seed);
    }

    /// Decode a secret key encoding. Returns the seeds and the raw index field.
    pub(crate) fn read_secret_key(bytes: &[u8], params: &Params) -> Result<(Self, u64)> {
        let expected = params.secret_key_bytes();
        if bytes.len() != expected {
            return Err(Error::InvalidKeyLength {
                expected,
                actual: bytes.len(),
            });
        }
        if to_int(&bytes[..OID_BYTES]) != u64::from(params.oid()) {
            return Err(Error::UnsupportedParameterSet);
        }
        let ib = params.index_bytes();
        let idx = to_int(&bytes[OID_BYTES..OID_BYTES + ib]);

        let body = &bytes[OID_BYTES + ib..];
        let mut seeds = Self {
            sk_seed: [0u8; N],
            sk_prf: [0u8; N],
            pub_seed: [0u8; N],
            root: [0u8; N],
        };
        seeds.sk_seed.copy_from_slice(&body[..N]);
        seeds.sk_prf.copy_from_slice(&body[N..2 * N]);
        seeds.root.copy_from_slice(&body[2 * N..3 * N]);
        seeds.pub_seed.copy_from_slice(&body[3 * N..]);
        Ok((seeds, idx))
    }

    /// Message randomizer and digest for leaf `idx`.
    ///
    /// `r = PRF(SK_PRF, toByte(idx, 32))`, `M' = H_msg(r || root || toByte(idx, n), M)`.
    pub(crate) fn randomize<H: HashSuite<N>>(&self, idx: u64, message: &[u8]) -> ([u8; N], [u8; N]) {
        let r = H::prf_index(&self.sk_prf, idx);
        let digest = H::h_msg(&r, &self.root, idx, message);
        (r, digest)
    }
}

/// Largest value the index field of `params` can hold.
fn index_field_max(params: &Params) -> u64 {
    match params.index_bytes() {
        8.. => u64::MAX,
        ib => (1u64 << (8 * ib)) - 1,
    }
}

/// Index field value for an exported key whose next index is `idx`.
///
/// An exhausted key stores `2^h`, or all ones when `2^h` does not fit.
pub(crate) fn stored_index(params: &Params, idx: u64) -> u64 {
    idx.min(index_field_max(params))
}

/// Next index of an imported key from its raw index field.
///
/// All ones together with wiped secret seeds marks an exhausted key even when
/// all ones is also a valid leaf index.
pub(crate) fn loaded_index(params: &Params, raw: u64, wiped: bool) -> Result<u64> {
    let max = params.max_signatures();
    let field_max = index_field_max(params);
    if raw == field_max && (raw > max || wiped) {
        return Ok(max);
    }
    if raw > max {
        return Err(Error::EncodingError);
    }
    Ok(raw)
}

/// XMSS or XMSS-MT public key.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PublicKey<const N: usize> {
    params: Params,
    root: [u8; N],
    pub_seed: [u8; N],
}

impl<const N: usize> PublicKey<N> {
    pub(crate) fn new(params: Params, root: [u8; N], pub_seed: [u8; N]) -> Self {
        Self {
            params,
            root,
            pub_seed,
        }
    }

    /// Parameter set of the key.
    #[must_use]
    pub fn params(&self) -> &Params {
        &self.params
    }

    /// Root of the (top) tree.
    #[must_use]
    pub fn root(&self) -> &[u8; N] {
        &self.root
    }

    /// Public seed for key and bitmask derivation.
    #[must_use]
    pub fn pub_seed(&self) -> &[u8; N] {
        &self.pub_seed
    }

    /// Write the public key into a buffer of `public_key_bytes()` bytes.
    ///
    /// Layout: OID || root || SEED
    pub fn write_to(&self, out: &mut [u8]) {
        debug_assert_eq!(out.len(), self.params.public_key_bytes());
        write_int(&mut out[..OID_BYTES], u64::from(self.params.oid()));
        out[OID_BYTES..OID_BYTES + N].copy_from_slice(&self.root);
        out[OID_BYTES + N..].copy_from_slice(&self.pub_seed);
    }

    /// Serialize the public key to bytes.
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = vec![0u8; self.params.public_key_bytes()];
        self.write_to(&mut bytes);
        bytes
    }

    /// Decode a public key for `params`.
    ///
    /// The OID prefix must match the parameter set.
    pub fn from_bytes(params: Params, bytes: &[u8]) -> Result<Self> {
        if params.n() != N {
            return Err(Error::UnsupportedParameterSet);
        }
        let expected = params.public_key_bytes();
        if bytes.len() != expected {
            return Err(Error::InvalidKeyLength {
                expected,
                actual: bytes.len(),
            });
        }
        if to_int(&bytes[..OID_BYTES]) != u64::from(params.oid()) {
            return Err(Error::UnsupportedParameterSet);
        }
        let mut root = [0u8; N];
        let mut pub_seed = [0u8; N];
        root.copy_from_slice(&bytes[OID_BYTES..OID_BYTES + N]);
        pub_seed.copy_from_slice(&bytes[OID_BYTES + N..]);
        Ok(Self::new(params, root, pub_seed))
    }
}

/// XMSS or XMSS-MT signature.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Signature {
    params: Params,
    bytes: Vec<u8>,
}

impl Signature {
    pub(crate) fn new(params: Params, bytes: Vec<u8>) -> Self {
        debug_assert_eq!(bytes.len(), params.signature_bytes());
        Self { params, bytes }
    }

    /// Wrap an encoded signature for `params`.
    pub fn from_bytes(params: Params, bytes: &[u8]) -> Result<Self> {
        let expected = params.signature_bytes();
        if bytes.len() != expected {
            return Err(Error::InvalidSignatureLength {
                expected,
                actual: bytes.len(),
            });
        }
        Ok(Self::new(params, bytes.to_vec()))
    }

    /// Parameter set the signature was produced under.
    #[must_use]
    pub fn params(&self) -> &Params {
        &self.params
    }

    /// Leaf index encoded in the signature.
    #[must_use]
    pub fn index(&self) -> u64 {
        to_int(&self.bytes[..self.params.index_bytes()])
    }

    /// Get the signature bytes.
    #[must_use]
    pub fn to_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl AsRef<[u8]> for Signature {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

/// Verify a signature against a public key.
///
/// RFC 8391, Algorithms 14 and 17. The message digest is signed by the bottom
/// layer; each layer's recomputed root is the message of the layer above, and
/// the top root is compared with the public root in constant time. Every
/// failure, including a parameter mismatch, is reported as
/// [`Error::VerificationFailed`].
pub fn verify<H: HashSuite<N>, const N: usize>(
    pk: &PublicKey<N>,
    message: &[u8],
    signature: &Signature,
) -> Result<()> {
    let params = &pk.params;
    if signature.params != *params || check_suite::<H, N>(params).is_err() {
        return Err(Error::VerificationFailed);
    }
    let sig = signature.as_ref();
    if sig.len() != params.signature_bytes() {
        return Err(Error::VerificationFailed);
    }

    let ib = params.index_bytes();
    let idx = to_int(&sig[..ib]);
    if idx >= params.max_signatures() {
        return Err(Error::VerificationFailed);
    }

    let mut r = [0u8; N];
    r.copy_from_slice(&sig[ib..ib + N]);
    let mut node = H::h_msg(&r, &pk.root, idx, message);

    let th = params.tree_height();
    let leaf_mask = (1u64 << th) - 1;
    let mut idx_tree = idx;
    for (layer, layer_sig) in sig[ib + N..]
        .chunks_exact(params.reduced_sig_bytes())
        .enumerate()
    {
        let idx_leaf = (idx_tree & leaf_mask) as u32;
        idx_tree >>= th;
        let subtree = Address::subtree(layer as u32, idx_tree);
        node = root_from_sig::<H, N>(&node, layer_sig, idx_leaf, &pk.pub_seed, &subtree, params);
    }

    if bool::from(node.ct_eq(&pk.root)) {
        Ok(())
    } else {
        Err(Error::VerificationFailed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash_sha2::Sha2_256Hash;
    use crate::params::HashFunction;

    const N: usize = 32;

    /// Random source that fails after handing out `left` bytes.
    struct DryRng {
        left: usize,
    }

    impl rand_core::TryRngCore for DryRng {
        type Error = Error;

        fn try_next_u32(&mut self) -> core::result::Result<u32, Error> {
            let mut buf = [0u8; 4];
            self.try_fill_bytes(&mut buf)?;
            Ok(u32::from_le_bytes(buf))
        }

        fn try_next_u64(&mut self) -> core::result::Result<u64, Error> {
            let mut buf = [0u8; 8];
            self.try_fill_bytes(&mut buf)?;
            Ok(u64::from_le_bytes(buf))
        }

        fn try_fill_bytes(&mut self, dst: &mut [u8]) -> core::result::Result<(), Error> {
            if dst.len() > self.left {
                return Err(Error::InsufficientRandomness);
            }
            self.left -= dst.len();
            dst.fill(0x42);
            Ok(())
        }
    }

    impl rand_core::TryCryptoRng for DryRng {}

    #[test]
    fn test_failing_rng_is_reported() {
        for left in [0, N, 2 * N] {
            assert!(matches!(
                SecretSeeds::<N>::generate(&mut DryRng { left }),
                Err(Error::InsufficientRandomness)
            ));
        }
        let seeds = SecretSeeds::<N>::generate(&mut DryRng { left: 3 * N }).unwrap();
        assert_eq!(seeds.pub_seed, [0x42; N]);

        let params = Params::xmss_from_oid(0x01).unwrap();
        assert!(matches!(
            crate::XmssSigningKey::<Sha2_256Hash, N>::generate(params, 0, &mut DryRng { left: N }),
            Err(Error::InsufficientRandomness)
        ));
    }

    #[test]
    fn test_public_key_encoding() {
        let params = Params::xmss_from_oid(0x01).unwrap();
        let pk = PublicKey::<N>::new(params, [1u8; N], [2u8; N]);
        let bytes = pk.to_bytes();

        assert_eq!(bytes.len(), 68);
        assert_eq!(&bytes[..4], &[0, 0, 0, 1]);
        assert_eq!(&bytes[4..36], &[1u8; N]);
        assert_eq!(&bytes[36..], &[2u8; N]);
        assert_eq!(PublicKey::<N>::from_bytes(params, &bytes).unwrap(), pk);
    }

    #[test]
    fn test_public_key_rejects_wrong_oid_and_length() {
        let params = Params::xmss_from_oid(0x01).unwrap();
        let mut bytes = PublicKey::<N>::new(params, [1u8; N], [2u8; N]).to_bytes();

        assert_eq!(
            PublicKey::<N>::from_bytes(params, &bytes[..67]),
            Err(Error::InvalidKeyLength {
                expected: 68,
                actual: 67
            })
        );

        bytes[3] = 0x02;
        assert_eq!(
            PublicKey::<N>::from_bytes(params, &bytes),
            Err(Error::UnsupportedParameterSet)
        );

        let wide = Params::xmss_from_oid(0x04).unwrap();
        assert_eq!(
            PublicKey::<N>::from_bytes(wide, &bytes),
            Err(Error::UnsupportedParameterSet)
        );
    }

    #[test]
    fn test_secret_key_encoding_layout() {
        let params = Params::new(HashFunction::Sha2_256, 16, 4, 1).unwrap();
        let seeds = SecretSeeds::<N> {
            sk_seed: [1u8; N],
            sk_prf: [2u8; N],
            pub_seed: [3u8; N],
            root: [4u8; N],
        };
        let mut out = [0u8; 4 + 4 + 4 * N];
        seeds.write_secret_key(&mut out, &params, 7);

        assert_eq!(&out[..8], &[0, 0, 0, 0, 0, 0, 0, 7]);
        assert_eq!(&out[8..40], &[1u8; N]);
        assert_eq!(&out[40..72], &[2u8; N]);
        assert_eq!(&out[72..104], &[4u8; N]);
        assert_eq!(&out[104..], &[3u8; N]);

        let (decoded, idx) = SecretSeeds::<N>::read_secret_key(&out, &params).unwrap();
        assert_eq!(idx, 7);
        assert_eq!(decoded.sk_prf, seeds.sk_prf);
        assert_eq!(decoded.root, seeds.root);
    }

    #[test]
    fn test_wipe_keeps_public_part() {
        let mut seeds = SecretSeeds::<N> {
            sk_seed: [1u8; N],
            sk_prf: [2u8; N],
            pub_seed: [3u8; N],
            root: [4u8; N],
        };
        assert!(!seeds.is_wiped());
        seeds.wipe();
        assert!(seeds.is_wiped());
        assert_eq!(seeds.pub_seed, [3u8; N]);
        assert_eq!(seeds.root, [4u8; N]);
    }

    #[test]
    fn test_exhausted_index_encoding() {
        // h = 4 fits 2^h in the 4-byte XMSS field.
        let xmss = Params::new(HashFunction::Sha2_256, 16, 4, 1).unwrap();
        assert_eq!(stored_index(&xmss, 16), 16);
        assert_eq!(loaded_index(&xmss, 16, true), Ok(16));
        assert_eq!(loaded_index(&xmss, 17, false), Err(Error::EncodingError));
        assert_eq!(loaded_index(&xmss, 0xFFFF_FFFF, false), Ok(16));

        // h = 8 over one index byte: 0xFF is both the last leaf and the marker.
        let mt = Params::new(HashFunction::Sha2_256, 16, 8, 2).unwrap();
        assert_eq!(mt.index_bytes(), 1);
        assert_eq!(stored_index(&mt, 256), 0xFF);
        assert_eq!(loaded_index(&mt, 0xFF, false), Ok(255));
        assert_eq!(loaded_index(&mt, 0xFF, true), Ok(256));
        assert_eq!(loaded_index(&mt, 7, false), Ok(7));
    }

    #[test]
    fn test_signature_length_checked() {
        let params = Params::xmss_from_oid(0x01).unwrap();
        assert_eq!(
            Signature::from_bytes(params, &[0u8; 2499]),
            Err(Error::InvalidSignatureLength {
                expected: 2500,
                actual: 2499
            })
        );
        let sig = Signature::from_bytes(params, &[0u8; 2500]).unwrap();
        assert_eq!(sig.index(), 0);
    }

    #[test]
    fn test_verify_rejects_mismatched_params() {
        let params = Params::xmss_from_oid(0x01).unwrap();
        let other = Params::xmss_from_oid(0x02).unwrap();
        let pk = PublicKey::<N>::new(params, [0u8; N], [0u8; N]);
        let sig = Signature::from_bytes(other, &vec![0u8; other.signature_bytes()]).unwrap();

        assert_eq!(
            verify::<Sha2_256Hash, N>(&pk, b"msg", &sig),
            Err(Error::VerificationFailed)
        );
    }

    #[test]
    fn test_verify_rejects_out_of_range_index() {
        let params = Params::new(HashFunction::Sha2_256, 16, 4, 1).unwrap();
        let pk = PublicKey::<N>::new(params, [0u8; N], [0u8; N]);
        let mut bytes = vec![0u8; params.signature_bytes()];
        bytes[3] = 16;
        let sig = Signature::from_bytes(params, &bytes).unwrap();

        assert_eq!(
            verify::<Sha2_256Hash, N>(&pk, b"msg", &sig),
            Err(Error::VerificationFailed)
        );
    }
}
