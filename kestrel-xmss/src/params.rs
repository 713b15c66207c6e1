//! XMSS and XMSS-MT parameter sets as defined in RFC 8391.
//!
//! A parameter set fixes the hash function (and with it the digest length
//! `n`), the Winternitz parameter `w`, the total tree height `h` and the number
//! of layers `d`. All other sizes are derived:
//!
//! - `len1 = ceil(8n / log2(w))`
//! - `len2 = floor(log2(len1 * (w - 1)) / log2(w)) + 1`
//! - `len = len1 + len2`
//! - `tree_height = h / d`
//!
//! The registered sets (RFC 8391, Appendix A) are looked up by OID or by name.
//! [`Params::new`] builds unregistered tuples, mostly useful for small test trees.

use kestrel_core::{Error, Result};

/// Largest supported digest length in bytes.
pub const MAX_N: usize = 64;

/// Largest supported height of a single tree.
pub const MAX_TREE_HEIGHT: u32 = 20;

/// Largest supported total height (the leaf index must fit in 64 bits).
pub const MAX_HEIGHT: u32 = 60;

/// Largest WOTS+ length (n = 64, w = 4).
pub const MAX_WOTS_LEN: usize = 261;

/// Address size in bytes.
pub const ADRS_BYTES: usize = 32;

/// Size of the OID prefix of encoded keys.
pub const OID_BYTES: usize = 4;

/// Hash function family and output length.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HashFunction {
    /// SHA-256, n = 32.
    Sha2_256,
    /// SHA-512, n = 64.
    Sha2_512,
    /// SHAKE128 with 256-bit output, n = 32.
    Shake128,
    /// SHAKE256 with 512-bit output, n = 64.
    Shake256,
}

impl HashFunction {
    /// Digest length in bytes.
    #[must_use]
    pub const fn n(self) -> usize {
        match self {
            HashFunction::Sha2_256 | HashFunction::Shake128 => 32,
            HashFunction::Sha2_512 | HashFunction::Shake256 => 64,
        }
    }
}

/// Registry entry: the primitive tuple behind an OID.
struct OidEntry {
    oid: u32,
    name: &'static str,
    func: HashFunction,
    h: u32,
    d: u32,
}

const fn entry(oid: u32, name: &'static str, func: HashFunction, h: u32, d: u32) -> OidEntry {
    OidEntry {
        oid,
        name,
        func,
        h,
        d,
    }
}

use HashFunction::{Sha2_256, Sha2_512, Shake128, Shake256};

/// RFC 8391 Table 7 (XMSS). All registered sets use w = 16.
const XMSS_OIDS: [OidEntry; 12] = [
    entry(0x01, "XMSS-SHA2_10_256", Sha2_256, 10, 1),
    entry(0x02, "XMSS-SHA2_16_256", Sha2_256, 16, 1),
    entry(0x03, "XMSS-SHA2_20_256", Sha2_256, 20, 1),
    entry(0x04, "XMSS-SHA2_10_512", Sha2_512, 10, 1),
    entry(0x05, "XMSS-SHA2_16_512", Sha2_512, 16, 1),
    entry(0x06, "XMSS-SHA2_20_512", Sha2_512, 20, 1),
    entry(0x07, "XMSS-SHAKE_10_256", Shake128, 10, 1),
    entry(0x08, "XMSS-SHAKE_16_256", Shake128, 16, 1),
    entry(0x09, "XMSS-SHAKE_20_256", Shake128, 20, 1),
    entry(0x0a, "XMSS-SHAKE_10_512", Shake256, 10, 1),
    entry(0x0b, "XMSS-SHAKE_16_512", Shake256, 16, 1),
    entry(0x0c, "XMSS-SHAKE_20_512", Shake256, 20, 1),
];

/// RFC 8391 Table 8 (XMSS-MT).
const XMSS_MT_OIDS: [OidEntry; 32] = [
    entry(0x01, "XMSSMT-SHA2_20/2_256", Sha2_256, 20, 2),
    entry(0x02, "XMSSMT-SHA2_20/4_256", Sha2_256, 20, 4),
    entry(0x03, "XMSSMT-SHA2_40/2_256", Sha2_256, 40, 2),
    entry(0x04, "XMSSMT-SHA2_40/4_256", Sha2_256, 40, 4),
    entry(0x05, "XMSSMT-SHA2_40/8_256", Sha2_256, 40, 8),
    entry(0x06, "XMSSMT-SHA2_60/3_256", Sha2_256, 60, 3),
    entry(0x07, "XMSSMT-SHA2_60/6_256", Sha2_256, 60, 6),
    entry(0x08, "XMSSMT-SHA2_60/12_256", Sha2_256, 60, 12),
    entry(0x09, "XMSSMT-SHA2_20/2_512", Sha2_512, 20, 2),
    entry(0x0a, "XMSSMT-SHA2_20/4_512", Sha2_512, 20, 4),
    entry(0x0b, "XMSSMT-SHA2_40/2_512", Sha2_512, 40, 2),
    entry(0x0c, "XMSSMT-SHA2_40/4_512", Sha2_512, 40, 4),
    entry(0x0d, "XMSSMT-SHA2_40/8_512", Sha2_512, 40, 8),
    entry(0x0e, "XMSSMT-SHA2_60/3_512", Sha2_512, 60, 3),
    entry(0x0f, "XMSSMT-SHA2_60/6_512", Sha2_512, 60, 6),
    entry(0x10, "XMSSMT-SHA2_60/12_512", Sha2_512, 60, 12),
    entry(0x11, "XMSSMT-SHAKE_20/2_256", Shake128, 20, 2),
    entry(0x12, "XMSSMT-SHAKE_20/4_256", Shake128, 20, 4),
    entry(0x13, "XMSSMT-SHAKE_40/2_256", Shake128, 40, 2),
    entry(0x14, "XMSSMT-SHAKE_40/4_256", Shake128, 40, 4),
    entry(0x15, "XMSSMT-SHAKE_40/8_256", Shake128, 40, 8),
    entry(0x16, "XMSSMT-SHAKE_60/3_256", Shake128, 60, 3),
    entry(0x17, "XMSSMT-SHAKE_60/6_256", Shake128, 60, 6),
    entry(0x18, "XMSSMT-SHAKE_60/12_256", Shake128, 60, 12),
    entry(0x19, "XMSSMT-SHAKE_20/2_512", Shake256, 20, 2),
    entry(0x1a, "XMSSMT-SHAKE_20/4_512", Shake256, 20, 4),
    entry(0x1b, "XMSSMT-SHAKE_40/2_512", Shake256, 40, 2),
    entry(0x1c, "XMSSMT-SHAKE_40/4_512", Shake256, 40, 4),
    entry(0x1d, "XMSSMT-SHAKE_40/8_512", Shake256, 40, 8),
    entry(0x1e, "XMSSMT-SHAKE_60/3_512", Shake256, 60, 3),
    entry(0x1f, "XMSSMT-SHAKE_60/6_512", Shake256, 60, 6),
    entry(0x20, "XMSSMT-SHAKE_60/12_512", Shake256, 60, 12),
];

/// Winternitz parameter of every registered set.
const REGISTERED_W: u32 = 16;

/// A fully derived XMSS or XMSS-MT parameter set.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Params {
    oid: u32,
    func: HashFunction,
    n: usize,
    w: u32,
    log_w: u32,
    len1: usize,
    len2: usize,
    len: usize,
    h: u32,
    tree_height: u32,
    d: u32,
    index_bytes: usize,
    sig_bytes: usize,
    pk_bytes: usize,
    sk_bytes: usize,
}

const fn floor_log2(mut x: usize) -> usize {
    let mut r = 0;
    while x > 1 {
        x >>= 1;
        r += 1;
    }
    r
}

impl Params {
    /// Derive all sizes from the primitive tuple. Inputs are assumed valid.
    const fn derive(oid: u32, func: HashFunction, w: u32, h: u32, d: u32) -> Self {
        let n = func.n();
        let log_w = if w == 4 { 2 } else { 4 };
        let len1 = (8 * n).div_ceil(log_w as usize);
        let len2 = floor_log2(len1 * (w as usize - 1)) / log_w as usize + 1;
        let len = len1 + len2;
        let index_bytes = if d == 1 { 4 } else { (h as usize).div_ceil(8) };
        Self {
            oid,
            func,
            n,
            w,
            log_w,
            len1,
            len2,
            len,
            h,
            tree_height: h / d,
            d,
            index_bytes,
            sig_bytes: index_bytes + n + (d as usize) * len * n + (h as usize) * n,
            pk_bytes: OID_BYTES + 2 * n,
            sk_bytes: OID_BYTES + index_bytes + 4 * n,
        }
    }

    /// Build an unregistered parameter set (OID 0).
    ///
    /// `d == 1` gives an XMSS set, `d > 1` an XMSS-MT set.
    pub fn new(func: HashFunction, w: u32, h: u32, d: u32) -> Result<Self> {
        if w != 4 && w != 16 {
            return Err(Error::UnsupportedParameterSet);
        }
        if d == 0 || h == 0 || h % d != 0 || h > MAX_HEIGHT || h / d > MAX_TREE_HEIGHT {
            return Err(Error::UnsupportedParameterSet);
        }
        Ok(Self::derive(0, func, w, h, d))
    }

    /// Look up a registered XMSS parameter set by OID.
    pub const fn xmss_from_oid(oid: u32) -> Result<Self> {
        let mut i = 0;
        while i < XMSS_OIDS.len() {
            let e = &XMSS_OIDS[i];
            if e.oid == oid {
                return Ok(Self::derive(e.oid, e.func, REGISTERED_W, e.h, e.d));
            }
            i += 1;
        }
        Err(Error::UnsupportedParameterSet)
    }

    /// Look up a registered XMSS-MT parameter set by OID.
    pub const fn xmss_mt_from_oid(oid: u32) -> Result<Self> {
        let mut i = 0;
        while i < XMSS_MT_OIDS.len() {
            let e = &XMSS_MT_OIDS[i];
            if e.oid == oid {
                return Ok(Self::derive(e.oid, e.func, REGISTERED_W, e.h, e.d));
            }
            i += 1;
        }
        Err(Error::UnsupportedParameterSet)
    }

    /// Look up a registered parameter set by name, e.g. `"XMSS-SHA2_10_256"`
    /// or `"XMSSMT-SHAKE_20/4_256"`.
    pub fn from_name(name: &str) -> Result<Self> {
        XMSS_OIDS
            .iter()
            .chain(XMSS_MT_OIDS.iter())
            .find(|e| e.name == name)
            .map(|e| Self::derive(e.oid, e.func, REGISTERED_W, e.h, e.d))
            .ok_or(Error::UnsupportedParameterSet)
    }

    /// Registered name of this set, `None` for custom sets.
    #[must_use]
    pub fn name(&self) -> Option<&'static str> {
        let table: &[OidEntry] = if self.d == 1 {
            &XMSS_OIDS
        } else {
            &XMSS_MT_OIDS
        };
        table
            .iter()
            .find(|e| {
                e.oid == self.oid
                    && e.func == self.func
                    && e.h == self.h
                    && e.d == self.d
                    && self.w == REGISTERED_W
            })
            .map(|e| e.name)
    }

    /// Check the BDS retain parameter against this set.
    ///
    /// `k` must be even and no larger than the height of a single tree.
    pub fn check_bds_k(&self, k: u32) -> Result<()> {
        if k % 2 != 0 || k > self.tree_height {
            return Err(Error::InvalidBdsParameter {
                k,
                tree_height: self.tree_height,
            });
        }
        Ok(())
    }

    /// OID (0 for custom sets).
    #[must_use]
    pub const fn oid(&self) -> u32 {
        self.oid
    }

    /// Hash function of the set.
    #[must_use]
    pub const fn hash_function(&self) -> HashFunction {
        self.func
    }

    /// Digest length `n` in bytes.
    #[must_use]
    pub const fn n(&self) -> usize {
        self.n
    }

    /// Winternitz parameter `w`.
    #[must_use]
    pub const fn w(&self) -> u32 {
        self.w
    }

    /// `log2(w)`.
    #[must_use]
    pub const fn log_w(&self) -> u32 {
        self.log_w
    }

    /// Number of message digits.
    #[must_use]
    pub const fn len1(&self) -> usize {
        self.len1
    }

    /// Number of checksum digits.
    #[must_use]
    pub const fn len2(&self) -> usize {
        self.len2
    }

    /// Number of WOTS+ chains.
    #[must_use]
    pub const fn wots_len(&self) -> usize {
        self.len
    }

    /// Size of a WOTS+ signature in bytes.
    #[must_use]
    pub const fn wots_sig_bytes(&self) -> usize {
        self.len * self.n
    }

    /// Total height `h`.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.h
    }

    /// Height of a single tree, `h / d`.
    #[must_use]
    pub const fn tree_height(&self) -> u32 {
        self.tree_height
    }

    /// Number of layers `d`.
    #[must_use]
    pub const fn layers(&self) -> u32 {
        self.d
    }

    /// Whether this is an XMSS-MT set.
    #[must_use]
    pub const fn is_multi_tree(&self) -> bool {
        self.d > 1
    }

    /// Width of the encoded leaf index.
    #[must_use]
    pub const fn index_bytes(&self) -> usize {
        self.index_bytes
    }

    /// Signature size in bytes.
    #[must_use]
    pub const fn signature_bytes(&self) -> usize {
        self.sig_bytes
    }

    /// Encoded public key size in bytes (OID, root, seed).
    #[must_use]
    pub const fn public_key_bytes(&self) -> usize {
        self.pk_bytes
    }

    /// Encoded secret key size in bytes (OID, index, seeds, root).
    #[must_use]
    pub const fn secret_key_bytes(&self) -> usize {
        self.sk_bytes
    }

    /// Number of signatures a key pair can produce, `2^h`.
    #[must_use]
    pub const fn max_signatures(&self) -> u64 {
        1u64 << self.h
    }

    /// Size of one reduced signature (WOTS+ signature and auth path of one layer).
    #[must_use]
    pub const fn reduced_sig_bytes(&self) -> usize {
        (self.len + self.tree_height as usize) * self.n
    }
}
