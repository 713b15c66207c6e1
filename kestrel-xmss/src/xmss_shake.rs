//! Registered XMSS parameter sets with SHAKE128 / SHAKE256 (RFC 8391, Table 7).
//!
//! Trees of height 16 and 20 take minutes to generate, so their key
//! generation tests are ignored by default.

use crate::types::define_xmss_variant;

define_xmss_variant!(
    module: xmss_shake_10_256,
    variant_name: XmssShake_10_256,
    name: "XMSS-SHAKE_10_256",
    params: Params::xmss_from_oid(0x07),
    signing_key: XmssSigningKey,
    verify_fn: xmss_verify,
    hash_type: crate::hash_shake::Shake128Hash,
    n: 32,
    sk_size: 136,
    pk_size: 68,
    sig_size: 2500,
    max_signatures: 1u64 << 10,
    keygen_test: []
);

define_xmss_variant!(
    module: xmss_shake_16_256,
    variant_name: XmssShake_16_256,
    name: "XMSS-SHAKE_16_256",
    params: Params::xmss_from_oid(0x08),
    signing_key: XmssSigningKey,
    verify_fn: xmss_verify,
    hash_type: crate::hash_shake::Shake128Hash,
    n: 32,
    sk_size: 136,
    pk_size: 68,
    sig_size: 2692,
    max_signatures: 1u64 << 16,
    keygen_test: [ignore = "builds 2^16 leaves"]
);

define_xmss_variant!(
    module: xmss_shake_20_256,
    variant_name: XmssShake_20_256,
    name: "XMSS-SHAKE_20_256",
    params: Params::xmss_from_oid(0x09),
    signing_key: XmssSigningKey,
    verify_fn: xmss_verify,
    hash_type: crate::hash_shake::Shake128Hash,
    n: 32,
    sk_size: 136,
    pk_size: 68,
    sig_size: 2820,
    max_signatures: 1u64 << 20,
    keygen_test: [ignore = "builds 2^20 leaves"]
);

define_xmss_variant!(
    module: xmss_shake_10_512,
    variant_name: XmssShake_10_512,
    name: "XMSS-SHAKE_10_512",
    params: Params::xmss_from_oid(0x0a),
    signing_key: XmssSigningKey,
    verify_fn: xmss_verify,
    hash_type: crate::hash_shake::Shake256Hash,
    n: 64,
    sk_size: 264,
    pk_size: 132,
    sig_size: 9092,
    max_signatures: 1u64 << 10,
    keygen_test: []
);

define_xmss_variant!(
    module: xmss_shake_16_512,
    variant_name: XmssShake_16_512,
    name: "XMSS-SHAKE_16_512",
    params: Params::xmss_from_oid(0x0b),
    signing_key: XmssSigningKey,
    verify_fn: xmss_verify,
    hash_type: crate::hash_shake::Shake256Hash,
    n: 64,
    sk_size: 264,
    pk_size: 132,
    sig_size: 9476,
    max_signatures: 1u64 << 16,
    keygen_test: [ignore = "builds 2^16 leaves"]
);

define_xmss_variant!(
    module: xmss_shake_20_512,
    variant_name: XmssShake_20_512,
    name: "XMSS-SHAKE_20_512",
    params: Params::xmss_from_oid(0x0c),
    signing_key: XmssSigningKey,
    verify_fn: xmss_verify,
    hash_type: crate::hash_shake::Shake256Hash,
    n: 64,
    sk_size: 264,
    pk_size: 132,
    sig_size: 9732,
    max_signatures: 1u64 << 20,
    keygen_test: [ignore = "builds 2^20 leaves"]
);
