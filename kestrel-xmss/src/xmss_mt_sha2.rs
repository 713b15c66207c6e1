//! Registered XMSS-MT parameter sets with SHA-256 / SHA-512 (RFC 8391, Table 8).
//!
//! Key generation builds one tree of height `h / d` per layer. Sets whose
//! layer trees have height 20 are ignored in the default test run.

use crate::types::define_xmss_variant;

define_xmss_variant!(
    module: xmss_mt_sha2_20_2_256,
    variant_name: XmssMtSha2_20_2_256,
    name: "XMSSMT-SHA2_20/2_256",
    params: Params::xmss_mt_from_oid(0x01),
    signing_key: XmssMtSigningKey,
    verify_fn: xmss_mt_verify,
    hash_type: crate::hash_sha2::Sha2_256Hash,
    n: 32,
    sk_size: 135,
    pk_size: 68,
    sig_size: 4963,
    max_signatures: 1u64 << 20,
    keygen_test: []
);

define_xmss_variant!(
    module: xmss_mt_sha2_20_4_256,
    variant_name: XmssMtSha2_20_4_256,
    name: "XMSSMT-SHA2_20/4_256",
    params: Params::xmss_mt_from_oid(0x02),
    signing_key: XmssMtSigningKey,
    verify_fn: xmss_mt_verify,
    hash_type: crate::hash_sha2::Sha2_256Hash,
    n: 32,
    sk_size: 135,
    pk_size: 68,
    sig_size: 9251,
    max_signatures: 1u64 << 20,
    keygen_test: []
);

define_xmss_variant!(
    module: xmss_mt_sha2_40_2_256,
    variant_name: XmssMtSha2_40_2_256,
    name: "XMSSMT-SHA2_40/2_256",
    params: Params::xmss_mt_from_oid(0x03),
    signing_key: XmssMtSigningKey,
    verify_fn: xmss_mt_verify,
    hash_type: crate::hash_sha2::Sha2_256Hash,
    n: 32,
    sk_size: 137,
    pk_size: 68,
    sig_size: 5605,
    max_signatures: 1u64 << 40,
    keygen_test: [ignore = "builds 2^20 leaves per layer"]
);

define_xmss_variant!(
    module: xmss_mt_sha2_40_4_256,
    variant_name: XmssMtSha2_40_4_256,
    name: "XMSSMT-SHA2_40/4_256",
    params: Params::xmss_mt_from_oid(0x04),
    signing_key: XmssMtSigningKey,
    verify_fn: xmss_mt_verify,
    hash_type: crate::hash_sha2::Sha2_256Hash,
    n: 32,
    sk_size: 137,
    pk_size: 68,
    sig_size: 9893,
    max_signatures: 1u64 << 40,
    keygen_test: []
);

define_xmss_variant!(
    module: xmss_mt_sha2_40_8_256,
    variant_name: XmssMtSha2_40_8_256,
    name: "XMSSMT-SHA2_40/8_256",
    params: Params::xmss_mt_from_oid(0x05),
    signing_key: XmssMtSigningKey,
    verify_fn: xmss_mt_verify,
    hash_type: crate::hash_sha2::Sha2_256Hash,
    n: 32,
    sk_size: 137,
    pk_size: 68,
    sig_size: 18469,
    max_signatures: 1u64 << 40,
    keygen_test: []
);

define_xmss_variant!(
    module: xmss_mt_sha2_60_3_256,
    variant_name: XmssMtSha2_60_3_256,
    name: "XMSSMT-SHA2_60/3_256",
    params: Params::xmss_mt_from_oid(0x06),
    signing_key: XmssMtSigningKey,
    verify_fn: xmss_mt_verify,
    hash_type: crate::hash_sha2::Sha2_256Hash,
    n: 32,
    sk_size: 140,
    pk_size: 68,
    sig_size: 8392,
    max_signatures: 1u64 << 60,
    keygen_test: [ignore = "builds 2^20 leaves per layer"]
);

define_xmss_variant!(
    module: xmss_mt_sha2_60_6_256,
    variant_name: XmssMtSha2_60_6_256,
    name: "XMSSMT-SHA2_60/6_256",
    params: Params::xmss_mt_from_oid(0x07),
    signing_key: XmssMtSigningKey,
    verify_fn: xmss_mt_verify,
    hash_type: crate::hash_sha2::Sha2_256Hash,
    n: 32,
    sk_size: 140,
    pk_size: 68,
    sig_size: 14824,
    max_signatures: 1u64 << 60,
    keygen_test: []
);

define_xmss_variant!(
    module: xmss_mt_sha2_60_12_256,
    variant_name: XmssMtSha2_60_12_256,
    name: "XMSSMT-SHA2_60/12_256",
    params: Params::xmss_mt_from_oid(0x08),
    signing_key: XmssMtSigningKey,
    verify_fn: xmss_mt_verify,
    hash_type: crate::hash_sha2::Sha2_256Hash,
    n: 32,
    sk_size: 140,
    pk_size: 68,
    sig_size: 27688,
    max_signatures: 1u64 << 60,
    keygen_test: []
);

define_xmss_variant!(
    module: xmss_mt_sha2_20_2_512,
    variant_name: XmssMtSha2_20_2_512,
    name: "XMSSMT-SHA2_20/2_512",
    params: Params::xmss_mt_from_oid(0x09),
    signing_key: XmssMtSigningKey,
    verify_fn: xmss_mt_verify,
    hash_type: crate::hash_sha2::Sha2_512Hash,
    n: 64,
    sk_size: 263,
    pk_size: 132,
    sig_size: 18115,
    max_signatures: 1u64 << 20,
    keygen_test: []
);

define_xmss_variant!(
    module: xmss_mt_sha2_20_4_512,
    variant_name: XmssMtSha2_20_4_512,
    name: "XMSSMT-SHA2_20/4_512",
    params: Params::xmss_mt_from_oid(0x0a),
    signing_key: XmssMtSigningKey,
    verify_fn: xmss_mt_verify,
    hash_type: crate::hash_sha2::Sha2_512Hash,
    n: 64,
    sk_size: 263,
    pk_size: 132,
    sig_size: 34883,
    max_signatures: 1u64 << 20,
    keygen_test: []
);

define_xmss_variant!(
    module: xmss_mt_sha2_40_2_512,
    variant_name: XmssMtSha2_40_2_512,
    name: "XMSSMT-SHA2_40/2_512",
    params: Params::xmss_mt_from_oid(0x0b),
    signing_key: XmssMtSigningKey,
    verify_fn: xmss_mt_verify,
    hash_type: crate::hash_sha2::Sha2_512Hash,
    n: 64,
    sk_size: 265,
    pk_size: 132,
    sig_size: 19397,
    max_signatures: 1u64 << 40,
    keygen_test: [ignore = "builds 2^20 leaves per layer"]
);

define_xmss_variant!(
    module: xmss_mt_sha2_40_4_512,
    variant_name: XmssMtSha2_40_4_512,
    name: "XMSSMT-SHA2_40/4_512",
    params: Params::xmss_mt_from_oid(0x0c),
    signing_key: XmssMtSigningKey,
    verify_fn: xmss_mt_verify,
    hash_type: crate::hash_sha2::Sha2_512Hash,
    n: 64,
    sk_size: 265,
    pk_size: 132,
    sig_size: 36165,
    max_signatures: 1u64 << 40,
    keygen_test: []
);

define_xmss_variant!(
    module: xmss_mt_sha2_40_8_512,
    variant_name: XmssMtSha2_40_8_512,
    name: "XMSSMT-SHA2_40/8_512",
    params: Params::xmss_mt_from_oid(0x0d),
    signing_key: XmssMtSigningKey,
    verify_fn: xmss_mt_verify,
    hash_type: crate::hash_sha2::Sha2_512Hash,
    n: 64,
    sk_size: 265,
    pk_size: 132,
    sig_size: 69701,
    max_signatures: 1u64 << 40,
    keygen_test: []
);

define_xmss_variant!(
    module: xmss_mt_sha2_60_3_512,
    variant_name: XmssMtSha2_60_3_512,
    name: "XMSSMT-SHA2_60/3_512",
    params: Params::xmss_mt_from_oid(0x0e),
    signing_key: XmssMtSigningKey,
    verify_fn: xmss_mt_verify,
    hash_type: crate::hash_sha2::Sha2_512Hash,
    n: 64,
    sk_size: 268,
    pk_size: 132,
    sig_size: 29064,
    max_signatures: 1u64 << 60,
    keygen_test: [ignore = "builds 2^20 leaves per layer"]
);

define_xmss_variant!(
    module: xmss_mt_sha2_60_6_512,
    variant_name: XmssMtSha2_60_6_512,
    name: "XMSSMT-SHA2_60/6_512",
    params: Params::xmss_mt_from_oid(0x0f),
    signing_key: XmssMtSigningKey,
    verify_fn: xmss_mt_verify,
    hash_type: crate::hash_sha2::Sha2_512Hash,
    n: 64,
    sk_size: 268,
    pk_size: 132,
    sig_size: 54216,
    max_signatures: 1u64 << 60,
    keygen_test: []
);

define_xmss_variant!(
    module: xmss_mt_sha2_60_12_512,
    variant_name: XmssMtSha2_60_12_512,
    name: "XMSSMT-SHA2_60/12_512",
    params: Params::xmss_mt_from_oid(0x10),
    signing_key: XmssMtSigningKey,
    verify_fn: xmss_mt_verify,
    hash_type: crate::hash_sha2::Sha2_512Hash,
    n: 64,
    sk_size: 268,
    pk_size: 132,
    sig_size: 104520,
    max_signatures: 1u64 << 60,
    keygen_test: []
);
