#![no_main]

use std::sync::OnceLock;

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

use kestrel_xmss::{
    xmss_verify, HashFunction, Params, PublicKey, Shake128Hash, Signature, XmssSigningKey,
};

const N: usize = 32;

fn params() -> Params {
    Params::new(HashFunction::Shake128, 16, 4, 1).unwrap()
}

/// One key pair and a valid signature at index 3, shared by all runs.
fn fixture() -> &'static (PublicKey<N>, Vec<u8>) {
    static FIXTURE: OnceLock<(PublicKey<N>, Vec<u8>)> = OnceLock::new();
    FIXTURE.get_or_init(|| {
        let (mut sk, pk) =
            XmssSigningKey::<Shake128Hash, N>::from_seed(params(), 0, [1; N], [2; N], [3; N])
                .unwrap();
        for _ in 0..3 {
            sk.sign(b"warmup").unwrap();
        }
        let sig = sk.sign(b"fuzz").unwrap();
        (pk, sig.to_bytes().to_vec())
    })
}

#[derive(Debug, Arbitrary)]
struct VerifyInput {
    message: Vec<u8>,
    corruption_index: usize,
    corruption_value: u8,
    raw_signature: Vec<u8>,
}

fuzz_target!(|input: VerifyInput| {
    let (pk, valid) = fixture();

    // Arbitrary bytes must be rejected without panicking
    if let Ok(sig) = Signature::from_bytes(params(), &input.raw_signature) {
        let _ = xmss_verify::<Shake128Hash, N>(pk, &input.message, &sig);
    }

    // A corrupted valid signature must never verify
    let mut corrupted = valid.clone();
    let idx = input.corruption_index % corrupted.len();
    corrupted[idx] ^= input.corruption_value | 1; // Ensure at least 1 bit changed
    let sig = Signature::from_bytes(params(), &corrupted).unwrap();
    assert!(
        xmss_verify::<Shake128Hash, N>(pk, b"fuzz", &sig).is_err(),
        "verification should fail with corrupted signature"
    );

    // The valid signature only verifies its own message
    let sig = Signature::from_bytes(params(), valid).unwrap();
    let result = xmss_verify::<Shake128Hash, N>(pk, &input.message, &sig);
    assert_eq!(result.is_ok(), input.message == b"fuzz");
});
