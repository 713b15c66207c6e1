#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

use kestrel_xmss::{
    HashFunction, Params, PublicKey, Shake128Hash, XmssMtSigningKey, XmssSigningKey,
};

const N: usize = 32;

#[derive(Debug, Arbitrary)]
struct DecodeInput {
    bytes: Vec<u8>,
    message: Vec<u8>,
}

fuzz_target!(|input: DecodeInput| {
    let xmss = Params::new(HashFunction::Shake128, 16, 4, 1).unwrap();
    let mt = Params::new(HashFunction::Shake128, 16, 4, 2).unwrap();

    let _ = PublicKey::<N>::from_bytes(xmss, &input.bytes);

    // A context that decodes must export to a context that decodes to the
    // same index. Signing may fail, but a failure must not move the index.
    if let Ok(mut sk) = XmssSigningKey::<Shake128Hash, N>::from_bytes(xmss, &input.bytes) {
        let again = XmssSigningKey::<Shake128Hash, N>::from_bytes(xmss, &sk.to_bytes()).unwrap();
        assert_eq!(again.index(), sk.index());
        let before = sk.index();
        if sk.sign(&input.message).is_err() {
            assert_eq!(sk.index(), before);
        }
    }
    if let Ok(mut sk) = XmssMtSigningKey::<Shake128Hash, N>::from_bytes(mt, &input.bytes) {
        let again = XmssMtSigningKey::<Shake128Hash, N>::from_bytes(mt, &sk.to_bytes()).unwrap();
        assert_eq!(again.index(), sk.index());
        let before = sk.index();
        if sk.sign(&input.message).is_err() {
            assert_eq!(sk.index(), before);
        }
    }
});
