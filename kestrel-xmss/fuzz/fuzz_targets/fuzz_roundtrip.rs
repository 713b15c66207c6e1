#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

use kestrel_xmss::{xmss_verify, HashFunction, Params, Shake128Hash, XmssSigningKey};

/// A deterministic RNG seeded from fuzzer input.
struct FuzzRng {
    seed: [u8; 32],
    counter: u64,
}

impl FuzzRng {
    fn new(seed: &[u8]) -> Self {
        let mut s = [0u8; 32];
        let len = seed.len().min(32);
        s[..len].copy_from_slice(&seed[..len]);
        Self { seed: s, counter: 0 }
    }

    fn next_bytes(&mut self, dest: &mut [u8]) {
        use sha3::{Shake256, digest::{ExtendableOutput, Update, XofReader}};

        let mut hasher = Shake256::default();
        hasher.update(&self.seed);
        hasher.update(&self.counter.to_le_bytes());
        self.counter += 1;

        let mut reader = hasher.finalize_xof();
        reader.read(dest);
    }
}

impl rand_core::RngCore for FuzzRng {
    fn next_u32(&mut self) -> u32 {
        let mut buf = [0u8; 4];
        self.next_bytes(&mut buf);
        u32::from_le_bytes(buf)
    }

    fn next_u64(&mut self) -> u64 {
        let mut buf = [0u8; 8];
        self.next_bytes(&mut buf);
        u64::from_le_bytes(buf)
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.next_bytes(dest);
    }
}

impl rand_core::CryptoRng for FuzzRng {}

#[derive(Debug, Arbitrary)]
struct RoundtripInput {
    key_seed: Vec<u8>,
    messages: Vec<Vec<u8>>,
    bds_k: u8,
}

fuzz_target!(|input: RoundtripInput| {
    if input.key_seed.is_empty() {
        return;
    }

    // h = 4 keeps key generation cheap; k in {0, 2, 4}
    let params = Params::new(HashFunction::Shake128, 16, 4, 1).unwrap();
    let bds_k = u32::from(input.bds_k % 3) * 2;

    let mut rng = FuzzRng::new(&input.key_seed);
    let (mut sk, pk) = XmssSigningKey::<Shake128Hash, 32>::generate(params, bds_k, &mut rng).unwrap();

    for (i, message) in input.messages.iter().take(20).enumerate() {
        match sk.sign(message) {
            Ok(sig) => {
                assert!(i < 16, "signed past the last leaf");
                assert_eq!(sig.index(), i as u64);
                assert!(
                    xmss_verify::<Shake128Hash, 32>(&pk, message, &sig).is_ok(),
                    "verification should succeed with correct data"
                );
            }
            Err(err) => {
                assert!(i >= 16, "unexpected error {err:?} at index {i}");
                assert_eq!(err, kestrel_core::Error::KeyExhausted);
            }
        }
    }
});
