//! Constant-time verification for WOTS+ signing.
//!
//! Tests that the time to sign a fixed digest does not depend on the secret
//! seed. The digest, and with it the number of chain steps, is public and
//! identical for both classes.
//!
//! Run with: `cargo run --release -p kestrel-timing --bin wots`

use core::cell::RefCell;

use dudect_bencher::rand::Rng;
use dudect_bencher::{ctbench_main, BenchRng, Class, CtRunner};
use kestrel_xmss::wots::{wots_chain, wots_sign_to};
use kestrel_xmss::{Address, Params, Sha2_256Hash};
use once_cell::sync::Lazy;
use rand::Rng as _;

const N: usize = 32;

/// Two secret seeds with very different bit patterns.
struct TestData {
    params: Params,
    sk_left: [u8; N],
    sk_right: [u8; N],
    pub_seed: [u8; N],
    digest: [u8; N],
}

static TEST_DATA: Lazy<TestData> = Lazy::new(|| {
    let mut rng = rand::rng();
    TestData {
        params: Params::xmss_from_oid(0x01).expect("registered OID"),
        sk_left: [0x00; N],
        sk_right: rng.random(),
        pub_seed: rng.random(),
        digest: rng.random(),
    }
});

/// Number of iterations per batch.
const ITERATIONS: usize = 2_000;

fn classes(rng: &mut BenchRng) -> Vec<Class> {
    (0..ITERATIONS)
        .map(|_| if rng.gen::<bool>() { Class::Left } else { Class::Right })
        .collect()
}

/// WOTS+ signing of the same digest under two secret seeds.
fn bench_wots_sign(runner: &mut CtRunner, rng: &mut BenchRng) {
    let data = &*TEST_DATA;
    let sig = RefCell::new(vec![0u8; data.params.wots_sig_bytes()]);

    for class in classes(rng) {
        let sk_seed = match class {
            Class::Left => &data.sk_left,
            Class::Right => &data.sk_right,
        };
        let adrs = RefCell::new(Address::subtree(0, 0).ots_for(7));

        runner.run_one(class, || {
            wots_sign_to::<Sha2_256Hash, N>(
                &mut sig.borrow_mut(),
                &data.digest,
                sk_seed,
                &data.pub_seed,
                &mut adrs.borrow_mut(),
                &data.params,
            );
        });
    }
}

/// A single chain of fixed length over two different secret start values.
fn bench_chain(runner: &mut CtRunner, rng: &mut BenchRng) {
    let data = &*TEST_DATA;

    for class in classes(rng) {
        let start = match class {
            Class::Left => &data.sk_left,
            Class::Right => &data.sk_right,
        };
        let mut adrs = Address::subtree(0, 0).ots_for(7);
        adrs.set_chain(3);
        let adrs = RefCell::new(adrs);

        runner.run_one(class, || {
            let _ = wots_chain::<Sha2_256Hash, N>(start, 0, 8, &data.pub_seed, &mut adrs.borrow_mut());
        });
    }
}

ctbench_main!(bench_wots_sign, bench_chain);
