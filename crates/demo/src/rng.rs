//! Seeding for reproducible workloads.

use rand::SeedableRng;
use rand::rngs::StdRng;

/// RNG for the `index`-th thread of a run.
///
/// With a base seed every thread gets a distinct, reproducible stream;
/// without one, each thread draws from OS entropy.
pub(crate) fn thread_rng_for(seed: Option<u64>, index: u64) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(index.wrapping_mul(0x9E37_79B9_7F4A_7C15))),
        None => StdRng::from_entropy(),
    }
}
