//! Random number generation and shuffling for ensemble construction.
//!
//! # Reproducibility
//!
//! Every ensemble context owns its own `SmallRng`. Contexts built with an
//! explicit seed are deterministic on a given platform; contexts built
//! without one derive their seed from a process-wide seed drawn from OS
//! entropy exactly once, on first use.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::OnceLock;

use rand::rngs::SmallRng;
use rand::Rng;

static PROCESS_SEED: OnceLock<u64> = OnceLock::new();
static STREAMS_ISSUED: AtomicU64 = AtomicU64::new(0);

/// Generator behind [`EnsembleContext::with_seed`](crate::ensemble::EnsembleContext::with_seed).
///
/// Equal seeds shuffle leaf ensembles identically on a given platform,
/// which is what makes ensemble results reproducible between runs.
///
/// # Examples
/// ```
/// use u_uncertain::random::create_rng;
/// use rand::Rng;
/// let mut rng = create_rng(42);
/// let x: f64 = rng.random();
/// assert!(x >= 0.0 && x < 1.0);
/// ```
pub fn create_rng(seed: u64) -> SmallRng {
    use rand::SeedableRng;
    SmallRng::seed_from_u64(seed)
}

/// The process-wide seed, drawn from OS entropy the first time it is
/// requested and fixed for the rest of the process.
pub fn process_seed() -> u64 {
    *PROCESS_SEED.get_or_init(|| {
        let seed = rand::random::<u64>();
        tracing::debug!(seed, "process random seed initialised");
        seed
    })
}

/// Creates a generator for a new, independent stream derived from
/// [`process_seed`]. Each call yields a different stream.
pub fn stream_rng() -> SmallRng {
    let stream = STREAMS_ISSUED.fetch_add(1, Ordering::Relaxed);
    create_rng(process_seed() ^ stream.wrapping_mul(0x9E37_79B9_7F4A_7C15))
}

/// Uniform in-place permutation (Fisher-Yates).
///
/// Leaf ensembles of one context share the same template values; the
/// permutation is the only thing that decorrelates two independent
/// sources, so every ordering must be equally likely.
///
/// # Examples
/// ```
/// use u_uncertain::random::{create_rng, shuffle};
/// let mut v = vec![1, 2, 3, 4, 5];
/// let mut rng = create_rng(42);
/// shuffle(&mut v, &mut rng);
/// v.sort();
/// assert_eq!(v, vec![1, 2, 3, 4, 5]);
/// ```
pub fn shuffle<T, R: Rng>(slice: &mut [T], rng: &mut R) {
    let n = slice.len();
    if n <= 1 {
        return;
    }
    for i in (1..n).rev() {
        let j = rng.random_range(0..=i);
        slice.swap(i, j);
    }
}

// ============================================================================
// Tests
// ============================================================================
