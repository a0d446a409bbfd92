//! Utility functions for the sparsepool crate.
//!
//! Seeded sampling helpers. Every random draw in the crate goes through an
//! explicitly passed RNG so that a seed fully determines the outcome.

use rand::Rng;

/// Shuffle a slice in-place using Fisher-Yates.
///
/// # Examples
///
/// ```
/// use sparsepool::utils::shuffle_indices;
/// use rand::SeedableRng;
///
/// let mut indices = vec![0, 1, 2, 3, 4];
/// let mut rng = rand::rngs::StdRng::seed_from_u64(0);
/// shuffle_indices(&mut indices, &mut rng);
/// // indices is now shuffled
/// ```
pub fn shuffle_indices<T, R: Rng>(arr: &mut [T], rng: &mut R) {
    for i in (1..arr.len()).rev() {
        let j = rng.gen_range(0..=i);
        arr.swap(i, j);
    }
}

/// Draw `n` distinct elements from `pool` without replacement.
///
/// Runs a partial Fisher-Yates over the front of `pool` (which is reordered
/// in place) and returns the selected elements sorted ascending. When
/// `n >= pool.len()` the whole pool is returned.
///
/// # Examples
///
/// ```
/// use sparsepool::utils::sample_sorted;
/// use rand::SeedableRng;
///
/// let mut pool: Vec<u32> = (0..100).collect();
/// let mut rng = rand::rngs::StdRng::seed_from_u64(7);
/// let picked = sample_sorted(&mut pool, 10, &mut rng);
/// assert_eq!(picked.len(), 10);
/// assert!(picked.windows(2).all(|w| w[0] < w[1]));
/// ```
pub fn sample_sorted<T: Copy + Ord, R: Rng>(pool: &mut [T], n: usize, rng: &mut R) -> Vec<T> {
    let n = n.min(pool.len());
    for i in 0..n {
        let j = rng.gen_range(i..pool.len());
        pool.swap(i, j);
    }
    let mut picked = pool[..n].to_vec();
    picked.sort_unstable();
    picked
}
