//! Injectable randomness used by level generation and enemy movement.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Source of uniformly distributed choices.
///
/// Systems never reach for a global generator; they borrow a source from
/// their caller so tests can script exact sequences.
pub trait RandomSource {
    /// Returns an index in `0..bound`. A `bound` of zero or one yields zero.
    fn next_below(&mut self, bound: usize) -> usize;

    /// Returns `true` with the provided probability.
    fn chance(&mut self, probability: f64) -> bool;
}

impl<R> RandomSource for &mut R
where
    R: RandomSource + ?Sized,
{
    fn next_below(&mut self, bound: usize) -> usize {
        (**self).next_below(bound)
    }

    fn chance(&mut self, probability: f64) -> bool {
        (**self).chance(probability)
    }
}

/// Shuffles the slice in place with a Fisher-Yates pass driven by `rng`.
pub fn shuffle<T, R>(items: &mut [T], rng: &mut R)
where
    R: RandomSource + ?Sized,
{
    for index in (1..items.len()).rev() {
        let swap_index = rng.next_below(index + 1);
        items.swap(index, swap_index);
    }
}

/// Deterministic source backed by ChaCha8 and seeded from a single integer.
#[derive(Clone, Debug)]
pub struct SeededRandom {
    rng: ChaCha8Rng,
}

impl SeededRandom {
    /// Creates a source whose sequence is fully determined by `seed`.
    #[must_use]
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }
}

impl RandomSource for SeededRandom {
    fn next_below(&mut self, bound: usize) -> usize {
        if bound <= 1 {
            return 0;
        }
        self.rng.gen_range(0..bound)
    }

    fn chance(&mut self, probability: f64) -> bool {
        if probability <= 0.0 {
            false
        } else if probability >= 1.0 {
            true
        } else {
            self.rng.gen_bool(probability)
        }
    }
}
