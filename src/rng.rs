//! Seedable random source for field generation and sensor breaking.
//!
//! Uses `SmallRng` (xoshiro256++), which also runs under WASM. Entropy comes
//! from `getrandom` (browser crypto API on wasm32, the OS elsewhere).

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

pub struct FieldRng {
    inner: SmallRng,
}

impl FieldRng {
    /// Create from system entropy.
    pub fn new() -> Self {
        Self {
            inner: SmallRng::from_os_rng(),
        }
    }

    /// Create with a specific seed for deterministic replay.
    pub fn from_seed(seed: u64) -> Self {
        Self {
            inner: SmallRng::seed_from_u64(seed),
        }
    }

    /// Random usize in [0, max). `max` must be non-zero.
    #[inline(always)]
    pub fn gen_range(&mut self, max: usize) -> usize {
        self.inner.random_range(0..max)
    }

    /// Random usize in [0, max] inclusive.
    #[inline(always)]
    pub fn gen_inclusive(&mut self, max: usize) -> usize {
        self.inner.random_range(0..=max)
    }

    /// `true` with probability `p`, clamped to [0, 1].
    #[inline(always)]
    pub fn gen_bool(&mut self, p: f64) -> bool {
        self.inner.random_bool(p.clamp(0.0, 1.0))
    }

    /// Pick-and-remove a uniformly random element of `pool`.
    ///
    /// Order of the remaining elements is not preserved.
    pub fn take_from<T>(&mut self, pool: &mut Vec<T>) -> Option<T> {
        if pool.is_empty() {
            return None;
        }
        let i = self.gen_range(pool.len());
        Some(pool.swap_remove(i))
    }

    /// Uniformly random element of `items`.
    pub fn choose<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        if items.is_empty() {
            return None;
        }
        Some(&items[self.gen_range(items.len())])
    }
}

impl Default for FieldRng {
    fn default() -> Self {
        Self::new()
    }
}
