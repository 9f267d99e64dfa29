//! Injectable randomness
//!
//! Terrain generation and enemy steering draw from a `RandomSource` so tests
//! can replace the seeded generator with a scripted sequence.

use std::collections::VecDeque;

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

/// Source of the few random decisions the simulation makes
pub trait RandomSource {
    /// Uniform value in [0, 1)
    fn next_unit(&mut self) -> f32;

    /// Uniform index in [0, len). `len` must be non-zero.
    fn next_index(&mut self, len: usize) -> usize;

    /// Bernoulli trial with probability `p`
    fn chance(&mut self, p: f32) -> bool {
        self.next_unit() < p
    }

    /// Uniform pick from a non-empty slice
    fn pick<T: Copy>(&mut self, items: &[T]) -> T
    where
        Self: Sized,
    {
        items[self.next_index(items.len())]
    }
}

/// Seeded PCG generator used by real sessions
#[derive(Debug, Clone)]
pub struct SimRng {
    rng: Pcg32,
}

impl SimRng {
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed),
        }
    }
}

impl RandomSource for SimRng {
    fn next_unit(&mut self) -> f32 {
        self.rng.random::<f32>()
    }

    fn next_index(&mut self, len: usize) -> usize {
        self.rng.random_range(0..len)
    }
}

/// Replays pre-recorded values.
///
/// Once a queue runs dry, units fall back to a value that fails every
/// `chance` roll and indices fall back to 0.
#[derive(Debug, Clone, Default)]
pub struct ScriptedSource {
    units: VecDeque<f32>,
    indices: VecDeque<usize>,
}

impl ScriptedSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_units(mut self, units: impl IntoIterator<Item = f32>) -> Self {
        self.units.extend(units);
        self
    }

    pub fn with_indices(mut self, indices: impl IntoIterator<Item = usize>) -> Self {
        self.indices.extend(indices);
        self
    }
}

impl RandomSource for ScriptedSource {
    fn next_unit(&mut self) -> f32 {
        self.units.pop_front().unwrap_or(1.0 - f32::EPSILON)
    }

    fn next_index(&mut self, len: usize) -> usize {
        self.indices.pop_front().unwrap_or(0) % len
    }
}
