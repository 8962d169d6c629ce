//! Deterministic utilities for reproducible training
//!
//! Provides an LCG-based RNG and a seed mixer so that a fixed seed yields
//! identical bootstrap samples, feature subsets and splits on every run,
//! independent of thread scheduling.

use std::num::Wrapping;

/// 64-bit Linear Congruential Generator
/// Uses Knuth's MMIX constants; output is taken from the high bits.
#[derive(Clone, Debug)]
pub struct LcgRng {
    state: Wrapping<u64>,
}

impl LcgRng {
    const MULTIPLIER: u64 = 6364136223846793005;
    const INCREMENT: u64 = 1442695040888963407;

    pub fn new(seed: u64) -> Self {
        let mut rng = Self {
            state: Wrapping(seed),
        };
        // Discard the first output so small seeds diverge quickly
        rng.next_u32();
        rng
    }

    /// Generate next random value in range [0, 2^32)
    pub fn next_u32(&mut self) -> u32 {
        self.state = self.state * Wrapping(Self::MULTIPLIER) + Wrapping(Self::INCREMENT);
        (self.state.0 >> 32) as u32
    }

    /// Generate random value in range [0, max)
    pub fn next_range(&mut self, max: usize) -> usize {
        if max == 0 {
            return 0;
        }
        ((self.next_u32() as u64 * max as u64) >> 32) as usize
    }

    /// Fisher-Yates shuffle
    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        for i in (1..items.len()).rev() {
            let j = self.next_range(i + 1);
            items.swap(i, j);
        }
    }
}

/// Derive an independent seed for stream `idx` (one per tree)
/// xxhash64-style avalanche over (seed, idx)
pub fn derive_seed(seed: u64, idx: u64) -> u64 {
    const PRIME1: u64 = 0x9E3779B185EBCA87;
    const PRIME2: u64 = 0xC2B2AE3D27D4EB4F;
    const PRIME3: u64 = 0x165667B19E3779F9;
    const PRIME5: u64 = 0x85EBCA77C2B2AE63;

    let mut h = seed.wrapping_add(PRIME5);
    h = h.wrapping_add(idx.wrapping_mul(PRIME3));
    h = h.rotate_left(17).wrapping_mul(PRIME2);

    h ^= h >> 33;
    h = h.wrapping_mul(PRIME1);
    h ^= h >> 29;
    h = h.wrapping_mul(PRIME2);
    h ^= h >> 32;

    h
}
