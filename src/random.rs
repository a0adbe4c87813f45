//! Seeded xorshift generator
//!
//! Every procedural system draws from a `Random`. The generator is a plain
//! `Copy` value: deriving sub-seeds (`next_seed`, `add_seed`) returns a new
//! generator, while `generate_and_mutate` advances in place for sequential
//! draws. Both paths go through the same `next_seed` step so identical seeds
//! always produce identical sequences.

use rand::RngCore;
use serde::{Deserialize, Serialize};

/// Replacement for the xorshift fixed point at zero
const ZERO_SEED_REPLACEMENT: u32 = 0x9E37_79B9;

/// Advance a xorshift32 state by one step
#[inline]
pub fn next_seed(seed: u32) -> u32 {
    let mut x = if seed == 0 { ZERO_SEED_REPLACEMENT } else { seed };
    x ^= x << 13;
    x ^= x >> 17;
    x ^= x << 5;
    x
}

/// Deterministic pseudo-random generator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Random {
    state: u32,
}

impl Random {
    pub fn new(seed: u32) -> Self {
        // Scramble once so small consecutive seeds don't start correlated
        Self {
            state: next_seed(next_seed(seed)),
        }
    }

    /// Reseed, discarding the current state
    pub fn seed(self, value: u32) -> Self {
        Self::new(value)
    }

    /// Raw internal state
    pub fn state(&self) -> u32 {
        self.state
    }

    /// Generator one step further along the sequence
    pub fn next_seed(self) -> Self {
        Self {
            state: next_seed(self.state),
        }
    }

    /// Derive an independent generator by mixing in a salt
    ///
    /// Used to give every cell, edge and purpose its own stream so generation
    /// never depends on the order other streams were consumed.
    pub fn add_seed(self, salt: u32) -> Self {
        let mixed = next_seed(salt.wrapping_mul(0x85EB_CA6B) ^ 0xC2B2_AE35);
        Self {
            state: next_seed(self.state ^ mixed),
        }
    }

    /// Combine with several salts in order
    pub fn add_seeds(self, salts: &[u32]) -> Self {
        salts.iter().fold(self, |random, &salt| random.add_seed(salt))
    }

    /// Value in [0, 1) for the current state, without advancing
    pub fn generate(&self) -> f64 {
        f64::from(self.state) / 4_294_967_296.0
    }

    /// Advance the state and return a value in [0, 1)
    pub fn generate_and_mutate(&mut self) -> f64 {
        self.state = next_seed(self.state);
        self.generate()
    }

    /// Integer in [a, b] (inclusive)
    pub fn range(&mut self, a: i32, b: i32) -> i32 {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        let span = f64::from(hi) - f64::from(lo) + 1.0;
        let offset = (self.generate_and_mutate() * span).floor();
        (f64::from(lo) + offset).min(f64::from(hi)) as i32
    }

    /// Float in [a, b)
    pub fn float_range(&mut self, a: f32, b: f32) -> f32 {
        a + (b - a) * self.generate_and_mutate() as f32
    }

    /// True with probability `p`
    pub fn chance(&mut self, p: f32) -> bool {
        self.generate_and_mutate() < f64::from(p)
    }

    /// Uniformly chosen element, `None` for an empty slice
    pub fn element<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        if items.is_empty() {
            return None;
        }
        let index = self.range(0, items.len() as i32 - 1) as usize;
        items.get(index)
    }

    /// Element chosen with probability proportional to its weight
    ///
    /// Non-positive weights never win; `None` when nothing has weight.
    pub fn weighted_element<'a, T>(&mut self, items: &'a [(T, f32)]) -> Option<&'a T> {
        let total: f64 = items.iter().map(|(_, w)| f64::from(w.max(0.0))).sum();
        if total <= 0.0 {
            return None;
        }
        let mut roll = self.generate_and_mutate() * total;
        let mut last = None;
        for (item, weight) in items.iter().filter(|(_, w)| *w > 0.0) {
            roll -= f64::from(*weight);
            if roll < 0.0 {
                return Some(item);
            }
            last = Some(item);
        }
        // Rounding can leave a sliver past the final weight
        last
    }

    /// Fisher-Yates shuffle in place
    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        for i in (1..items.len()).rev() {
            let j = self.range(0, i as i32) as usize;
            items.swap(i, j);
        }
    }
}

impl RngCore for Random {
    fn next_u32(&mut self) -> u32 {
        self.state = next_seed(self.state);
        self.state
    }

    fn next_u64(&mut self) -> u64 {
        let hi = u64::from(self.next_u32());
        let lo = u64::from(self.next_u32());
        (hi << 32) | lo
    }

    fn fill_bytes(&mut self, dst: &mut [u8]) {
        for chunk in dst.chunks_mut(4) {
            let bytes = self.next_u32().to_le_bytes();
            chunk.copy_from_slice(&bytes[..chunk.len()]);
        }
    }
}
