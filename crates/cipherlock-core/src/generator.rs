//! Sequence Generator
//!
//! The classic ANSI C `rand()` linear congruential generator, with the state
//! owned by the instance instead of living in a process-wide static:
//!
//! ```text
//! state = state * 1103515245 + 12345   (mod 2^32)
//! draw  = (state / 65536) mod 32768
//! ```
//!
//! Only the low 31 bits of the state ever reach a draw, and bits 16..23 of a
//! draw depend only on the low 24 bits of the seed.

use serde::{Deserialize, Serialize};
use std::fmt;

const MULTIPLIER: u32 = 1_103_515_245;
const INCREMENT: u32 = 12_345;

/// Largest value `next()` can return (`RAND_MAX`).
pub const DRAW_MAX: u16 = 32_767;

/// Initial generator state for one trial
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Seed(pub u32);

impl Seed {
    pub fn value(self) -> u32 {
        self.0
    }

    /// Start a fresh generator from this seed
    pub fn generator(self) -> SequenceGenerator {
        SequenceGenerator::new(self.0)
    }
}

impl From<u32> for Seed {
    fn from(value: u32) -> Self {
        Seed(value)
    }
}

impl fmt::Display for Seed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:08x}", self.0)
    }
}

/// Deterministic 32-bit LCG. Not restartable in place; build a new one.
#[derive(Debug, Clone)]
pub struct SequenceGenerator {
    state: u32,
}

impl SequenceGenerator {
    pub fn new(seed: u32) -> Self {
        Self { state: seed }
    }

    /// Advance the state and return the next draw in `0..=DRAW_MAX`
    #[inline]
    pub fn next(&mut self) -> u16 {
        self.state = self.state.wrapping_mul(MULTIPLIER).wrapping_add(INCREMENT);
        ((self.state >> 16) % 32_768) as u16
    }

    /// Next draw truncated to its low byte, as the fingerprint compares it
    #[inline]
    pub fn next_low_byte(&mut self) -> u8 {
        (self.next() & 0xFF) as u8
    }

    /// Advance `n` draws, discarding them
    pub fn advance(&mut self, n: u32) {
        for _ in 0..n {
            self.next();
        }
    }

    /// Low bytes of the next `n` draws
    pub fn low_bytes(&mut self, n: usize) -> Vec<u8> {
        (0..n).map(|_| self.next_low_byte()).collect()
    }
}

impl Iterator for SequenceGenerator {
    type Item = u16;

    fn next(&mut self) -> Option<Self::Item> {
        Some(SequenceGenerator::next(self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_seed_prefix() {
        let mut gen = SequenceGenerator::new(0x8000_203d);
        assert_eq!(gen.low_bytes(4), vec![0x0e, 0xe8, 0x90, 0xd3]);
    }

    #[test]
    fn test_reference_seed_tail() {
        let mut gen = SequenceGenerator::new(0x8000_203d);
        gen.advance(195);
        assert_eq!(gen.next_low_byte(), 0x96);
        assert_eq!(gen.next_low_byte(), 0xe5);
    }

    #[test]
    fn test_advance_discards_draws() {
        let all = SequenceGenerator::new(42).low_bytes(64);
        let mut gen = SequenceGenerator::new(42);
        gen.advance(40);
        assert_eq!(gen.next_low_byte(), all[40]);
        gen.advance(0);
        assert_eq!(gen.next_low_byte(), all[41]);
    }

    #[test]
    fn test_seed_one_matches_libc_rand() {
        // Portable ANSI C rand() after srand(1)
        let mut gen = SequenceGenerator::new(1);
        assert_eq!(gen.next(), 16838);
        assert_eq!(gen.next(), 5758);
        assert_eq!(gen.next(), 10113);
    }

    #[test]
    fn test_determinism_across_instances() {
        for seed in [0u32, 1, 0x8000_203d, u32::MAX, 0xdead_beef] {
            let a: Vec<u16> = SequenceGenerator::new(seed).take(300).collect();
            let b: Vec<u16> = SequenceGenerator::new(seed).take(300).collect();
            assert_eq!(a, b);
        }
    }

    #[test]
    fn test_draws_stay_in_range() {
        let mut gen = SequenceGenerator::new(0xffff_ffff);
        for _ in 0..10_000 {
            assert!(gen.next() <= DRAW_MAX);
        }
    }

    #[test]
    fn test_top_seed_byte_does_not_affect_low_bytes() {
        let a = SequenceGenerator::new(0x0000_203d).low_bytes(197);
        let b = SequenceGenerator::new(0xff00_203d).low_bytes(197);
        assert_eq!(a, b);
    }

    #[test]
    fn test_seed_display() {
        assert_eq!(Seed(0x8000_203d).to_string(), "0x8000203d");
        assert_eq!(Seed(0x2a).to_string(), "0x0000002a");
    }
}
