//! Deterministic PRNG shared by encoder and decoder.
//!
//! Both sides must pick the same fragments for a given part, so the generator
//! is fully determined by its seed: xoshiro256** whose state is the SHA-256 of
//! the seed bytes, read as four big-endian words.

use rand_xoshiro::{
    Xoshiro256StarStar,
    rand_core::{RngCore, SeedableRng},
};
use sha2::{Digest, Sha256};

/// Seeded xoshiro256** generator.
#[derive(Debug, Clone)]
pub struct FountainRng {
    inner: Xoshiro256StarStar,
}

impl FountainRng {
    /// Seed from arbitrary bytes.
    pub fn from_seed_bytes(seed: &[u8]) -> Self {
        let digest = Sha256::digest(seed);

        // `from_seed` reads little-endian words; the protocol reads big-endian.
        let mut state = [0u8; 32];
        for (word, chunk) in state.chunks_exact_mut(8).zip(digest.chunks_exact(8)) {
            word.copy_from_slice(chunk);
            word.reverse();
        }

        Self { inner: Xoshiro256StarStar::from_seed(state) }
    }

    /// Generator for the fragment choice of one part.
    pub fn for_part(seq_num: u32, checksum: u32) -> Self {
        let mut seed = [0u8; 8];
        seed[..4].copy_from_slice(&seq_num.to_be_bytes());
        seed[4..].copy_from_slice(&checksum.to_be_bytes());
        Self::from_seed_bytes(&seed)
    }

    /// Uniform in `[0, 1)`.
    pub fn next_double(&mut self) -> f64 {
        self.inner.next_u64() as f64 / (u64::MAX as f64 + 1.0)
    }

    /// Uniform in `[low, high]`.
    pub fn next_int(&mut self, low: u64, high: u64) -> u64 {
        (self.next_double() * (high - low + 1) as f64) as u64 + low
    }

    /// Uniform byte.
    pub fn next_byte(&mut self) -> u8 {
        self.next_int(0, 255) as u8
    }

    /// `len` bytes from [`next_byte`](Self::next_byte).
    pub fn next_bytes(&mut self, len: usize) -> Vec<u8> {
        (0..len).map(|_| self.next_byte()).collect()
    }

    /// Fisher-Yates style permutation by repeated removal.
    pub fn shuffled<T>(&mut self, items: Vec<T>) -> Vec<T> {
        let len = items.len();
        self.take_shuffled(items, len)
    }

    /// First `count` items of [`shuffled`](Self::shuffled).
    ///
    /// Each draw depends only on the draws before it, so stopping early
    /// yields the same prefix at a fraction of the cost.
    pub fn take_shuffled<T>(&mut self, mut items: Vec<T>, count: usize) -> Vec<T> {
        let mut out = Vec::with_capacity(count.min(items.len()));
        while out.len() < count && !items.is_empty() {
            let index = self.next_int(0, items.len() as u64 - 1) as usize;
            out.push(items.remove(index));
        }
        out
    }
}
