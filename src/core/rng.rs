//! Seeded randomness for dealing and AI seats.
//!
//! Every draw in a game comes from a `GameRng` built from the configured
//! seed. Each consumer forks its own stream by name (`"role-deck"`,
//! `"ai-seat-3"`), so extra draws in one place never change another.
//!
//! Fork seeds are derived with `FxHasher` over the raw seed and name
//! bytes, not with the standard library hasher, so a seed deals the same
//! table on every toolchain.
//!
//! ```
//! use rust_werewolf::core::GameRng;
//!
//! let mut deck = GameRng::new(42).for_context("role-deck");
//! let mut again = GameRng::new(42).for_context("role-deck");
//! assert_eq!(deck.gen_range_usize(0..100), again.gen_range_usize(0..100));
//! ```

use std::hash::Hasher;

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rustc_hash::FxHasher;

#[derive(Clone, Debug)]
pub struct GameRng {
    seed: u64,
    stream: ChaCha8Rng,
}

impl GameRng {
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            stream: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// The seed this stream started from.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// A fresh stream named `context`, independent of draws already taken
    /// from `self`.
    #[must_use]
    pub fn for_context(&self, context: &str) -> Self {
        let mut hasher = FxHasher::default();
        hasher.write(&self.seed.to_le_bytes());
        hasher.write(context.as_bytes());
        Self::new(hasher.finish())
    }

    pub fn gen_range_usize(&mut self, range: std::ops::Range<usize>) -> usize {
        self.stream.gen_range(range)
    }

    /// `true` with probability `p`, clamped to `0.0..=1.0`.
    pub fn gen_bool(&mut self, p: f64) -> bool {
        self.stream.gen_bool(p.clamp(0.0, 1.0))
    }

    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        items.shuffle(&mut self.stream);
    }

    #[must_use]
    pub fn choose<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        items.choose(&mut self.stream)
    }
}
