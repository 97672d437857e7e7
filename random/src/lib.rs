//! Randomness sources for juror selection.
//!
//! The court never decides where randomness comes from: every draw asks an
//! injected [`RandomSource`] for 32 bytes bound to a draw context. Three
//! sources ship with the crate:
//! - [`ChainSeedRandom`]: the weak public source, `Blake2b(seed || context)`
//!   over a publicly known seed such as a recent block hash
//! - [`OsRandom`]: operating-system entropy
//! - [`SeededRandom`]: a seeded PRNG for simulations and statistical tests
//!
//! Choosing the production source is a security decision outside the court.
//! Anyone who knows the seed of [`ChainSeedRandom`] can predict every draw,
//! and whoever supplies the seed can grind it to bias selection.

pub mod chain_seed;
pub mod error;
pub mod os;
pub mod seeded;

pub use chain_seed::ChainSeedRandom;
pub use error::RandomError;
pub use os::OsRandom;
pub use seeded::SeededRandom;

/// Trait for providing draw randomness.
pub trait RandomSource: Send + Sync {
    /// Get 32 random bytes for a given context (e.g. dispute id, slot and retry nonce).
    fn random_bytes(&self, context: &[u8]) -> Result<RandomOutput, RandomError>;

    /// Human-readable name of this source.
    fn name(&self) -> &str;
}

/// The output of a random source.
#[derive(Clone, Debug)]
pub struct RandomOutput {
    /// The random bytes.
    pub value: [u8; 32],
    /// Sequence number of the output, for sources that keep one.
    pub round: u64,
}

impl RandomOutput {
    pub fn new(value: [u8; 32]) -> Self {
        Self { value, round: 0 }
    }

    /// Reduce the output to an integer in `[0, bound)`.
    ///
    /// Uses the first 16 bytes as a big-endian `u128`; the modulo bias is at
    /// most `bound / 2^128`. Returns `None` for an empty range.
    pub fn uniform_below(&self, bound: u128) -> Option<u128> {
        if bound == 0 {
            return None;
        }
        let mut head = [0u8; 16];
        head.copy_from_slice(&self.value[..16]);
        Some(u128::from_be_bytes(head) % bound)
    }
}
