//! Weak public randomness derived from a known seed.
//!
//! The seed is typically recent public chain state (a block hash). Every
//! output is `Blake2b(seed || context)`, so any observer holding the seed can
//! compute every draw before it happens.

use crate::{RandomError, RandomOutput, RandomSource};
use tribunal_crypto::blake2b_256_multi;

/// Deterministic source over a public seed.
pub struct ChainSeedRandom {
    seed: [u8; 32],
}

impl ChainSeedRandom {
    pub fn new(seed: [u8; 32]) -> Self {
        Self { seed }
    }
}

impl RandomSource for ChainSeedRandom {
    fn random_bytes(&self, context: &[u8]) -> Result<RandomOutput, RandomError> {
        Ok(RandomOutput::new(blake2b_256_multi(&[&self.seed, context])))
    }

    fn name(&self) -> &str {
        "chain-seed"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_and_context_is_reproducible() {
        let a = ChainSeedRandom::new([42u8; 32]);
        let b = ChainSeedRandom::new([42u8; 32]);
        assert_eq!(
            a.random_bytes(b"ctx").unwrap().value,
            b.random_bytes(b"ctx").unwrap().value
        );
    }

    #[test]
    fn context_changes_output() {
        let source = ChainSeedRandom::new([1u8; 32]);
        assert_ne!(
            source.random_bytes(b"slot-0").unwrap().value,
            source.random_bytes(b"slot-1").unwrap().value
        );
    }

    #[test]
    fn seed_changes_output() {
        let a = ChainSeedRandom::new([10u8; 32]);
        let b = ChainSeedRandom::new([20u8; 32]);
        assert_ne!(
            a.random_bytes(b"ctx").unwrap().value,
            b.random_bytes(b"ctx").unwrap().value
        );
    }
}
