//! Operating-system entropy.

use crate::{RandomError, RandomOutput, RandomSource};
use rand::rngs::OsRng;
use rand::RngCore;

/// Unpredictable randomness from the OS. Draws are not reproducible.
#[derive(Default)]
pub struct OsRandom;

impl RandomSource for OsRandom {
    fn random_bytes(&self, _context: &[u8]) -> Result<RandomOutput, RandomError> {
        let mut value = [0u8; 32];
        OsRng
            .try_fill_bytes(&mut value)
            .map_err(|e| RandomError::Unavailable(e.to_string()))?;
        Ok(RandomOutput::new(value))
    }

    fn name(&self) -> &str {
        "os"
    }
}
