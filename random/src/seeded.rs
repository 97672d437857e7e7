//! Seeded PRNG source for simulations.

use crate::{RandomError, RandomOutput, RandomSource};
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use std::sync::Mutex;

/// A reproducible stream of outputs from `StdRng`.
///
/// The context is ignored: successive calls advance the stream, so the same
/// seed replays the same sequence of draws.
pub struct SeededRandom {
    rng: Mutex<StdRng>,
    round: Mutex<u64>,
}

impl SeededRandom {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
            round: Mutex::new(0),
        }
    }
}

impl RandomSource for SeededRandom {
    fn random_bytes(&self, _context: &[u8]) -> Result<RandomOutput, RandomError> {
        let mut rng = self
            .rng
            .lock()
            .map_err(|e| RandomError::Unavailable(e.to_string()))?;
        let mut round = self
            .round
            .lock()
            .map_err(|e| RandomError::Unavailable(e.to_string()))?;
        let mut value = [0u8; 32];
        rng.fill_bytes(&mut value);
        let output = RandomOutput {
            value,
            round: *round,
        };
        *round += 1;
        Ok(output)
    }

    fn name(&self) -> &str {
        "seeded"
    }
}
