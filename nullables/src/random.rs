//! Nullable random: scripted draws for testing.

use std::collections::VecDeque;
use std::sync::Mutex;
use tribunal_random::{RandomError, RandomOutput, RandomSource};

/// A deterministic random source for testing.
///
/// Returns pre-configured outputs in order and fails with
/// [`RandomError::Exhausted`] once they run out. Every context it was asked
/// for is recorded.
pub struct NullRandom {
    outputs: Mutex<VecDeque<[u8; 32]>>,
    contexts: Mutex<Vec<Vec<u8>>>,
    round: Mutex<u64>,
}

impl NullRandom {
    /// A source with nothing queued.
    pub fn new() -> Self {
        Self::with_outputs(Vec::new())
    }

    /// Queue raw 32-byte outputs.
    pub fn with_outputs(outputs: Vec<[u8; 32]>) -> Self {
        Self {
            outputs: Mutex::new(outputs.into()),
            contexts: Mutex::new(Vec::new()),
            round: Mutex::new(0),
        }
    }

    /// Queue sampler draws: each value becomes the big-endian head of one
    /// output, so a draw over a pool of `total` stake lands on `r % total`.
    pub fn with_draws(draws: impl IntoIterator<Item = u128>) -> Self {
        Self::with_outputs(draws.into_iter().map(draw_output).collect())
    }

    /// Queue one more draw.
    pub fn push_draw(&self, r: u128) {
        if let Ok(mut outputs) = self.outputs.lock() {
            outputs.push_back(draw_output(r));
        }
    }

    /// Outputs not yet consumed.
    pub fn remaining(&self) -> usize {
        self.outputs.lock().map_or(0, |o| o.len())
    }

    /// Every context requested so far, in order.
    pub fn contexts(&self) -> Vec<Vec<u8>> {
        self.contexts.lock().map_or_else(|_| Vec::new(), |c| c.clone())
    }
}

impl Default for NullRandom {
    fn default() -> Self {
        Self::new()
    }
}

fn draw_output(r: u128) -> [u8; 32] {
    let mut value = [0u8; 32];
    value[..16].copy_from_slice(&r.to_be_bytes());
    value
}

fn poisoned<T>(_: T) -> RandomError {
    RandomError::Other("null random lock poisoned".into())
}

impl RandomSource for NullRandom {
    fn random_bytes(&self, context: &[u8]) -> Result<RandomOutput, RandomError> {
        self.contexts.lock().map_err(poisoned)?.push(context.to_vec());
        let value = self
            .outputs
            .lock()
            .map_err(poisoned)?
            .pop_front()
            .ok_or(RandomError::Exhausted)?;
        let mut round = self.round.lock().map_err(poisoned)?;
        let output = RandomOutput {
            value,
            round: *round,
        };
        *round += 1;
        Ok(output)
    }

    fn name(&self) -> &str {
        "null-random"
    }
}
