//! Stake-weighted juror sampling.

use crate::error::CourtError;
use tracing::debug;
use tribunal_random::RandomSource;
use tribunal_stake::{LockBatch, StakeView};
use tribunal_types::{CourtParams, DisputeId, StakeAmount};

/// Picks participants with probability proportional to their available stake.
pub struct WeightedSampler {
    params: CourtParams,
}

impl WeightedSampler {
    pub fn new(params: &CourtParams) -> Self {
        Self {
            params: params.clone(),
        }
    }

    /// Draw one participant index from `view`.
    ///
    /// Algorithm: `r` is uniform in `[0, Σ available)`; walk the roster
    /// accumulating available stake and return the first index whose running
    /// sum exceeds `r`. The sum is read from `view` here, on every call, so
    /// locks taken by earlier draws of the same batch are always accounted for.
    ///
    /// If the walk finds nothing, the first participant able to take a slot
    /// is returned instead.
    pub fn sample(
        &self,
        view: &dyn StakeView,
        source: &dyn RandomSource,
        context: &[u8],
    ) -> Result<usize, CourtError> {
        let total = view.available_stake_sum();
        if let Some(r) = source.random_bytes(context)?.uniform_below(total) {
            let mut cumulative: StakeAmount = 0;
            for index in 0..view.participant_count() {
                cumulative = cumulative.saturating_add(view.available_at(index));
                if cumulative > r {
                    return Ok(index);
                }
            }
        }
        (0..view.participant_count())
            .find(|&i| view.available_at(i) >= self.params.min_stake_per_slot)
            .ok_or(CourtError::NoEligibleParticipant)
    }

    /// Fill one selection slot: sample, and lock one slot's stake against the
    /// winner inside `batch`.
    ///
    /// A candidate whose remaining stake cannot cover a slot is discarded and
    /// the slot is resampled with the next retry nonce. At most
    /// `draw_retry_factor × participant_count` attempts are made.
    pub fn draw_slot(
        &self,
        batch: &mut LockBatch<'_>,
        source: &dyn RandomSource,
        dispute: DisputeId,
        slot: u32,
    ) -> Result<usize, CourtError> {
        let per_slot = self.params.min_stake_per_slot;
        let attempts = self.params.max_draw_attempts(batch.participant_count());

        for nonce in 0..attempts {
            let available = batch.available_stake_sum();
            if available < per_slot {
                return Err(CourtError::InsufficientPoolStake {
                    available,
                    needed: per_slot,
                });
            }

            let context = draw_context(dispute, slot, nonce as u64);
            let candidate = self.sample(&*batch, source, &context)?;
            if batch.available_at(candidate) >= per_slot {
                batch.lock(candidate, per_slot)?;
                return Ok(candidate);
            }
            debug!(
                dispute = dispute.get(),
                slot,
                nonce,
                candidate,
                "candidate cannot cover a slot, resampling"
            );
        }

        Err(CourtError::DrawExhausted {
            dispute,
            slot,
            attempts,
        })
    }
}

/// Randomness context of one draw attempt: `dispute || slot || nonce`, big-endian.
pub fn draw_context(dispute: DisputeId, slot: u32, nonce: u64) -> [u8; 20] {
    let mut context = [0u8; 20];
    context[..8].copy_from_slice(&dispute.to_be_bytes());
    context[8..12].copy_from_slice(&slot.to_be_bytes());
    context[12..].copy_from_slice(&nonce.to_be_bytes());
    context
}

#[cfg(test)]
mod tests {
    use super::*;
    use tribunal_random::{RandomError, RandomOutput, SeededRandom};
    use tribunal_stake::StakeLedger;
    use tribunal_types::Address;

    /// Returns `r` as the big-endian head of every output.
    struct FixedDraw(u128);

    impl RandomSource for FixedDraw {
        fn random_bytes(&self, _context: &[u8]) -> Result<RandomOutput, RandomError> {
            let mut value = [0u8; 32];
            value[..16].copy_from_slice(&self.0.to_be_bytes());
            Ok(RandomOutput::new(value))
        }
        fn name(&self) -> &str {
            "fixed-draw"
        }
    }

    /// Returns queued values in order, then fails.
    struct Sequence(std::sync::Mutex<Vec<u128>>);

    impl RandomSource for Sequence {
        fn random_bytes(&self, _context: &[u8]) -> Result<RandomOutput, RandomError> {
            let mut queue = self.0.lock().unwrap();
            if queue.is_empty() {
                return Err(RandomError::Exhausted);
            }
            let r = queue.remove(0);
            let mut value = [0u8; 32];
            value[..16].copy_from_slice(&r.to_be_bytes());
            Ok(RandomOutput::new(value))
        }
        fn name(&self) -> &str {
            "sequence"
        }
    }

    fn params(per_slot: StakeAmount) -> CourtParams {
        CourtParams {
            min_stake: 1,
            min_stake_per_slot: per_slot,
            ..CourtParams::default()
        }
    }

    fn ledger(stakes: &[StakeAmount]) -> StakeLedger {
        let mut ledger = StakeLedger::new();
        for (i, stake) in stakes.iter().enumerate() {
            let address = Address::new(format!("p{i}"));
            // A fully withdrawn participant stays on the roster with zero stake.
            ledger.deposit(&address, stake + 1, 0).unwrap();
            ledger.withdraw(&address, 1).unwrap();
        }
        ledger
    }

    #[test]
    fn walk_returns_first_index_exceeding_r() {
        let ledger = ledger(&[500, 300, 200]);
        let sampler = WeightedSampler::new(&params(100));
        for (r, expected) in [(0, 0), (499, 0), (500, 1), (799, 1), (800, 2), (999, 2)] {
            let picked = sampler.sample(&ledger, &FixedDraw(r), b"").unwrap();
            assert_eq!(picked, expected, "r = {r}");
        }
    }

    #[test]
    fn zero_stake_participants_are_never_walked_into() {
        let ledger = ledger(&[0, 100, 0]);
        let sampler = WeightedSampler::new(&params(100));
        for r in [0, 50, 99] {
            assert_eq!(sampler.sample(&ledger, &FixedDraw(r), b"").unwrap(), 1);
        }
    }

    #[test]
    fn empty_pool_has_no_eligible_participant() {
        let ledger = ledger(&[]);
        let sampler = WeightedSampler::new(&params(100));
        assert!(matches!(
            sampler.sample(&ledger, &FixedDraw(0), b""),
            Err(CourtError::NoEligibleParticipant)
        ));
    }

    #[test]
    fn draw_slot_locks_winner_in_batch_only() {
        let ledger = ledger(&[500, 300, 200]);
        let sampler = WeightedSampler::new(&params(100));
        let mut batch = LockBatch::new(&ledger);
        let winner = sampler
            .draw_slot(&mut batch, &FixedDraw(0), DisputeId::FIRST, 0)
            .unwrap();
        assert_eq!(winner, 0);
        assert_eq!(batch.available_at(0), 400);
        assert_eq!(ledger.available_at(0), 500);
    }

    #[test]
    fn draw_slot_resamples_candidates_that_cannot_cover_a_slot() {
        // p0 has 50 (< slot), p1 has 200. First r lands on p0, second on p1.
        let ledger = ledger(&[50, 200]);
        let sampler = WeightedSampler::new(&params(100));
        let source = Sequence(std::sync::Mutex::new(vec![10, 100]));
        let mut batch = LockBatch::new(&ledger);
        let winner = sampler
            .draw_slot(&mut batch, &source, DisputeId::FIRST, 0)
            .unwrap();
        assert_eq!(winner, 1);
    }

    #[test]
    fn draw_slot_gives_up_after_bounded_attempts() {
        // Pool holds 150 in total but no single participant can cover 100.
        let ledger = ledger(&[50, 50, 50]);
        let sampler = WeightedSampler::new(&params(100));
        let mut batch = LockBatch::new(&ledger);
        let err = sampler
            .draw_slot(&mut batch, &FixedDraw(0), DisputeId::FIRST, 0)
            .unwrap_err();
        assert!(matches!(
            err,
            CourtError::DrawExhausted { attempts: 30, .. }
        ));
    }

    #[test]
    fn draw_slot_rejects_depleted_pool() {
        let ledger = ledger(&[100]);
        let sampler = WeightedSampler::new(&params(100));
        let mut batch = LockBatch::new(&ledger);
        sampler
            .draw_slot(&mut batch, &FixedDraw(0), DisputeId::FIRST, 0)
            .unwrap();
        assert!(matches!(
            sampler.draw_slot(&mut batch, &FixedDraw(0), DisputeId::FIRST, 1),
            Err(CourtError::InsufficientPoolStake {
                available: 0,
                needed: 100
            })
        ));
    }

    #[test]
    fn successive_draws_track_the_shrinking_pool() {
        // The second draw sees 900 available, so its top value lands on the
        // last participant instead of falling through the walk.
        let ledger = ledger(&[500, 300, 200]);
        let sampler = WeightedSampler::new(&params(100));
        let source = Sequence(std::sync::Mutex::new(vec![0, 899]));
        let mut batch = LockBatch::new(&ledger);
        assert_eq!(
            sampler
                .draw_slot(&mut batch, &source, DisputeId::FIRST, 0)
                .unwrap(),
            0
        );
        assert_eq!(batch.available_stake_sum(), 900);
        assert_eq!(
            sampler
                .draw_slot(&mut batch, &source, DisputeId::FIRST, 1)
                .unwrap(),
            2
        );
    }

    #[test]
    fn selection_frequency_follows_stake_ratio() {
        let ledger = ledger(&[500, 300, 200]);
        let sampler = WeightedSampler::new(&params(100));
        let source = SeededRandom::new(0x5eed);
        let draws = 20_000;
        let mut counts = [0u32; 3];
        for _ in 0..draws {
            counts[sampler.sample(&ledger, &source, b"").unwrap()] += 1;
        }
        let expected = [0.5, 0.3, 0.2];
        for (count, share) in counts.iter().zip(expected) {
            let observed = *count as f64 / draws as f64;
            assert!(
                (observed - share).abs() < 0.02,
                "observed {observed}, expected {share}"
            );
        }
    }

    #[test]
    fn draw_context_layout() {
        let ctx = draw_context(DisputeId::new(1), 2, 3);
        assert_eq!(&ctx[..8], &1u64.to_be_bytes());
        assert_eq!(&ctx[8..12], &2u32.to_be_bytes());
        assert_eq!(&ctx[12..], &3u64.to_be_bytes());
    }
}
