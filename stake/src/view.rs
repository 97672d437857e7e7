//! Read-only view of available stake, as seen by the sampler.

use tribunal_types::{Address, StakeAmount};

/// Indexed access to participants and their available stake.
///
/// Implemented by the ledger itself and by [`crate::LockBatch`], which layers
/// the locks of an in-progress draw on top of the ledger.
pub trait StakeView {
    fn participant_count(&self) -> usize;

    fn participant(&self, index: usize) -> Option<&Address>;

    /// Available stake of the participant at `index` (zero if out of range).
    fn available_at(&self, index: usize) -> StakeAmount;

    /// Sum of available stake over the whole roster, recomputed on every call.
    fn available_stake_sum(&self) -> StakeAmount {
        (0..self.participant_count())
            .map(|i| self.available_at(i))
            .fold(0, StakeAmount::saturating_add)
    }
}
