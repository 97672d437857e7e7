//! Court parameters: fixed when the court is instantiated, immutable afterwards.

use crate::error::ParamsError;
use crate::StakeAmount;
use serde::{Deserialize, Serialize};

/// All parameters of a court instance.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourtParams {
    /// Minimum total stake a participant must hold after a deposit.
    pub min_stake: StakeAmount,

    /// Stake locked per selection slot won. A juror's locked stake in a
    /// dispute is `selection_count × min_stake_per_slot`.
    pub min_stake_per_slot: StakeAmount,

    /// Number of weighted draws per dispute. Must be odd and positive.
    pub selection_slots: u32,

    /// Length of the commit window, starting when jurors are drawn.
    pub commit_duration_secs: u64,

    /// Length of the reveal window, starting when the commit window closes.
    pub reveal_duration_secs: u64,

    /// Draw attempts allowed per slot, as a multiple of the participant count.
    pub draw_retry_factor: u32,
}

impl CourtParams {
    pub const DEFAULT_DRAW_RETRY_FACTOR: u32 = 10;

    /// Reject configurations that could only fail later at draw time.
    pub fn validate(&self) -> Result<(), ParamsError> {
        if self.selection_slots == 0 || self.selection_slots % 2 == 0 {
            return Err(ParamsError::InvalidSlotCount(self.selection_slots));
        }
        if self.min_stake_per_slot == 0 {
            return Err(ParamsError::ZeroStakePerSlot);
        }
        if self.min_stake == 0 {
            return Err(ParamsError::ZeroMinimumStake);
        }
        if self.commit_duration_secs == 0 {
            return Err(ParamsError::ZeroDuration { phase: "commit" });
        }
        if self.reveal_duration_secs == 0 {
            return Err(ParamsError::ZeroDuration { phase: "reveal" });
        }
        if self.draw_retry_factor == 0 {
            return Err(ParamsError::ZeroRetryFactor);
        }
        Ok(())
    }

    /// Maximum sampling attempts for one slot given the roster size.
    pub fn max_draw_attempts(&self, participant_count: usize) -> usize {
        (self.draw_retry_factor as usize).saturating_mul(participant_count.max(1))
    }

    /// Stake locked across all jurors of one fully drawn dispute.
    pub fn stake_per_dispute(&self) -> Option<StakeAmount> {
        self.min_stake_per_slot
            .checked_mul(self.selection_slots as StakeAmount)
    }
}

impl Default for CourtParams {
    fn default() -> Self {
        Self {
            min_stake: 100,
            min_stake_per_slot: 100,
            selection_slots: 5,
            commit_duration_secs: 24 * 3600,
            reveal_duration_secs: 24 * 3600,
            draw_retry_factor: Self::DEFAULT_DRAW_RETRY_FACTOR,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_params_are_valid() {
        assert_eq!(CourtParams::default().validate(), Ok(()));
    }

    #[test]
    fn even_and_zero_slot_counts_are_rejected() {
        for slots in [0, 2, 4, 100] {
            let params = CourtParams {
                selection_slots: slots,
                ..CourtParams::default()
            };
            assert_eq!(params.validate(), Err(ParamsError::InvalidSlotCount(slots)));
        }
    }

    #[test]
    fn zero_durations_are_rejected() {
        let params = CourtParams {
            reveal_duration_secs: 0,
            ..CourtParams::default()
        };
        assert_eq!(
            params.validate(),
            Err(ParamsError::ZeroDuration { phase: "reveal" })
        );
    }

    #[test]
    fn max_draw_attempts_scales_with_roster() {
        let params = CourtParams::default();
        assert_eq!(params.max_draw_attempts(3), 30);
        assert_eq!(params.max_draw_attempts(0), 10);
    }
}
