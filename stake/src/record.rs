//! Per-participant stake record.

use serde::{Deserialize, Serialize};
use tribunal_types::StakeAmount;

/// Collateral held by one participant.
///
/// Invariant: `locked <= total`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StakeRecord {
    /// Total collateral deposited, plus rewards, minus withdrawals and slashes.
    pub total: StakeAmount,
    /// Collateral reserved across all active disputes.
    pub locked: StakeAmount,
}

impl StakeRecord {
    pub fn available(&self) -> StakeAmount {
        self.total.saturating_sub(self.locked)
    }

    pub fn is_consistent(&self) -> bool {
        self.locked <= self.total
    }
}
