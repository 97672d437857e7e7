//! Ledger mutations that resolve a dispute.

use serde::{Deserialize, Serialize};
use tribunal_types::{Address, StakeAmount};

/// One ledger mutation of a settlement.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SettlementEntry {
    /// Forfeit locked stake (removed from `locked` and `total`).
    Slash { address: Address, amount: StakeAmount },
    /// Release locked stake back to `available`.
    Unlock { address: Address, amount: StakeAmount },
    /// Credit a share of forfeited stake to `total`.
    Reward { address: Address, amount: StakeAmount },
}

impl SettlementEntry {
    pub fn address(&self) -> &Address {
        match self {
            Self::Slash { address, .. }
            | Self::Unlock { address, .. }
            | Self::Reward { address, .. } => address,
        }
    }
}

/// An ordered list of mutations applied atomically by
/// [`crate::StakeLedger::apply_settlement`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settlement {
    entries: Vec<SettlementEntry>,
}

impl Settlement {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn slash(&mut self, address: Address, amount: StakeAmount) {
        self.push(SettlementEntry::Slash { address, amount });
    }

    pub fn unlock(&mut self, address: Address, amount: StakeAmount) {
        self.push(SettlementEntry::Unlock { address, amount });
    }

    pub fn reward(&mut self, address: Address, amount: StakeAmount) {
        self.push(SettlementEntry::Reward { address, amount });
    }

    pub fn entries(&self) -> &[SettlementEntry] {
        &self.entries
    }

    /// Net change in total stake: rewards minus slashes. Never positive for a
    /// well-formed dispute settlement; the negative remainder is rounding dust.
    /// `None` when an amount or the running sum does not fit in `i128`.
    pub fn net_total_change(&self) -> Option<i128> {
        self.entries.iter().try_fold(0i128, |acc, e| match e {
            SettlementEntry::Slash { amount, .. } => acc.checked_sub(i128::try_from(*amount).ok()?),
            SettlementEntry::Reward { amount, .. } => acc.checked_add(i128::try_from(*amount).ok()?),
            SettlementEntry::Unlock { .. } => Some(acc),
        })
    }

    fn push(&mut self, entry: SettlementEntry) {
        // Zero-amount entries carry no information.
        let amount = match &entry {
            SettlementEntry::Slash { amount, .. }
            | SettlementEntry::Unlock { amount, .. }
            | SettlementEntry::Reward { amount, .. } => *amount,
        };
        if amount > 0 {
            self.entries.push(entry);
        }
    }
}
