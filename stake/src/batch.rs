//! Pending locks of an in-progress juror draw.
//!
//! A draw performs several weighted picks, each of which reserves stake and
//! shrinks the pool for the next pick. The picks run against a [`LockBatch`]
//! that layers its pending locks over the ledger; the ledger itself is only
//! touched when the whole draw succeeds and the batch is committed through
//! [`crate::StakeLedger::apply_locks`].

use crate::error::StakeError;
use crate::ledger::StakeLedger;
use crate::view::StakeView;
use std::collections::BTreeMap;
use tribunal_types::{Address, StakeAmount};

/// A ledger view with uncommitted locks applied.
pub struct LockBatch<'a> {
    ledger: &'a StakeLedger,
    pending: BTreeMap<usize, StakeAmount>,
}

impl<'a> LockBatch<'a> {
    pub fn new(ledger: &'a StakeLedger) -> Self {
        Self {
            ledger,
            pending: BTreeMap::new(),
        }
    }

    /// Reserve `amount` from the participant at `index`, within this batch only.
    pub fn lock(&mut self, index: usize, amount: StakeAmount) -> Result<(), StakeError> {
        let available = self.available_at(index);
        if amount > available {
            return Err(StakeError::InsufficientStake {
                needed: amount,
                available,
            });
        }
        let slot = self.pending.entry(index).or_insert(0);
        *slot = slot.checked_add(amount).ok_or(StakeError::Overflow)?;
        Ok(())
    }

    /// Amount locked so far in this batch for the participant at `index`.
    pub fn pending_at(&self, index: usize) -> StakeAmount {
        self.pending.get(&index).copied().unwrap_or(0)
    }

    /// Release the borrow on the ledger, keeping only the locks to commit.
    pub fn finish(self) -> PendingLocks {
        PendingLocks(self.pending.into_iter().collect())
    }
}

impl StakeView for LockBatch<'_> {
    fn participant_count(&self) -> usize {
        self.ledger.participant_count()
    }

    fn participant(&self, index: usize) -> Option<&Address> {
        self.ledger.participant(index)
    }

    fn available_at(&self, index: usize) -> StakeAmount {
        self.ledger
            .available_at(index)
            .saturating_sub(self.pending_at(index))
    }
}

/// Locks collected by a finished [`LockBatch`], keyed by roster index.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PendingLocks(Vec<(usize, StakeAmount)>);

impl PendingLocks {
    pub fn iter(&self) -> impl Iterator<Item = (usize, StakeAmount)> + '_ {
        self.0.iter().copied()
    }

    pub fn total(&self) -> StakeAmount {
        self.0.iter().map(|(_, a)| *a).fold(0, StakeAmount::saturating_add)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ledger() -> StakeLedger {
        let mut ledger = StakeLedger::new();
        ledger.deposit(&Address::new("a"), 300, 0).unwrap();
        ledger.deposit(&Address::new("b"), 100, 0).unwrap();
        ledger
    }

    #[test]
    fn batch_shrinks_view_without_touching_ledger() {
        let ledger = ledger();
        let mut batch = LockBatch::new(&ledger);
        batch.lock(0, 100).unwrap();
        batch.lock(0, 100).unwrap();
        assert_eq!(batch.available_at(0), 100);
        assert_eq!(batch.available_stake_sum(), 200);
        assert_eq!(ledger.available_stake_sum(), 400);
    }

    #[test]
    fn batch_rejects_overdraw() {
        let ledger = ledger();
        let mut batch = LockBatch::new(&ledger);
        batch.lock(1, 100).unwrap();
        assert_eq!(
            batch.lock(1, 1),
            Err(StakeError::InsufficientStake {
                needed: 1,
                available: 0
            })
        );
    }

    #[test]
    fn finished_batch_commits_once() {
        let mut ledger = ledger();
        let locks = {
            let mut batch = LockBatch::new(&ledger);
            batch.lock(0, 200).unwrap();
            batch.lock(1, 100).unwrap();
            batch.finish()
        };
        assert_eq!(locks.total(), 300);
        ledger.apply_locks(locks).unwrap();
        assert_eq!(ledger.total_locked(), 300);
        assert_eq!(ledger.available_stake_sum(), 100);
    }

    #[test]
    fn dropped_batch_leaves_ledger_unchanged() {
        let ledger = ledger();
        {
            let mut batch = LockBatch::new(&ledger);
            batch.lock(0, 300).unwrap();
        }
        assert_eq!(ledger.total_locked(), 0);
    }
}
