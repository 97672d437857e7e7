//! The stake ledger and its participant roster.

use crate::batch::PendingLocks;
use crate::error::StakeError;
use crate::record::StakeRecord;
use crate::settlement::{Settlement, SettlementEntry};
use crate::view::StakeView;
use std::collections::HashMap;
use tribunal_types::{Address, StakeAmount};

/// Stake bookkeeping for every known participant.
///
/// The roster is append-only: the position of a participant never changes and
/// entries are never removed, only zeroed. The sampler walks the roster in
/// index order, so iteration order is explicit rather than a property of a map.
#[derive(Clone, Debug, Default)]
pub struct StakeLedger {
    roster: Vec<Address>,
    records: Vec<StakeRecord>,
    index: HashMap<Address, usize>,
}

impl StakeLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a ledger from persisted `(address, record)` pairs in roster order.
    pub fn from_entries(entries: Vec<(Address, StakeRecord)>) -> Result<Self, StakeError> {
        let mut ledger = Self::new();
        for (address, record) in entries {
            if !record.is_consistent() {
                return Err(StakeError::Corrupt(format!(
                    "{address} has {} locked but only {} total",
                    record.locked, record.total
                )));
            }
            if ledger.index.contains_key(&address) {
                return Err(StakeError::Corrupt(format!("{address} appears twice")));
            }
            ledger.push(address, record);
        }
        Ok(ledger)
    }

    /// All `(address, record)` pairs in roster order.
    pub fn entries(&self) -> impl Iterator<Item = (&Address, &StakeRecord)> {
        self.roster.iter().zip(self.records.iter())
    }

    /// Every participant ever seen, in roster order.
    pub fn participants(&self) -> &[Address] {
        &self.roster
    }

    pub fn index_of(&self, address: &Address) -> Option<usize> {
        self.index.get(address).copied()
    }

    pub fn record(&self, address: &Address) -> Option<&StakeRecord> {
        self.index_of(address).map(|i| &self.records[i])
    }

    /// Sum of `total` across the roster.
    pub fn total_stake(&self) -> StakeAmount {
        self.records
            .iter()
            .map(|r| r.total)
            .fold(0, StakeAmount::saturating_add)
    }

    /// Sum of `locked` across the roster.
    pub fn total_locked(&self) -> StakeAmount {
        self.records
            .iter()
            .map(|r| r.locked)
            .fold(0, StakeAmount::saturating_add)
    }

    /// Check a deposit without applying it. Returns the resulting total.
    pub fn validate_deposit(
        &self,
        address: &Address,
        amount: StakeAmount,
        min_stake: StakeAmount,
    ) -> Result<StakeAmount, StakeError> {
        if amount == 0 {
            return Err(StakeError::InvalidAmount);
        }
        let current = self.record(address).map_or(0, |r| r.total);
        let total = current.checked_add(amount).ok_or(StakeError::Overflow)?;
        if total < min_stake {
            return Err(StakeError::BelowMinimum {
                total,
                minimum: min_stake,
            });
        }
        Ok(total)
    }

    /// Add collateral for `address`, registering it on first deposit.
    ///
    /// All-or-nothing: if the resulting total would stay below `min_stake`
    /// nothing is recorded, not even the address.
    pub fn deposit(
        &mut self,
        address: &Address,
        amount: StakeAmount,
        min_stake: StakeAmount,
    ) -> Result<StakeAmount, StakeError> {
        let total = self.validate_deposit(address, amount, min_stake)?;
        let index = self.ensure(address);
        self.records[index].total = total;
        Ok(total)
    }

    /// Check a withdrawal without applying it. Returns the resulting total.
    pub fn validate_withdraw(
        &self,
        address: &Address,
        amount: StakeAmount,
    ) -> Result<StakeAmount, StakeError> {
        if amount == 0 {
            return Err(StakeError::InvalidAmount);
        }
        let record = self.record(address).copied().unwrap_or_default();
        let available = record.available();
        if amount > available {
            return Err(StakeError::InsufficientUnlockedStake {
                requested: amount,
                available,
            });
        }
        Ok(record.total - amount)
    }

    /// Remove unlocked collateral. Only `available` stake can leave.
    pub fn withdraw(
        &mut self,
        address: &Address,
        amount: StakeAmount,
    ) -> Result<StakeAmount, StakeError> {
        let total = self.validate_withdraw(address, amount)?;
        let index = self
            .index_of(address)
            .ok_or_else(|| StakeError::UnknownParticipant(address.to_string()))?;
        self.records[index].total = total;
        Ok(total)
    }

    /// Reserve `amount` of `address`'s available stake.
    pub fn lock(&mut self, address: &Address, amount: StakeAmount) -> Result<(), StakeError> {
        let index = self.require(address)?;
        let record = &mut self.records[index];
        let available = record.available();
        if amount > available {
            return Err(StakeError::InsufficientStake {
                needed: amount,
                available,
            });
        }
        record.locked += amount;
        Ok(())
    }

    /// Release a reservation made by [`StakeLedger::lock`]. `total` is untouched.
    pub fn unlock(&mut self, address: &Address, amount: StakeAmount) -> Result<(), StakeError> {
        let index = self.require(address)?;
        let record = &mut self.records[index];
        record.locked = checked_release(address, record.locked, amount)?;
        Ok(())
    }

    /// Forfeit locked stake: deducted from both `locked` and `total`.
    pub fn slash(&mut self, address: &Address, amount: StakeAmount) -> Result<(), StakeError> {
        let index = self.require(address)?;
        let record = &mut self.records[index];
        record.locked = checked_release(address, record.locked, amount)?;
        record.total -= amount;
        Ok(())
    }

    /// Credit `amount` to `address`'s total.
    pub fn reward(&mut self, address: &Address, amount: StakeAmount) -> Result<(), StakeError> {
        let index = self.require(address)?;
        let record = &mut self.records[index];
        record.total = record.total.checked_add(amount).ok_or(StakeError::Overflow)?;
        Ok(())
    }

    /// Commit the locks of a completed draw batch.
    pub fn apply_locks(&mut self, locks: PendingLocks) -> Result<(), StakeError> {
        for (index, amount) in locks.iter() {
            let record = self
                .records
                .get(index)
                .ok_or_else(|| StakeError::Corrupt(format!("no participant at index {index}")))?;
            if amount > record.available() {
                return Err(StakeError::InsufficientStake {
                    needed: amount,
                    available: record.available(),
                });
            }
        }
        for (index, amount) in locks.iter() {
            self.records[index].locked += amount;
        }
        Ok(())
    }

    /// Apply a dispute settlement, or nothing at all if any entry is invalid.
    pub fn apply_settlement(&mut self, settlement: &Settlement) -> Result<(), StakeError> {
        let mut staged: HashMap<usize, StakeRecord> = HashMap::new();
        for entry in settlement.entries() {
            let address = entry.address();
            let index = self.require(address)?;
            let record = staged.entry(index).or_insert(self.records[index]);
            apply_entry(record, entry)?;
        }
        for (index, record) in staged {
            self.records[index] = record;
        }
        Ok(())
    }

    fn require(&self, address: &Address) -> Result<usize, StakeError> {
        self.index_of(address)
            .ok_or_else(|| StakeError::UnknownParticipant(address.to_string()))
    }

    fn ensure(&mut self, address: &Address) -> usize {
        match self.index_of(address) {
            Some(index) => index,
            None => self.push(address.clone(), StakeRecord::default()),
        }
    }

    fn push(&mut self, address: Address, record: StakeRecord) -> usize {
        let index = self.roster.len();
        self.index.insert(address.clone(), index);
        self.roster.push(address);
        self.records.push(record);
        index
    }
}

fn checked_release(
    address: &Address,
    locked: StakeAmount,
    amount: StakeAmount,
) -> Result<StakeAmount, StakeError> {
    locked
        .checked_sub(amount)
        .ok_or_else(|| StakeError::LockUnderflow {
            address: address.to_string(),
            locked,
            requested: amount,
        })
}

fn apply_entry(record: &mut StakeRecord, entry: &SettlementEntry) -> Result<(), StakeError> {
    match entry {
        SettlementEntry::Slash { address, amount } => {
            record.locked = checked_release(address, record.locked, *amount)?;
            record.total = record.total.checked_sub(*amount).ok_or(StakeError::Overflow)?;
        }
        SettlementEntry::Unlock { address, amount } => {
            record.locked = checked_release(address, record.locked, *amount)?;
        }
        SettlementEntry::Reward { amount, .. } => {
            record.total = record.total.checked_add(*amount).ok_or(StakeError::Overflow)?;
        }
    }
    Ok(())
}

impl StakeView for StakeLedger {
    fn participant_count(&self) -> usize {
        self.roster.len()
    }

    fn participant(&self, index: usize) -> Option<&Address> {
        self.roster.get(index)
    }

    fn available_at(&self, index: usize) -> StakeAmount {
        self.records.get(index).map_or(0, StakeRecord::available)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(s: &str) -> Address {
        Address::new(s)
    }

    fn funded(entries: &[(&str, StakeAmount)]) -> StakeLedger {
        let mut ledger = StakeLedger::new();
        for (name, amount) in entries {
            ledger.deposit(&addr(name), *amount, 0).unwrap();
        }
        ledger
    }

    #[test]
    fn deposit_creates_and_grows_record() {
        let mut ledger = StakeLedger::new();
        assert_eq!(ledger.deposit(&addr("alice"), 300, 100), Ok(300));
        assert_eq!(ledger.deposit(&addr("alice"), 50, 100), Ok(350));
        assert_eq!(ledger.record(&addr("alice")).unwrap().total, 350);
        assert_eq!(ledger.participants(), &[addr("alice")]);
    }

    #[test]
    fn zero_deposit_is_invalid() {
        let mut ledger = StakeLedger::new();
        assert_eq!(
            ledger.deposit(&addr("alice"), 0, 100),
            Err(StakeError::InvalidAmount)
        );
    }

    #[test]
    fn deposit_below_minimum_leaves_no_trace() {
        let mut ledger = StakeLedger::new();
        assert_eq!(
            ledger.deposit(&addr("alice"), 50, 100),
            Err(StakeError::BelowMinimum {
                total: 50,
                minimum: 100
            })
        );
        assert!(ledger.record(&addr("alice")).is_none());
        assert!(ledger.participants().is_empty());
    }

    #[test]
    fn top_up_counts_existing_total_towards_minimum() {
        let mut ledger = funded(&[("alice", 100)]);
        assert_eq!(ledger.deposit(&addr("alice"), 1, 100), Ok(101));
    }

    #[test]
    fn withdraw_only_from_available() {
        let mut ledger = funded(&[("alice", 500)]);
        ledger.lock(&addr("alice"), 300).unwrap();
        assert_eq!(
            ledger.withdraw(&addr("alice"), 201),
            Err(StakeError::InsufficientUnlockedStake {
                requested: 201,
                available: 200
            })
        );
        assert_eq!(ledger.withdraw(&addr("alice"), 200), Ok(300));
        let record = ledger.record(&addr("alice")).unwrap();
        assert_eq!((record.total, record.locked), (300, 300));
    }

    #[test]
    fn withdraw_by_unknown_participant_has_nothing_available() {
        let mut ledger = StakeLedger::new();
        assert_eq!(
            ledger.withdraw(&addr("ghost"), 1),
            Err(StakeError::InsufficientUnlockedStake {
                requested: 1,
                available: 0
            })
        );
    }

    #[test]
    fn fully_withdrawn_participant_stays_on_roster() {
        let mut ledger = funded(&[("alice", 100), ("bob", 100)]);
        ledger.withdraw(&addr("alice"), 100).unwrap();
        assert_eq!(ledger.participants(), &[addr("alice"), addr("bob")]);
        assert_eq!(ledger.record(&addr("alice")).unwrap().total, 0);
    }

    #[test]
    fn lock_beyond_available_fails() {
        let mut ledger = funded(&[("alice", 100)]);
        ledger.lock(&addr("alice"), 60).unwrap();
        assert_eq!(
            ledger.lock(&addr("alice"), 50),
            Err(StakeError::InsufficientStake {
                needed: 50,
                available: 40
            })
        );
    }

    #[test]
    fn lock_and_unlock_are_inverses() {
        let mut ledger = funded(&[("alice", 100)]);
        let before = *ledger.record(&addr("alice")).unwrap();
        ledger.lock(&addr("alice"), 70).unwrap();
        ledger.unlock(&addr("alice"), 70).unwrap();
        assert_eq!(*ledger.record(&addr("alice")).unwrap(), before);
    }

    #[test]
    fn unlock_more_than_locked_fails() {
        let mut ledger = funded(&[("alice", 100)]);
        ledger.lock(&addr("alice"), 10).unwrap();
        assert!(matches!(
            ledger.unlock(&addr("alice"), 11),
            Err(StakeError::LockUnderflow { locked: 10, .. })
        ));
    }

    #[test]
    fn slash_reduces_total_and_locked() {
        let mut ledger = funded(&[("alice", 500)]);
        ledger.lock(&addr("alice"), 200).unwrap();
        ledger.slash(&addr("alice"), 200).unwrap();
        let record = ledger.record(&addr("alice")).unwrap();
        assert_eq!((record.total, record.locked), (300, 0));
    }

    #[test]
    fn available_sum_reflects_locks() {
        let mut ledger = funded(&[("a", 500), ("b", 300), ("c", 200)]);
        assert_eq!(ledger.available_stake_sum(), 1000);
        ledger.lock(&addr("b"), 100).unwrap();
        assert_eq!(ledger.available_stake_sum(), 900);
        assert_eq!(ledger.total_locked(), 100);
        assert_eq!(ledger.total_stake(), 1000);
    }

    #[test]
    fn settlement_is_all_or_nothing() {
        let mut ledger = funded(&[("a", 500), ("b", 300)]);
        ledger.lock(&addr("a"), 100).unwrap();
        let before: Vec<StakeRecord> = ledger.entries().map(|(_, r)| *r).collect();

        let mut settlement = Settlement::new();
        settlement.unlock(addr("a"), 100);
        settlement.slash(addr("b"), 100); // b has nothing locked
        assert!(ledger.apply_settlement(&settlement).is_err());

        let after: Vec<StakeRecord> = ledger.entries().map(|(_, r)| *r).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn settlement_moves_slashed_stake() {
        let mut ledger = funded(&[("a", 500), ("b", 300)]);
        ledger.lock(&addr("a"), 100).unwrap();
        ledger.lock(&addr("b"), 100).unwrap();

        let mut settlement = Settlement::new();
        settlement.slash(addr("b"), 100);
        settlement.unlock(addr("a"), 100);
        settlement.reward(addr("a"), 100);
        ledger.apply_settlement(&settlement).unwrap();

        assert_eq!(*ledger.record(&addr("a")).unwrap(), StakeRecord { total: 600, locked: 0 });
        assert_eq!(*ledger.record(&addr("b")).unwrap(), StakeRecord { total: 200, locked: 0 });
        assert_eq!(ledger.total_stake(), 800);
    }

    #[test]
    fn from_entries_rejects_inconsistent_records() {
        let entries = vec![(addr("a"), StakeRecord { total: 10, locked: 20 })];
        assert!(matches!(
            StakeLedger::from_entries(entries),
            Err(StakeError::Corrupt(_))
        ));
    }

    #[test]
    fn from_entries_preserves_roster_order() {
        let ledger = funded(&[("c", 1), ("a", 2), ("b", 3)]);
        let entries: Vec<(Address, StakeRecord)> =
            ledger.entries().map(|(a, r)| (a.clone(), *r)).collect();
        let restored = StakeLedger::from_entries(entries).unwrap();
        assert_eq!(restored.participants(), ledger.participants());
        assert_eq!(restored.index_of(&addr("b")), Some(2));
    }
}
