//! Nullable store: thread-safe in-memory storage for testing.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};
use tribunal_store::court::CourtStore;
use tribunal_store::StoreError;
use tribunal_types::{Address, DisputeId};

/// An in-memory court store for testing.
///
/// Writes can be made to fail with [`NullStore::fail_writes`] to exercise
/// error propagation, or after a fixed number of successful writes with
/// [`NullStore::fail_writes_after`] to leave a partial save behind.
pub struct NullStore {
    stake_records: Mutex<HashMap<Address, Vec<u8>>>,
    disputes: Mutex<BTreeMap<DisputeId, Vec<u8>>>,
    meta: Mutex<HashMap<Vec<u8>, Vec<u8>>>,
    failing: AtomicBool,
    write_budget: AtomicUsize,
}

impl Default for NullStore {
    fn default() -> Self {
        Self {
            stake_records: Mutex::default(),
            disputes: Mutex::default(),
            meta: Mutex::default(),
            failing: AtomicBool::new(false),
            write_budget: AtomicUsize::new(usize::MAX),
        }
    }
}

impl NullStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept `writes` more writes, then fail every one after them.
    pub fn fail_writes_after(&self, writes: usize) {
        self.write_budget.store(writes, Ordering::SeqCst);
    }

    /// Make every subsequent write fail with a backend error.
    pub fn fail_writes(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn dispute_count(&self) -> usize {
        self.disputes.lock().map_or(0, |d| d.len())
    }

    pub fn stake_record_count(&self) -> usize {
        self.stake_records.lock().map_or(0, |r| r.len())
    }

    fn check_write(&self) -> Result<(), StoreError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(StoreError::Backend("null store set to fail writes".into()));
        }
        self.write_budget
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| left.checked_sub(1))
            .map(|_| ())
            .map_err(|_| StoreError::Backend("null store write budget spent".into()))
    }
}

fn guard<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>, StoreError> {
    mutex
        .lock()
        .map_err(|_| StoreError::Backend("null store lock poisoned".into()))
}

impl CourtStore for NullStore {
    fn put_stake_record(&self, address: &Address, record: &[u8]) -> Result<(), StoreError> {
        self.check_write()?;
        guard(&self.stake_records)?.insert(address.clone(), record.to_vec());
        Ok(())
    }

    fn iter_stake_records(&self) -> Result<Vec<(Address, Vec<u8>)>, StoreError> {
        Ok(guard(&self.stake_records)?
            .iter()
            .map(|(a, r)| (a.clone(), r.clone()))
            .collect())
    }

    fn put_dispute(&self, id: DisputeId, dispute: &[u8]) -> Result<(), StoreError> {
        self.check_write()?;
        guard(&self.disputes)?.insert(id, dispute.to_vec());
        Ok(())
    }

    fn get_dispute(&self, id: DisputeId) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(guard(&self.disputes)?.get(&id).cloned())
    }

    fn iter_disputes(&self) -> Result<Vec<(DisputeId, Vec<u8>)>, StoreError> {
        Ok(guard(&self.disputes)?
            .iter()
            .map(|(id, d)| (*id, d.clone()))
            .collect())
    }

    fn get_meta(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(guard(&self.meta)?.get(key).cloned())
    }

    fn put_meta(&self, key: &[u8], value: &[u8]) -> Result<(), StoreError> {
        self.check_write()?;
        guard(&self.meta)?.insert(key.to_vec(), value.to_vec());
        Ok(())
    }
}
