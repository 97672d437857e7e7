//! Court state storage trait.

use crate::StoreError;
use tribunal_types::{Address, DisputeId};

/// Store trait for persisting the stake ledger and dispute records.
///
/// Uses opaque `Vec<u8>` values so the store doesn't depend on the court crate.
pub trait CourtStore {
    fn put_stake_record(&self, address: &Address, record: &[u8]) -> Result<(), StoreError>;

    /// All stake records, in no particular order. Roster order is kept by the
    /// caller under a meta key.
    fn iter_stake_records(&self) -> Result<Vec<(Address, Vec<u8>)>, StoreError>;

    fn put_dispute(&self, id: DisputeId, dispute: &[u8]) -> Result<(), StoreError>;
    fn get_dispute(&self, id: DisputeId) -> Result<Option<Vec<u8>>, StoreError>;

    /// All disputes ordered by id.
    fn iter_disputes(&self) -> Result<Vec<(DisputeId, Vec<u8>)>, StoreError>;

    fn get_meta(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError>;
    fn put_meta(&self, key: &[u8], value: &[u8]) -> Result<(), StoreError>;
}
