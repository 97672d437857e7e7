//! Stake ledger: the bookkeeping behind juror eligibility.
//!
//! Every participant has a `total` deposited and a `locked` amount reserved
//! across the disputes they sit on. `available = total − locked` is what the
//! sampler weighs and what can be withdrawn.
//!
//! This crate handles:
//! - The append-only participant roster
//! - Deposits and withdrawals (all-or-nothing)
//! - Locking stake for drawn slots, batched so a failed draw leaves no trace
//! - Settling a resolved dispute: slashing, rewarding and unlocking, validated
//!   in full before anything is applied
//! - The [`StakeToken`] seam to the external value-transfer service

pub mod batch;
pub mod error;
pub mod ledger;
pub mod record;
pub mod settlement;
pub mod token;
pub mod view;

pub use batch::{LockBatch, PendingLocks};
pub use error::StakeError;
pub use ledger::StakeLedger;
pub use record::StakeRecord;
pub use settlement::{Settlement, SettlementEntry};
pub use token::{StakeToken, TokenError};
pub use view::StakeView;
