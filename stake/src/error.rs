//! Stake-ledger errors.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StakeError {
    #[error("amount must be non-zero")]
    InvalidAmount,

    #[error("total stake {total} would be below the minimum of {minimum}")]
    BelowMinimum { total: u128, minimum: u128 },

    #[error("insufficient unlocked stake: requested {requested}, available {available}")]
    InsufficientUnlockedStake { requested: u128, available: u128 },

    #[error("insufficient stake to lock: need {needed}, available {available}")]
    InsufficientStake { needed: u128, available: u128 },

    #[error("participant {0} is not known to the ledger")]
    UnknownParticipant(String),

    #[error("cannot release {requested} from {address}: only {locked} locked")]
    LockUnderflow {
        address: String,
        locked: u128,
        requested: u128,
    },

    #[error("arithmetic overflow in stake computation")]
    Overflow,

    #[error("corrupt ledger state: {0}")]
    Corrupt(String),
}
