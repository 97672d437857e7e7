//! The external stake token.
//!
//! Collateral lives in an external value-transfer service. Deposits pull
//! tokens from the participant into the court's custody; withdrawals push
//! them back. The ledger only records the court's view of custody.

use thiserror::Error;
use tribunal_types::{Address, StakeAmount};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("insufficient token balance: need {needed}, have {available}")]
    InsufficientBalance { needed: u128, available: u128 },

    #[error("token service unavailable: {0}")]
    Unavailable(String),
}

/// Value-transfer operations the court needs from the stake token.
pub trait StakeToken: Send + Sync {
    /// Move `amount` from `from` into court custody.
    fn pull(&self, from: &Address, amount: StakeAmount) -> Result<(), TokenError>;

    /// Move `amount` out of court custody to `to`.
    fn push(&self, to: &Address, amount: StakeAmount) -> Result<(), TokenError>;

    /// Spendable token balance of `owner` outside the court.
    fn balance_of(&self, owner: &Address) -> Result<StakeAmount, TokenError>;
}
