//! Parameter validation errors.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParamsError {
    #[error("selection slot count must be a positive odd number, got {0}")]
    InvalidSlotCount(u32),

    #[error("minimum stake per selection slot must be non-zero")]
    ZeroStakePerSlot,

    #[error("minimum participation stake must be non-zero")]
    ZeroMinimumStake,

    #[error("{phase} phase duration must be non-zero")]
    ZeroDuration { phase: &'static str },

    #[error("draw retry factor must be non-zero")]
    ZeroRetryFactor,
}
