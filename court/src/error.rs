use crate::state::DisputePhase;
use thiserror::Error;
use tribunal_random::RandomError;
use tribunal_stake::{StakeError, TokenError};
use tribunal_store::StoreError;
use tribunal_types::{DisputeId, ParamsError, Timestamp};

#[derive(Debug, Error)]
pub enum CourtError {
    #[error("amount must be non-zero")]
    InvalidAmount,

    #[error("invalid participant address {0:?}")]
    InvalidParticipant(String),

    #[error("total stake {total} would be below the minimum of {minimum}")]
    BelowMinimum { total: u128, minimum: u128 },

    #[error("insufficient unlocked stake: requested {requested}, available {available}")]
    InsufficientUnlockedStake { requested: u128, available: u128 },

    #[error("insufficient stake to lock: need {needed}, available {available}")]
    InsufficientStake { needed: u128, available: u128 },

    #[error("pool has {available} available stake, need at least {needed}")]
    InsufficientPoolStake { available: u128, needed: u128 },

    #[error("dispute {dispute} is in phase {actual:?}, expected {expected}")]
    WrongPhase {
        dispute: DisputeId,
        actual: DisputePhase,
        expected: &'static str,
    },

    #[error("dispute {dispute}: slot {slot} not filled after {attempts} draw attempts")]
    DrawExhausted {
        dispute: DisputeId,
        slot: u32,
        attempts: usize,
    },

    #[error("no participant can take a selection slot")]
    NoEligibleParticipant,

    #[error("deadline {deadline} has passed (now {now})")]
    DeadlinePassed { deadline: Timestamp, now: Timestamp },

    #[error("reveal window opens after {opens_after} (now {now})")]
    TooEarly { opens_after: Timestamp, now: Timestamp },

    #[error("{participant} was not drawn as a juror for dispute {dispute}")]
    NotAJuror {
        dispute: DisputeId,
        participant: String,
    },

    #[error("juror {0} has already committed")]
    AlreadyCommitted(String),

    #[error("juror {0} has no commitment to reveal")]
    NoCommitment(String),

    #[error("juror {0} has already revealed")]
    AlreadyRevealed(String),

    #[error("vote value {0} is not a valid ruling option")]
    InvalidChoice(u8),

    #[error("revealed vote of juror {0} does not match the commitment")]
    CommitMismatch(String),

    #[error("reveal window is open until {deadline} (now {now})")]
    RevealStillOpen { deadline: Timestamp, now: Timestamp },

    #[error("invalid court parameters: {0}")]
    InvalidConfig(#[from] ParamsError),

    #[error("config error: {0}")]
    Config(String),

    #[error("stake ledger error: {0}")]
    Stake(StakeError),

    #[error("stake token error: {0}")]
    Token(#[from] TokenError),

    #[error("randomness error: {0}")]
    Randomness(#[from] RandomError),

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("arithmetic overflow")]
    Overflow,
}

/// Ledger failures that callers can trigger surface as their own variants.
impl From<StakeError> for CourtError {
    fn from(e: StakeError) -> Self {
        match e {
            StakeError::InvalidAmount => Self::InvalidAmount,
            StakeError::BelowMinimum { total, minimum } => Self::BelowMinimum { total, minimum },
            StakeError::InsufficientUnlockedStake {
                requested,
                available,
            } => Self::InsufficientUnlockedStake {
                requested,
                available,
            },
            StakeError::InsufficientStake { needed, available } => {
                Self::InsufficientStake { needed, available }
            }
            StakeError::Overflow => Self::Overflow,
            other => Self::Stake(other),
        }
    }
}
