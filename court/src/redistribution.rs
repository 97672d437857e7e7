//! Redistribution engine: slashing and proportional rewards at resolution.
//!
//! Given a ruling and the dispute's vote records this module computes, without
//! touching the ledger:
//! - Winners: jurors who revealed the ruling. Their lock is released and they
//!   share the forfeited stake in proportion to their selection count.
//! - Losers: jurors who revealed the other option or never revealed. Their
//!   whole locked stake is forfeited.
//!
//! An `Undecided` ruling releases every lock with no transfer.
//!
//! Rewards are floored; the remainder (`dust`) is not paid to anyone and is
//! always smaller than the total winner weight.

use crate::error::CourtError;
use crate::state::Dispute;
use serde::{Deserialize, Serialize};
use tribunal_stake::Settlement;
use tribunal_types::{Address, Ruling, StakeAmount};

/// Settlement result for one juror.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct JurorOutcome {
    pub address: Address,
    /// Selection count in the dispute.
    pub weight: u32,
    pub locked_stake: StakeAmount,
    pub revealed: bool,
    /// Revealed the winning option. Always false for an `Undecided` ruling.
    pub voted_with_majority: bool,
    /// Forfeited locked stake (losers only).
    pub penalty: StakeAmount,
    /// Share of the forfeited pool (winners only).
    pub reward: StakeAmount,
}

impl JurorOutcome {
    /// Part of the lock handed back to `available` rather than forfeited.
    pub fn released(&self) -> StakeAmount {
        self.locked_stake - self.penalty
    }
}

/// Full settlement of a resolved dispute.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Redistribution {
    pub ruling: Ruling,
    /// One entry per unique juror, in draw order.
    pub outcomes: Vec<JurorOutcome>,
    pub total_slashed: StakeAmount,
    pub total_winner_weight: u64,
    pub total_rewarded: StakeAmount,
    /// `total_slashed − total_rewarded`, left undistributed.
    pub dust: StakeAmount,
}

impl Redistribution {
    /// Ledger mutations realising this outcome: every lock is either slashed
    /// or released, exactly once.
    pub fn settlement(&self) -> Settlement {
        let mut settlement = Settlement::new();
        for outcome in &self.outcomes {
            settlement.slash(outcome.address.clone(), outcome.penalty);
            settlement.unlock(outcome.address.clone(), outcome.released());
            settlement.reward(outcome.address.clone(), outcome.reward);
        }
        settlement
    }

    pub fn outcome(&self, juror: &Address) -> Option<&JurorOutcome> {
        self.outcomes.iter().find(|o| &o.address == juror)
    }
}

/// Compute slashing and rewards for `dispute` under `ruling`.
pub fn compute_redistribution(
    ruling: Ruling,
    dispute: &Dispute,
) -> Result<Redistribution, CourtError> {
    let jurors: Vec<_> = dispute
        .unique_jurors
        .iter()
        .filter_map(|address| dispute.vote(address).map(|vote| (address, vote)))
        .collect();

    if !ruling.is_decided() {
        let outcomes = jurors
            .into_iter()
            .map(|(address, vote)| JurorOutcome {
                address: address.clone(),
                weight: vote.selection_count,
                locked_stake: vote.locked_stake,
                revealed: vote.revealed(),
                voted_with_majority: false,
                penalty: 0,
                reward: 0,
            })
            .collect();
        return Ok(Redistribution {
            ruling,
            outcomes,
            total_slashed: 0,
            total_winner_weight: 0,
            total_rewarded: 0,
            dust: 0,
        });
    }

    // Pass 1: tally winners.
    let total_winner_weight: u64 = jurors
        .iter()
        .filter(|(_, vote)| vote.revealed_choice == Some(ruling))
        .map(|(_, vote)| u64::from(vote.selection_count))
        .sum();

    // Pass 2: slash everyone else.
    let mut total_slashed: StakeAmount = 0;
    let mut outcomes = Vec::with_capacity(jurors.len());
    for (address, vote) in &jurors {
        let won = vote.revealed_choice == Some(ruling);
        let penalty = if won { 0 } else { vote.locked_stake };
        total_slashed = total_slashed
            .checked_add(penalty)
            .ok_or(CourtError::Overflow)?;
        outcomes.push(JurorOutcome {
            address: (*address).clone(),
            weight: vote.selection_count,
            locked_stake: vote.locked_stake,
            revealed: vote.revealed(),
            voted_with_majority: won,
            penalty,
            reward: 0,
        });
    }

    // Pass 3: share the forfeited pool among winners.
    let mut total_rewarded: StakeAmount = 0;
    if total_slashed > 0 && total_winner_weight > 0 {
        for outcome in outcomes.iter_mut().filter(|o| o.voted_with_majority) {
            let reward = total_slashed
                .checked_mul(StakeAmount::from(outcome.weight))
                .ok_or(CourtError::Overflow)?
                / StakeAmount::from(total_winner_weight);
            outcome.reward = reward;
            total_rewarded += reward;
        }
    }

    Ok(Redistribution {
        ruling,
        outcomes,
        total_slashed,
        total_winner_weight,
        total_rewarded,
        dust: total_slashed - total_rewarded,
    })
}
