//! Dispute state tracking.

use crate::redistribution::Redistribution;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tribunal_types::{Address, CommitmentHash, DisputeId, Ruling, StakeAmount, Timestamp};

/// Lifecycle phase of a dispute.
///
/// Phases only move forward. `JurorsDrawn` and `Commit` both accept commits,
/// `Commit` and `Reveal` both accept reveals: the phase records the furthest
/// step reached, while the deadlines decide what is currently allowed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DisputePhase {
    /// The dispute does not exist.
    #[default]
    None,
    /// Created, jurors not yet drawn.
    Created,
    /// Jurors drawn and their stake locked; commit window open.
    JurorsDrawn,
    /// At least one commitment recorded.
    Commit,
    /// At least one vote revealed.
    Reveal,
    /// Ruling fixed and stake settled.
    Resolved,
}

/// A juror's sealed vote and stake within one dispute.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JurorVote {
    /// Sealed vote; set once during the commit window.
    pub commitment: Option<CommitmentHash>,
    /// Slots won in this dispute; the juror's voting weight.
    pub selection_count: u32,
    /// `selection_count × min_stake_per_slot`, reserved until resolution.
    pub locked_stake: StakeAmount,
    /// The disclosed vote, once revealed.
    pub revealed_choice: Option<Ruling>,
}

impl JurorVote {
    pub fn has_committed(&self) -> bool {
        self.commitment.is_some()
    }

    pub fn revealed(&self) -> bool {
        self.revealed_choice.is_some()
    }
}

/// One dispute and every juror's vote record in it.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Dispute {
    pub id: DisputeId,
    /// Opaque reference to the dispute's evidence; never interpreted.
    pub evidence: String,
    pub phase: DisputePhase,
    pub created_at: Timestamp,
    /// Distinct jurors in the order they were first drawn.
    pub unique_jurors: Vec<Address>,
    /// Completed draw slots.
    pub total_selections: u32,
    pub commit_deadline: Option<Timestamp>,
    pub reveal_deadline: Option<Timestamp>,
    /// Revealed weight for [`Ruling::OptionA`].
    pub weight_for_a: u64,
    /// Revealed weight for [`Ruling::OptionB`].
    pub weight_for_b: u64,
    pub ruling: Ruling,
    pub votes: HashMap<Address, JurorVote>,
    /// Settlement outcome, recorded at resolution.
    pub resolution: Option<Redistribution>,
}

impl Dispute {
    pub fn new(id: DisputeId, evidence: String, created_at: Timestamp) -> Self {
        Self {
            id,
            evidence,
            phase: DisputePhase::Created,
            created_at,
            unique_jurors: Vec::new(),
            total_selections: 0,
            commit_deadline: None,
            reveal_deadline: None,
            weight_for_a: 0,
            weight_for_b: 0,
            ruling: Ruling::Undecided,
            votes: HashMap::new(),
            resolution: None,
        }
    }

    pub fn vote(&self, juror: &Address) -> Option<&JurorVote> {
        self.votes.get(juror)
    }

    pub fn is_juror(&self, participant: &Address) -> bool {
        self.votes
            .get(participant)
            .is_some_and(|v| v.selection_count > 0)
    }

    /// Accumulated revealed weight for a ruling option.
    pub fn weight_for(&self, ruling: Ruling) -> u64 {
        match ruling {
            Ruling::OptionA => self.weight_for_a,
            Ruling::OptionB => self.weight_for_b,
            Ruling::Undecided => 0,
        }
    }

    /// The heavier option, or `Undecided` on equal weight (including 0 vs 0).
    pub fn leading_ruling(&self) -> Ruling {
        use std::cmp::Ordering;
        match self.weight_for_a.cmp(&self.weight_for_b) {
            Ordering::Greater => Ruling::OptionA,
            Ordering::Less => Ruling::OptionB,
            Ordering::Equal => Ruling::Undecided,
        }
    }

    /// Sum of every juror's locked stake in this dispute.
    pub fn total_locked_stake(&self) -> StakeAmount {
        self.votes
            .values()
            .map(|v| v.locked_stake)
            .fold(0, StakeAmount::saturating_add)
    }

    pub fn summary(&self) -> DisputeSummary {
        DisputeSummary {
            id: self.id,
            phase: self.phase,
            ruling: self.ruling,
            weight_for_a: self.weight_for_a,
            weight_for_b: self.weight_for_b,
            total_selections: self.total_selections,
            unique_jurors: self.unique_jurors.len(),
            commit_deadline: self.commit_deadline,
            reveal_deadline: self.reveal_deadline,
            dust: self.resolution.as_ref().map(|r| r.dust),
        }
    }
}

/// Read-only overview of a dispute.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisputeSummary {
    pub id: DisputeId,
    pub phase: DisputePhase,
    pub ruling: Ruling,
    pub weight_for_a: u64,
    pub weight_for_b: u64,
    pub total_selections: u32,
    pub unique_jurors: usize,
    pub commit_deadline: Option<Timestamp>,
    pub reveal_deadline: Option<Timestamp>,
    /// Undistributed rounding remainder, once resolved.
    pub dust: Option<StakeAmount>,
}
