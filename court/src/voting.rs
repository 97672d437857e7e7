//! Sealed voting: drawn jurors commit to a hidden vote, then open it.

use crate::error::CourtError;
use crate::state::{Dispute, DisputePhase};
use tribunal_crypto::{vote_commitment, VoteNonce};
use tribunal_types::{Address, CommitmentHash, DisputeId, Ruling, Timestamp};

/// Engine for the commit and reveal steps of a dispute.
///
/// Every check runs before the dispute is touched, so a rejected vote leaves
/// no trace.
pub struct SealedVoting;

impl SealedVoting {
    /// Record a juror's commitment during the commit window.
    pub fn commit(
        &self,
        dispute: &mut Dispute,
        juror: &Address,
        commitment: CommitmentHash,
        now: Timestamp,
    ) -> Result<(), CourtError> {
        let deadline = match (dispute.phase, dispute.commit_deadline) {
            (DisputePhase::JurorsDrawn | DisputePhase::Commit, Some(deadline)) => deadline,
            _ => {
                return Err(CourtError::WrongPhase {
                    dispute: dispute.id,
                    actual: dispute.phase,
                    expected: "JurorsDrawn or Commit",
                })
            }
        };
        if now > deadline {
            return Err(CourtError::DeadlinePassed { deadline, now });
        }
        if !dispute.is_juror(juror) {
            return Err(not_a_juror(dispute.id, juror));
        }
        let id = dispute.id;
        let vote = dispute
            .votes
            .get_mut(juror)
            .ok_or_else(|| not_a_juror(id, juror))?;
        if vote.has_committed() {
            return Err(CourtError::AlreadyCommitted(juror.to_string()));
        }

        vote.commitment = Some(commitment);
        dispute.phase = dispute.phase.max(DisputePhase::Commit);
        Ok(())
    }

    /// Open a commitment during the reveal window. On success the juror's
    /// selection count is added to the weight of the revealed option, which
    /// is returned.
    pub fn reveal(
        &self,
        dispute: &mut Dispute,
        juror: &Address,
        choice: u8,
        nonce: &VoteNonce,
        now: Timestamp,
    ) -> Result<Ruling, CourtError> {
        let (commit_deadline, reveal_deadline) = match (
            dispute.phase,
            dispute.commit_deadline,
            dispute.reveal_deadline,
        ) {
            (DisputePhase::Commit | DisputePhase::Reveal, Some(c), Some(r)) => (c, r),
            _ => {
                return Err(CourtError::WrongPhase {
                    dispute: dispute.id,
                    actual: dispute.phase,
                    expected: "Commit or Reveal",
                })
            }
        };
        if now <= commit_deadline {
            return Err(CourtError::TooEarly {
                opens_after: commit_deadline,
                now,
            });
        }
        if now > reveal_deadline {
            return Err(CourtError::DeadlinePassed {
                deadline: reveal_deadline,
                now,
            });
        }

        if !dispute.is_juror(juror) {
            return Err(not_a_juror(dispute.id, juror));
        }
        let vote = dispute.vote(juror).ok_or_else(|| not_a_juror(dispute.id, juror))?;
        let commitment = vote
            .commitment
            .ok_or_else(|| CourtError::NoCommitment(juror.to_string()))?;
        if vote.revealed() {
            return Err(CourtError::AlreadyRevealed(juror.to_string()));
        }
        let ruling = Ruling::from_choice(choice).ok_or(CourtError::InvalidChoice(choice))?;
        if vote_commitment(dispute.id, juror, choice, nonce) != commitment {
            return Err(CourtError::CommitMismatch(juror.to_string()));
        }

        let weight = u64::from(vote.selection_count);
        let tally = dispute
            .weight_for(ruling)
            .checked_add(weight)
            .ok_or(CourtError::Overflow)?;
        match ruling {
            Ruling::OptionA => dispute.weight_for_a = tally,
            _ => dispute.weight_for_b = tally,
        }
        if let Some(vote) = dispute.votes.get_mut(juror) {
            vote.revealed_choice = Some(ruling);
        }
        dispute.phase = DisputePhase::Reveal;
        Ok(ruling)
    }

    /// The ruling the revealed weights currently support.
    pub fn tally(&self, dispute: &Dispute) -> Ruling {
        dispute.leading_ruling()
    }
}

fn not_a_juror(dispute: DisputeId, juror: &Address) -> CourtError {
    CourtError::NotAJuror {
        dispute,
        participant: juror.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::JurorVote;

    const COMMIT_END: u64 = 100;
    const REVEAL_END: u64 = 200;

    fn drawn_dispute() -> Dispute {
        let mut d = Dispute::new(DisputeId::FIRST, "case".into(), Timestamp::new(0));
        d.phase = DisputePhase::JurorsDrawn;
        d.commit_deadline = Some(Timestamp::new(COMMIT_END));
        d.reveal_deadline = Some(Timestamp::new(REVEAL_END));
        for (name, slots) in [("alice", 3), ("bob", 2)] {
            let address = Address::new(name);
            d.unique_jurors.push(address.clone());
            d.votes.insert(
                address,
                JurorVote {
                    selection_count: slots,
                    locked_stake: u128::from(slots) * 100,
                    ..JurorVote::default()
                },
            );
        }
        d
    }

    fn sealed(d: &Dispute, juror: &str, choice: u8, nonce: u8) -> CommitmentHash {
        vote_commitment(d.id, &Address::new(juror), choice, &[nonce; 32])
    }

    #[test]
    fn commit_then_reveal_accumulates_weight() {
        let voting = SealedVoting;
        let mut d = drawn_dispute();
        let alice = Address::new("alice");
        let c = sealed(&d, "alice", Ruling::CHOICE_A, 7);
        voting.commit(&mut d, &alice, c, Timestamp::new(10)).unwrap();
        assert_eq!(d.phase, DisputePhase::Commit);

        let ruling = voting
            .reveal(&mut d, &alice, Ruling::CHOICE_A, &[7; 32], Timestamp::new(101))
            .unwrap();
        assert_eq!(ruling, Ruling::OptionA);
        assert_eq!(d.weight_for_a, 3);
        assert_eq!(d.phase, DisputePhase::Reveal);
        assert_eq!(voting.tally(&d), Ruling::OptionA);
    }

    #[test]
    fn commit_rejections() {
        let voting = SealedVoting;
        let mut d = drawn_dispute();
        let alice = Address::new("alice");
        let c = sealed(&d, "alice", 1, 0);

        assert!(matches!(
            voting.commit(&mut d, &alice, c, Timestamp::new(COMMIT_END + 1)),
            Err(CourtError::DeadlinePassed { .. })
        ));
        assert!(matches!(
            voting.commit(&mut d, &Address::new("mallory"), c, Timestamp::new(1)),
            Err(CourtError::NotAJuror { .. })
        ));
        voting.commit(&mut d, &alice, c, Timestamp::new(COMMIT_END)).unwrap();
        assert!(matches!(
            voting.commit(&mut d, &alice, c, Timestamp::new(1)),
            Err(CourtError::AlreadyCommitted(_))
        ));

        let mut created = Dispute::new(DisputeId::FIRST, String::new(), Timestamp::new(0));
        assert!(matches!(
            voting.commit(&mut created, &alice, c, Timestamp::new(1)),
            Err(CourtError::WrongPhase {
                actual: DisputePhase::Created,
                ..
            })
        ));
    }

    #[test]
    fn reveal_window_is_exclusive_then_inclusive() {
        let voting = SealedVoting;
        let mut d = drawn_dispute();
        let alice = Address::new("alice");
        let c = sealed(&d, "alice", 2, 1);
        voting.commit(&mut d, &alice, c, Timestamp::new(5)).unwrap();

        assert!(matches!(
            voting.reveal(&mut d, &alice, 2, &[1; 32], Timestamp::new(COMMIT_END)),
            Err(CourtError::TooEarly { .. })
        ));
        assert!(matches!(
            voting.reveal(&mut d, &alice, 2, &[1; 32], Timestamp::new(REVEAL_END + 1)),
            Err(CourtError::DeadlinePassed { .. })
        ));
        voting
            .reveal(&mut d, &alice, 2, &[1; 32], Timestamp::new(REVEAL_END))
            .unwrap();
        assert_eq!(d.weight_for_b, 3);
    }

    #[test]
    fn reveal_rejections_leave_dispute_untouched() {
        let voting = SealedVoting;
        let mut d = drawn_dispute();
        let alice = Address::new("alice");
        let bob = Address::new("bob");
        let c = sealed(&d, "alice", 1, 9);
        voting.commit(&mut d, &alice, c, Timestamp::new(5)).unwrap();
        let at = Timestamp::new(150);

        assert!(matches!(
            voting.reveal(&mut d, &Address::new("mallory"), 1, &[9; 32], at),
            Err(CourtError::NotAJuror { .. })
        ));
        assert!(matches!(
            voting.reveal(&mut d, &bob, 1, &[9; 32], at),
            Err(CourtError::NoCommitment(_))
        ));
        assert!(matches!(
            voting.reveal(&mut d, &alice, 3, &[9; 32], at),
            Err(CourtError::InvalidChoice(3))
        ));
        assert!(matches!(
            voting.reveal(&mut d, &alice, 2, &[9; 32], at),
            Err(CourtError::CommitMismatch(_))
        ));
        assert!(matches!(
            voting.reveal(&mut d, &alice, 1, &[8; 32], at),
            Err(CourtError::CommitMismatch(_))
        ));
        assert_eq!((d.weight_for_a, d.weight_for_b), (0, 0));
        assert_eq!(d.phase, DisputePhase::Commit);

        voting.reveal(&mut d, &alice, 1, &[9; 32], at).unwrap();
        assert!(matches!(
            voting.reveal(&mut d, &alice, 1, &[9; 32], at),
            Err(CourtError::AlreadyRevealed(_))
        ));
        assert_eq!(d.weight_for_a, 3);
    }

    #[test]
    fn copied_commitment_cannot_be_opened_by_another_juror() {
        let voting = SealedVoting;
        let mut d = drawn_dispute();
        let alice = Address::new("alice");
        let bob = Address::new("bob");
        let c = sealed(&d, "alice", 1, 4);
        voting.commit(&mut d, &alice, c, Timestamp::new(5)).unwrap();
        voting.commit(&mut d, &bob, c, Timestamp::new(6)).unwrap();
        assert!(matches!(
            voting.reveal(&mut d, &bob, 1, &[4; 32], Timestamp::new(150)),
            Err(CourtError::CommitMismatch(_))
        ));
    }

    #[test]
    fn vote_entry_without_selections_is_not_a_juror() {
        let voting = SealedVoting;
        let mut d = drawn_dispute();
        let ghost = Address::new("ghost");
        d.votes.insert(ghost.clone(), JurorVote::default());
        let c = sealed(&d, "ghost", 1, 2);

        assert!(matches!(
            voting.commit(&mut d, &ghost, c, Timestamp::new(5)),
            Err(CourtError::NotAJuror { .. })
        ));
        d.phase = DisputePhase::Commit;
        d.votes.get_mut(&ghost).unwrap().commitment = Some(c);
        assert!(matches!(
            voting.reveal(&mut d, &ghost, 1, &[2; 32], Timestamp::new(150)),
            Err(CourtError::NotAJuror { .. })
        ));
        assert_eq!((d.weight_for_a, d.weight_for_b), (0, 0));
    }
}
