//! Sealed-vote commitments.
//!
//! A juror publishes `vote_commitment(dispute, juror, choice, nonce)` during the
//! commit window and discloses `(choice, nonce)` during the reveal window. The
//! dispute id and juror address are part of the preimage, so a commitment
//! copied from another juror can never be opened by the copier.

use crate::hash::blake2b_256_multi;
use tribunal_types::{Address, CommitmentHash, DisputeId};

/// Secret salt chosen by the juror at commit time.
pub type VoteNonce = [u8; 32];

const DOMAIN: &[u8] = b"tribunal/vote-commitment/v1";

/// Compute the commitment for a vote.
pub fn vote_commitment(
    dispute: DisputeId,
    juror: &Address,
    choice: u8,
    nonce: &VoteNonce,
) -> CommitmentHash {
    let id = dispute.to_be_bytes();
    // Length prefix keeps the address boundary unambiguous.
    let juror_len = (juror.as_bytes().len() as u64).to_be_bytes();
    CommitmentHash::new(blake2b_256_multi(&[
        DOMAIN,
        &id,
        &juror_len,
        juror.as_bytes(),
        &[choice],
        nonce,
    ]))
}
