//! Cryptographic primitives for the Tribunal court.
//!
//! - **Blake2b-256** for all hashing (randomness derivation, vote commitments)
//! - Sealed-vote commitments binding a juror's choice to a secret nonce

pub mod commitment;
pub mod hash;

pub use commitment::{vote_commitment, VoteNonce};
pub use hash::{blake2b_256, blake2b_256_multi};
