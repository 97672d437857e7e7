//! Fundamental types for the Tribunal court.
//!
//! This crate defines the core types shared across every other crate in the workspace:
//! participant addresses, dispute identifiers, rulings, commitment hashes, timestamps
//! and the court parameters fixed at instantiation time.

pub mod address;
pub mod dispute;
pub mod error;
pub mod hash;
pub mod params;
pub mod time;

pub use address::Address;
pub use dispute::{DisputeId, Ruling};
pub use error::ParamsError;
pub use hash::CommitmentHash;
pub use params::CourtParams;
pub use time::Timestamp;

/// Stake amounts are raw integer units of the external stake token.
pub type StakeAmount = u128;
