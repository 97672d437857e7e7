//! Dispute court.
//!
//! Participants stake collateral to become eligible jurors. For each dispute:
//! 1. **Draw**: a fixed odd number of selection slots is filled by weighted
//!    draws, each picking a participant with probability proportional to
//!    their available stake and locking one slot's worth of it.
//! 2. **Commit**: drawn jurors publish a sealed commitment to their vote.
//! 3. **Reveal**: after the commit window closes, jurors open their commitment;
//!    each revealed vote weighs as many slots as the juror won.
//! 4. **Finalize**: the heavier option wins. Jurors who voted against it or
//!    never revealed forfeit their locked stake, which is shared among the
//!    majority in proportion to their weight. A tie releases every lock.
//!
//! Randomness is injected through [`tribunal_random::RandomSource`]; time is
//! passed into every operation by the caller.

pub mod config;
pub mod court;
pub mod error;
pub mod redistribution;
pub mod sampler;
pub mod state;
pub mod voting;

pub use config::CourtConfig;
pub use court::{Court, CourtEvent, CourtSnapshot};
pub use error::CourtError;
pub use redistribution::{compute_redistribution, JurorOutcome, Redistribution};
pub use sampler::WeightedSampler;
pub use state::{Dispute, DisputePhase, DisputeSummary, JurorVote};
pub use voting::SealedVoting;
