//! Nullable infrastructure for deterministic testing.
//!
//! Everything the court depends on from the outside world (time, randomness,
//! storage, the stake token) sits behind a trait or a parameter. This crate
//! provides test-friendly implementations that:
//! - Return deterministic values
//! - Can be controlled programmatically
//! - Never touch the filesystem or network
//!
//! Usage: swap real implementations for nullables in tests.

pub mod clock;
pub mod random;
pub mod store;
pub mod token;

pub use clock::NullClock;
pub use random::NullRandom;
pub use store::NullStore;
pub use token::NullToken;
