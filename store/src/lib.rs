//! Abstract storage traits for the Tribunal court.
//!
//! Durable storage is an external collaborator. Every backend implements these
//! traits; the court depends only on the traits and serializes its own types,
//! so values cross this boundary as opaque bytes.

pub mod court;
pub mod error;

pub use court::CourtStore;
pub use error::StoreError;
