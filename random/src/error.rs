use thiserror::Error;

#[derive(Debug, Error)]
pub enum RandomError {
    #[error("randomness source not available: {0}")]
    Unavailable(String),

    #[error("randomness sequence is empty")]
    Exhausted,

    #[error("{0}")]
    Other(String),
}
