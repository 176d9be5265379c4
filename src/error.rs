//! Error types shared by every codec in the crate.

use thiserror::Error;

/// Errors reported by the forward error correction codecs
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// A parameter, length or position was rejected
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A message does not fit in the code's capacity
    #[error("input of length {length} exceeds maximum length {max_length}")]
    InputTooLarge { length: usize, max_length: usize },

    /// The block carries more corruption than the code can correct
    #[error("too many errors to correct")]
    TooManyErrors,
}

impl Error {
    /// Shorthand for [`Error::InvalidInput`]
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Error::InvalidInput(msg.into())
    }
}

/// Result type used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;
