//! Error types for docnode-common.

use thiserror::Error;

/// Low-level error raised while reading binary data.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    /// End of buffer reached while reading.
    #[error("unexpected end of buffer: needed {needed} bytes but only {available} available")]
    UnexpectedEof { needed: usize, available: usize },

    /// A length prefix was negative.
    #[error("negative length prefix: {0}")]
    NegativeLength(i32),
}

/// Result type alias using the common Error type.
pub type Result<T> = std::result::Result<T, Error>;
