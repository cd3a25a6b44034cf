//! Error types for node decoding.

use thiserror::Error;

/// Errors that can occur when decoding packed node trees.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    /// Low-level read error (truncated field or negative length prefix).
    #[error("{0}")]
    Common(#[from] docnode_common::Error),

    /// Fewer bytes than a node header prefix (version + length).
    #[error("buffer of {available} bytes is too short for a node header")]
    HeaderTooShort { available: usize },

    /// Version byte is not the supported version.
    #[error("node version {found} not in supported set ({expected})")]
    VersionMismatch { found: u8, expected: u8 },

    /// Declared node length exceeds the bytes available.
    #[error("data size ({available}) not sufficient to hold node of size {declared}")]
    SizeOverflow { declared: usize, available: usize },

    /// Declared node length is negative or smaller than the fixed node fields.
    #[error("invalid node length: {0}")]
    InvalidNodeLength(i32),

    /// Declared node length disagrees with the bytes the node actually occupies.
    #[error("node declares {declared} bytes but its fields occupy {consumed}")]
    LengthMismatch { declared: usize, consumed: usize },

    /// Attribute or node count is negative.
    #[error("negative element count: {0}")]
    NegativeCount(i32),

    /// Nesting deeper than the configured decode limit.
    #[error("node nesting exceeds the limit of {limit} levels")]
    DepthExceeded { limit: usize },

    /// XML rendering error.
    #[error("XML error: {0}")]
    Xml(String),
}

/// Broad classification of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Input is structurally invalid: too short, inconsistent or negative fields.
    MalformedInput,
    /// Version byte is not supported.
    VersionMismatch,
    /// A declared node length runs past the end of the buffer.
    SizeOverflow,
    /// Failure while rendering a decoded tree.
    Render,
}

impl Error {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::VersionMismatch { .. } => ErrorKind::VersionMismatch,
            Self::SizeOverflow { .. } => ErrorKind::SizeOverflow,
            Self::Xml(_) => ErrorKind::Render,
            Self::Common(_)
            | Self::HeaderTooShort { .. }
            | Self::InvalidNodeLength(_)
            | Self::LengthMismatch { .. }
            | Self::NegativeCount(_)
            | Self::DepthExceeded { .. } => ErrorKind::MalformedInput,
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::MalformedInput => "malformed input",
            Self::VersionMismatch => "version mismatch",
            Self::SizeOverflow => "size overflow",
            Self::Render => "render",
        };
        f.write_str(name)
    }
}

/// Result type for node codec operations.
pub type Result<T> = std::result::Result<T, Error>;
